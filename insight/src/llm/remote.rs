use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::{ChatCompleter, FragmentReceiver};
use crate::chat::Turn;
use crate::error::InsightError;

/// Remote completion provider speaking the OpenAI-compatible streaming
/// chat API (`"stream": true`, `data:` SSE lines, `[DONE]` terminator).
pub struct RemoteCompleter {
    api_url: String,
    api_key: String,
    model: String,
    connect_timeout: Duration,
    max_tokens: Option<usize>,
    temperature: f32,
    client: reqwest::Client,
}

impl RemoteCompleter {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            connect_timeout: Duration::from_secs(30),
            max_tokens: None,
            temperature: 0.7,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_defaults(
        mut self,
        timeout_secs: u64,
        max_tokens: Option<usize>,
        temperature: f32,
    ) -> Self {
        self.connect_timeout = Duration::from_secs(timeout_secs);
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}

#[async_trait::async_trait]
impl ChatCompleter for RemoteCompleter {
    async fn stream_chat(
        &self,
        system: &str,
        turns: &[Turn],
    ) -> Result<FragmentReceiver, InsightError> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
        messages.extend(turns.iter().map(|t| WireMessage {
            role: t.role.as_str().to_string(),
            content: t.content.clone(),
        }));

        let req_body = StreamRequest {
            model: self.model.clone(),
            messages,
            stream: true,
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        };

        // The timeout bounds only the initial response; the fragment stream
        // itself runs until the upstream service ends it.
        let response = tokio::time::timeout(
            self.connect_timeout,
            self.client
                .post(&self.api_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .map_err(|_| InsightError::CompletionFailed("request timed out".to_string()))?
        .map_err(|e| InsightError::CompletionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::CompletionFailed(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let (tx, rx) = mpsc::channel(32);
        let mut byte_stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut buf: Vec<u8> = Vec::new();
            while let Some(chunk) = byte_stream.next().await {
                let bytes = match chunk {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(InsightError::CompletionFailed(e.to_string())))
                            .await;
                        return;
                    }
                };
                buf.extend_from_slice(&bytes);

                // SSE frames are newline-delimited; keep the tail until the
                // next chunk completes it.
                while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buf.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line);
                    let Some(rest) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    let data = rest.trim();
                    if data == "[DONE]" {
                        return;
                    }
                    if data.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<StreamChunk>(data) {
                        Ok(parsed) => {
                            let piece = parsed
                                .choices
                                .into_iter()
                                .next()
                                .and_then(|c| c.delta.content)
                                .unwrap_or_default();
                            if !piece.is_empty() && tx.send(Ok(piece)).await.is_err() {
                                // Receiver dropped: the caller abandoned the
                                // request, stop reading.
                                debug!("completion stream abandoned by caller");
                                return;
                            }
                        }
                        Err(e) => {
                            let _ = tx
                                .send(Err(InsightError::CompletionFailed(format!(
                                    "malformed stream payload: {}",
                                    e
                                ))))
                                .await;
                            return;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

// OpenAI streaming API request/response structures
#[derive(Debug, Serialize)]
struct StreamRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}
