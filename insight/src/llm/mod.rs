use tokio::sync::mpsc;

use crate::chat::Turn;
use crate::error::InsightError;

pub mod remote;

/// Incremental text fragments from one streaming completion request.
/// The stream is finite (ends when the upstream response ends) and not
/// restartable. Dropping the receiver abandons the request, which leaves
/// room for a caller-side timeout without changing this contract.
pub type FragmentReceiver = mpsc::Receiver<Result<String, InsightError>>;

/// Core trait for streaming chat-completion providers.
#[async_trait::async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Issue one streaming request with a system-level instruction plus an
    /// ordered list of conversation turns. Returns a channel of text
    /// fragments; the caller concatenates them for display.
    async fn stream_chat(
        &self,
        system: &str,
        turns: &[Turn],
    ) -> Result<FragmentReceiver, InsightError>;
}

/// System instruction that keeps the assistant's answers scoped to the
/// selected article's summary text.
pub fn grounding_instruction(article_summary: &str) -> String {
    format!(
        "You are a news-reading assistant. Answer the user's questions based on this article text: {}",
        article_summary
    )
}

/// Assistant bridge: send the transcript plus the active article's summary
/// as grounding context and relay the fragment stream back to the caller.
///
/// The caller is responsible for appending the assembled text as a new
/// assistant turn once the stream completes; on failure the partial text
/// is discarded and the conversation does not advance.
pub async fn stream_grounded(
    completer: &dyn ChatCompleter,
    article_summary: &str,
    turns: &[Turn],
) -> Result<FragmentReceiver, InsightError> {
    let system = grounding_instruction(article_summary);
    completer.stream_chat(&system, turns).await
}
