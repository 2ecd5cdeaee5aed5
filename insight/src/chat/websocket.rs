use rocket::futures::{SinkExt, StreamExt};
use rocket::{get, State};
use rocket_ws::{Channel, Message, WebSocket};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::{ChatSession, Role};
use crate::llm;
use crate::store;

/// Messages the frontend sends over the chat socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientMessage {
    Select { article_id: i64 },
    Ask { message: String },
}

/// WebSocket chat endpoint. Each connection owns its own `ChatSession`;
/// the session is dropped when the client disconnects.
#[get("/chat")]
pub fn chat_websocket(ws: WebSocket, state: &State<crate::server::AppState>) -> Channel<'static> {
    let pool = state.db.clone();
    let completer = state.completer.clone();

    ws.channel(move |mut stream| {
        Box::pin(async move {
            info!("chat socket connected");
            let mut session = ChatSession::new();

            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        let parsed = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(m) => m,
                            Err(e) => {
                                warn!("chat socket: unrecognized message: {}", e);
                                let _ = stream
                                    .send(warning("I didn't understand that request."))
                                    .await;
                                continue;
                            }
                        };

                        match parsed {
                            ClientMessage::Select { article_id } => {
                                match store::get_article(&pool, article_id).await {
                                    Ok(Some(article)) => {
                                        info!("chat socket: selected article {}", article_id);
                                        let topic = article.title.clone();
                                        session.select_article(article);
                                        let _ = stream
                                            .send(text_msg(json!({
                                                "type": "selected",
                                                "article_id": article_id,
                                                "topic": topic,
                                            })))
                                            .await;
                                    }
                                    Ok(None) => {
                                        let _ = stream
                                            .send(warning("That article no longer exists."))
                                            .await;
                                    }
                                    Err(e) => {
                                        error!("chat socket: select failed: {}", e);
                                        let _ = stream.send(error_msg(&e.to_string())).await;
                                    }
                                }
                            }
                            ClientMessage::Ask { message } => {
                                // Submitting without an active article is a
                                // warning, not a state change: no turn is
                                // appended and no upstream request is sent.
                                let Some(article) = session.active().cloned() else {
                                    let _ = stream
                                        .send(warning("Select an article first to start chatting."))
                                        .await;
                                    continue;
                                };

                                let Some(ref completer) = completer else {
                                    let _ = stream
                                        .send(warning("The assistant is not configured on this server."))
                                        .await;
                                    continue;
                                };

                                session.append_turn(Role::User, message);

                                let mut rx = match llm::stream_grounded(
                                    completer.as_ref(),
                                    &article.summary,
                                    session.turns(),
                                )
                                .await
                                {
                                    Ok(rx) => rx,
                                    Err(e) => {
                                        error!("chat socket: completion failed: {}", e);
                                        let _ = stream.send(error_msg(&e.to_string())).await;
                                        continue;
                                    }
                                };

                                // Relay fragments as they arrive; the
                                // assistant turn is appended only once the
                                // stream finishes cleanly.
                                let mut full_response = String::new();
                                let mut failed = false;
                                while let Some(fragment) = rx.recv().await {
                                    match fragment {
                                        Ok(piece) => {
                                            full_response.push_str(&piece);
                                            if stream
                                                .send(text_msg(json!({
                                                    "type": "fragment",
                                                    "content": piece,
                                                })))
                                                .await
                                                .is_err()
                                            {
                                                // Client went away mid-stream.
                                                return Ok(());
                                            }
                                        }
                                        Err(e) => {
                                            error!("chat socket: stream error: {}", e);
                                            let _ = stream.send(error_msg(&e.to_string())).await;
                                            failed = true;
                                            break;
                                        }
                                    }
                                }

                                if !failed {
                                    session.append_turn(Role::Assistant, full_response.clone());
                                    let _ = stream
                                        .send(text_msg(json!({
                                            "type": "done",
                                            "content": full_response,
                                        })))
                                        .await;
                                }
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("chat socket closed");
                        break;
                    }
                    Err(e) => {
                        error!("chat socket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            Ok(())
        })
    })
}

fn text_msg(value: serde_json::Value) -> Message {
    Message::Text(value.to_string())
}

fn warning(message: &str) -> Message {
    text_msg(json!({ "type": "warning", "message": message }))
}

fn error_msg(message: &str) -> Message {
    text_msg(json!({ "type": "error", "message": message }))
}
