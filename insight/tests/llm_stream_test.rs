use insight::chat::{Role, Turn};
use insight::error::InsightError;
use insight::llm::remote::RemoteCompleter;
use insight::llm::ChatCompleter;

fn user_turn(content: &str) -> Turn {
    Turn {
        role: Role::User,
        content: content.to_string(),
    }
}

const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\"Cats \"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\"are \"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\"mammals.\"}}]}\n\n\
data: [DONE]\n\n";

#[tokio::test]
async fn test_stream_chat_yields_fragments_in_order() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(SSE_BODY)
        .create_async()
        .await;

    let completer = RemoteCompleter::new(server.url(), "fake-api-key", "gpt-4o");
    let mut rx = completer
        .stream_chat("Answer based on the article.", &[user_turn("What are cats?")])
        .await
        .expect("stream opened");

    let mut fragments = Vec::new();
    while let Some(item) = rx.recv().await {
        fragments.push(item.expect("fragment"));
    }

    assert_eq!(fragments, vec!["Cats ", "are ", "mammals."]);
    assert_eq!(fragments.concat(), "Cats are mammals.");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_carries_system_instruction_and_stream_flag() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{
                "model": "gpt-4o",
                "stream": true,
                "messages": [
                    {"role": "system", "content": "Ground your answers."},
                    {"role": "user", "content": "What are cats?"}
                ]
            }"#
            .to_string(),
        ))
        .with_status(200)
        .with_body("data: [DONE]\n\n")
        .create_async()
        .await;

    let completer = RemoteCompleter::new(server.url(), "fake-api-key", "gpt-4o");
    let mut rx = completer
        .stream_chat("Ground your answers.", &[user_turn("What are cats?")])
        .await
        .expect("stream opened");

    // Stream ends immediately on [DONE] with no fragments
    assert!(rx.recv().await.is_none());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_surfaces_as_completion_failed() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(429)
        .with_body(r#"{"error": {"message": "Rate limit exceeded"}}"#)
        .create_async()
        .await;

    let completer = RemoteCompleter::new(server.url(), "fake-api-key", "gpt-4o");
    let result = completer.stream_chat("sys", &[user_turn("hi")]).await;

    match result {
        Err(InsightError::CompletionFailed(msg)) => {
            assert!(msg.contains("429"), "unexpected message: {}", msg)
        }
        other => panic!("expected CompletionFailed, got {:?}", other.map(|_| ())),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_stream_payload_surfaces_as_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body("data: {not json at all\n\n")
        .create_async()
        .await;

    let completer = RemoteCompleter::new(server.url(), "fake-api-key", "gpt-4o");
    let mut rx = completer
        .stream_chat("sys", &[user_turn("hi")])
        .await
        .expect("stream opened");

    match rx.recv().await {
        Some(Err(InsightError::CompletionFailed(_))) => {}
        other => panic!("expected stream error, got {:?}", other),
    }
    // The stream terminates after the failure
    assert!(rx.recv().await.is_none());
}
