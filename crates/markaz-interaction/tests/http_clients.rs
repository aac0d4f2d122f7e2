use std::time::Duration;

use markaz_core::assistant::{AskRequest, Assistant};
use markaz_interaction::{OpenAiMindMapAgent, RemoteAskClient};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one canned HTTP response and hands back the request body.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];

        let request_body = loop {
            let read = socket.read(&mut chunk).await.unwrap();
            assert!(read > 0, "connection closed before the request was complete");
            buffer.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&buffer).to_string();
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            let body_start = header_end + 4;
            if buffer.len() >= body_start + content_length {
                break buffer[body_start..body_start + content_length].to_vec();
            }
        };

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        serde_json::from_slice(&request_body).unwrap()
    });

    (address, handle)
}

#[tokio::test]
async fn test_remote_client_posts_prompt_and_chat_id() {
    let answer = json!({
        "text_answer": "The Sun is a star.",
        "graph_data": {"nodes": [{"id": "n1", "label": "Sun"}], "links": [{"source": "root", "target": "n1"}]}
    });
    let (address, server) = serve_once("200 OK", answer.to_string()).await;
    let client = RemoteAskClient::new(address, Duration::from_secs(5)).unwrap();

    let response = client
        .ask(&AskRequest::new("sun", Some("chat_1".to_string())))
        .await
        .unwrap();

    assert_eq!(response.text_answer, "The Sun is a star.");
    assert_eq!(response.fragment().unwrap().links.len(), 1);
    assert_eq!(
        server.await.unwrap(),
        json!({"prompt": "sun", "chat_id": "chat_1"})
    );
}

#[tokio::test]
async fn test_remote_client_maps_server_error_to_transport() {
    let (address, _server) =
        serve_once("400 Bad Request", json!({"detail": "empty"}).to_string()).await;
    let client = RemoteAskClient::new(address, Duration::from_secs(5)).unwrap();

    let err = client.ask(&AskRequest::new("x", None)).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_openai_agent_sends_history_and_records_exchange() {
    let model_answer = json!({
        "text_answer": "Cats are felines.",
        "graph_data": {"nodes": [{"id": "c", "label": "Cats"}], "links": []}
    });
    let completion = json!({
        "choices": [{"message": {"role": "assistant", "content": model_answer.to_string()}}]
    });
    let (address, server) = serve_once("200 OK", completion.to_string()).await;
    let agent = OpenAiMindMapAgent::new("test-key")
        .unwrap()
        .with_endpoint(format!("{address}/v1/chat/completions"));

    let response = agent.ask(&AskRequest::new("cats", None)).await.unwrap();

    assert_eq!(response.text_answer, "Cats are felines.");
    let request = server.await.unwrap();
    assert_eq!(request["model"], "gpt-4o-mini");
    assert_eq!(request["response_format"]["type"], "json_object");
    assert_eq!(request["max_tokens"], 1500);
    assert_eq!(request["messages"][0]["role"], "system");
    assert_eq!(request["messages"][1], json!({"role": "user", "content": "cats"}));

    let stats = agent.stats().await;
    assert_eq!(stats.chat_ids, vec!["default"]);
    assert_eq!(stats.messages_per_chat["default"], 2);
}

#[tokio::test]
async fn test_openai_agent_sends_and_records_trimmed_prompt() {
    let model_answer = json!({"text_answer": "Dogs.", "graph_data": {"nodes": [], "links": []}});
    let completion = json!({"choices": [{"message": {"content": model_answer.to_string()}}]});
    let (address, server) = serve_once("200 OK", completion.to_string()).await;
    let agent = OpenAiMindMapAgent::new("test-key")
        .unwrap()
        .with_endpoint(address);

    agent
        .ask(&AskRequest::new("  dogs \n", Some("chat_2".to_string())))
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert_eq!(request["messages"][1], json!({"role": "user", "content": "dogs"}));

    let (second_address, second_server) = serve_once("200 OK", completion.to_string()).await;
    let agent = agent.with_endpoint(second_address);
    agent
        .ask(&AskRequest::new("more", Some("chat_2".to_string())))
        .await
        .unwrap();
    let request = second_server.await.unwrap();
    assert_eq!(request["messages"][1], json!({"role": "user", "content": "dogs"}));
    assert_eq!(request["messages"][3], json!({"role": "user", "content": "more"}));
}

#[tokio::test]
async fn test_openai_agent_falls_back_on_upstream_error() {
    let (address, _server) = serve_once(
        "500 Internal Server Error",
        json!({"error": {"message": "overloaded"}}).to_string(),
    )
    .await;
    let agent = OpenAiMindMapAgent::new("test-key")
        .unwrap()
        .with_endpoint(address);

    let response = agent
        .ask(&AskRequest::new("cats", Some("chat_9".to_string())))
        .await
        .unwrap();

    assert!(response.fragment().unwrap().is_empty());
    assert_eq!(agent.stats().await.total_chats, 0);
}

#[tokio::test]
async fn test_openai_agent_falls_back_on_non_json_answer() {
    let completion = json!({"choices": [{"message": {"content": "Cats are great"}}]});
    let (address, _server) = serve_once("200 OK", completion.to_string()).await;
    let agent = OpenAiMindMapAgent::new("test-key")
        .unwrap()
        .with_endpoint(address);

    let response = agent.ask(&AskRequest::new("cats", None)).await.unwrap();

    assert!(response.fragment().unwrap().is_empty());
    assert_eq!(agent.stats().await.total_chats, 0);
}
