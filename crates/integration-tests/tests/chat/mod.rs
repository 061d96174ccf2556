mod upstream_errors;

use indoc::formatdoc;
use integration_tests::{MockReply, TEST_API_KEY, TestServer, UpstreamMock};
use serde_json::json;

#[tokio::test]
async fn missing_messages_is_rejected() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server.client.post("/api/chat", &json!({})).await;
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "Invalid request format"
    }
    "#);

    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn messages_must_be_an_array() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .post("/api/chat", &json!({ "messages": "not-an-array" }))
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn unknown_role_is_rejected() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .post("/api/chat", &json!({ "messages": [{ "role": "tool", "content": "hi" }] }))
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .post_raw("/api/chat", "application/json", r#"{"messages": ["#)
        .await;

    assert_eq!(response.status(), 400);

    let response = server
        .client
        .post_raw("/api/chat", "text/plain", r#"{"messages": []}"#)
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn completion_is_passed_through_verbatim() {
    // Unusual spacing and key order must survive the relay untouched.
    let upstream_body = r#"{ "id":"chatcmpl-1","choices":[ {"message":{"content":"Hi there","role":"assistant"},"index":0} ],"x_groq":{"id":"req_1"} }"#;

    let upstream = UpstreamMock::new()
        .with_reply(MockReply::json(200, upstream_body))
        .spawn()
        .await;

    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .post("/api/chat", &json!({ "messages": [{ "role": "user", "content": "Hello" }] }))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.text().await.unwrap(), upstream_body);
}

#[tokio::test]
async fn conversation_order_is_preserved() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let messages = json!([
        { "role": "system", "content": "You answer questions about the portfolio." },
        { "role": "user", "content": "first" },
        { "role": "assistant", "content": "second" },
        { "role": "user", "content": "third" }
    ]);

    let response = server.client.post("/api/chat", &json!({ "messages": messages })).await;
    assert_eq!(response.status(), 200);

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body["messages"], messages);
}

#[tokio::test]
async fn credential_and_model_are_attached() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .post("/api/chat", &json!({ "messages": [{ "role": "user", "content": "Hello" }] }))
        .await;

    assert_eq!(response.status(), 200);

    let request = &upstream.requests()[0];

    assert_eq!(request.authorization.as_deref(), Some(format!("Bearer {TEST_API_KEY}").as_str()));

    insta::assert_json_snapshot!(request.body, @r#"
    {
      "model": "llama-3.3-70b-versatile",
      "messages": [
        {
          "role": "user",
          "content": "Hello"
        }
      ]
    }
    "#);
}

#[tokio::test]
async fn extra_fields_are_not_forwarded() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .post(
            "/api/chat",
            &json!({
                "model": "client-picked-model",
                "messages": [{ "role": "user", "content": "Hello" }]
            }),
        )
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(upstream.requests()[0].body["model"], "llama-3.3-70b-versatile");
}

#[tokio::test]
async fn per_message_keys_are_forwarded() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let response = server
        .client
        .post(
            "/api/chat",
            &json!({ "messages": [{ "role": "user", "content": "hi", "name": "visitor" }] }),
        )
        .await;

    assert_eq!(response.status(), 200);

    insta::assert_json_snapshot!(upstream.requests()[0].body["messages"], @r#"
    [
      {
        "role": "user",
        "content": "hi",
        "name": "visitor"
      }
    ]
    "#);
}

#[tokio::test]
async fn custom_path_and_model() {
    let upstream = UpstreamMock::new().spawn().await;

    let config = formatdoc! {r#"
        {}
        path = "/relay"
        model = "llama-3.1-8b-instant"
    "#, upstream.relay_config()};

    let server = TestServer::start(&config).await;

    let response = server
        .client
        .post("/relay/chat", &json!({ "messages": [{ "role": "user", "content": "Hello" }] }))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(upstream.requests()[0].body["model"], "llama-3.1-8b-instant");

    let response = server
        .client
        .post("/api/chat", &json!({ "messages": [{ "role": "user", "content": "Hello" }] }))
        .await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let upstream = UpstreamMock::new().spawn().await;
    let server = TestServer::start(&upstream.relay_config()).await;

    let requests = (0..8).map(|i| {
        let client = &server.client;
        let body = json!({ "messages": [{ "role": "user", "content": format!("question {i}") }] });

        async move { client.post("/api/chat", &body).await }
    });

    for response in futures::future::join_all(requests).await {
        assert_eq!(response.status(), 200);
    }

    let mut contents: Vec<String> = upstream
        .requests()
        .iter()
        .map(|request| request.body["messages"][0]["content"].as_str().unwrap().to_string())
        .collect();

    contents.sort();

    let mut expected: Vec<String> = (0..8).map(|i| format!("question {i}")).collect();
    expected.sort();

    assert_eq!(contents, expected);
}
