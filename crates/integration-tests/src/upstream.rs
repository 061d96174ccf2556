//! A scripted stand-in for the upstream completion API.

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use indoc::formatdoc;
use serde_json::json;
use tokio::net::TcpListener;

/// The credential every test relay is configured with.
pub const TEST_API_KEY: &str = "test-upstream-key";

/// One scripted answer of the mock.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A body sent with `content-type: application/json`.
    Json { status: u16, body: String },
    /// A body sent as HTML, like a gateway error page.
    Text { status: u16, body: String },
    /// Success headers followed by a connection drop while streaming the body.
    BrokenBody,
}

impl MockReply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self::Json {
            status,
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::Text {
            status,
            body: body.into(),
        }
    }

    /// A chat completion object whose first choice says `content`.
    pub fn completion(content: &str) -> Self {
        let body = json!({
            "id": format!("chatcmpl-{}", uuid::Uuid::new_v4()),
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
        });

        Self::json(200, body.to_string())
    }
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

/// Builder for the upstream mock.
///
/// Queued replies are used once each, in order. Afterwards every call gets
/// the fallback, a plain completion unless configured otherwise.
pub struct UpstreamMock {
    replies: VecDeque<MockReply>,
    fallback: MockReply,
}

impl Default for UpstreamMock {
    fn default() -> Self {
        Self::new()
    }
}

impl UpstreamMock {
    pub fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            fallback: MockReply::completion("Hello from the mock upstream"),
        }
    }

    pub fn with_reply(mut self, reply: MockReply) -> Self {
        self.replies.push_back(reply);
        self
    }

    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    pub async fn spawn(self) -> TestUpstream {
        let state = Arc::new(MockState {
            replies: Mutex::new(self.replies),
            fallback: self.fallback,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestUpstream {
            address,
            state,
            handle,
        }
    }
}

/// A running upstream mock. Stops when dropped.
pub struct TestUpstream {
    address: SocketAddr,
    state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestUpstream {
    /// The value for `relay.base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.address)
    }

    /// A `[relay]` section pointing at this mock with the test credential.
    pub fn relay_config(&self) -> String {
        formatdoc! {r#"
            [relay]
            base_url = "{base_url}"
            api_key = "{TEST_API_KEY}"
        "#, base_url = self.base_url()}
    }

    /// How many completion calls reached the mock.
    pub fn calls(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for TestUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct MockState {
    replies: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    fn record(&self, headers: &HeaderMap, body: &[u8]) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = serde_json::from_slice(body).unwrap_or(serde_json::Value::Null);

        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { authorization, body });
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

async fn chat_completions(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.record(&headers, &body);

    match state.next_reply() {
        MockReply::Json { status, body } => (
            StatusCode::from_u16(status).unwrap(),
            [(CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        MockReply::Text { status, body } => (
            StatusCode::from_u16(status).unwrap(),
            [(CONTENT_TYPE, "text/html")],
            body,
        )
            .into_response(),
        MockReply::BrokenBody => {
            let stream = futures::stream::once(async { Err::<Bytes, _>(io::Error::other("connection dropped")) });

            (
                StatusCode::OK,
                [(CONTENT_TYPE, "application/json")],
                Body::from_stream(stream),
            )
                .into_response()
        }
    }
}
