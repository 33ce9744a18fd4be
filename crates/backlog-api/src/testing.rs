//! Scripted in-memory transport for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::ClientError;
use crate::request::{ApiRequest, ApiResponse, Method};
use crate::transport::Transport;
use crate::Result;

/// What the mock saw for one outbound request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(u16, Vec<u8>),
    Fail(String),
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Reply::Respond(status, body.to_string().into_bytes())
    }

    pub fn status(status: u16) -> Self {
        Reply::Respond(status, Vec::new())
    }

    pub fn network(message: &str) -> Self {
        Reply::Fail(message.to_string())
    }
}

type Handler = Box<dyn Fn(&RecordedRequest) -> Reply + Send + Sync>;

pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Answer each request with `handler`.
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer requests with `replies` in order. Panics when they run out.
    pub fn scripted(replies: Vec<Reply>) -> Arc<Self> {
        let replies = Mutex::new(VecDeque::from(replies));
        Self::new(move |request| {
            replies.lock().pop_front().unwrap_or_else(|| {
                panic!(
                    "unexpected request: {} {}",
                    request.method, request.path
                )
            })
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse> {
        let recorded = RecordedRequest {
            method: request.method(),
            path: request.path().to_string(),
            query: request.query().to_vec(),
            body: request.body().cloned(),
            bearer: bearer.map(str::to_string),
        };
        self.requests.lock().push(recorded.clone());

        // Let concurrent requests interleave
        tokio::task::yield_now().await;

        match (self.handler)(&recorded) {
            Reply::Respond(status, body) => Ok(ApiResponse::new(status, body)),
            Reply::Fail(message) => Err(ClientError::Network(message)),
        }
    }
}
