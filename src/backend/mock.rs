//! Mock backend for testing without a live service.
//!
//! [`MockBackend`] returns pre-configured replies per path and records every
//! call, so tests can assert exactly which requests were issued.
//!
//! # Example
//!
//! ```
//! use ticket_console::backend::MockBackend;
//! use serde_json::json;
//!
//! let mock = MockBackend::new().on("/health", json!({"status": "ok"}));
//! assert!(mock.calls().is_empty());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Semaphore;

use super::Backend;
use crate::error::{ConsoleError, Result};

/// A canned reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful JSON body.
    Json(Value),
    /// Non-success HTTP status.
    Status { status: u16, body: String },
}

/// One recorded request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    /// `"GET"` or `"POST"`.
    pub method: &'static str,
    /// Path including any query string.
    pub path: String,
    /// POST body.
    pub body: Option<Value>,
}

#[derive(Debug)]
struct Route {
    replies: Vec<MockReply>,
    index: AtomicUsize,
}

/// A test backend that answers from canned replies.
///
/// Replies are looked up by path (query string ignored) and returned in
/// order, cycling back to the first when exhausted. Unknown paths answer
/// with HTTP 404. A path can be gated: calls to it are recorded immediately
/// but do not answer until [`release`](Self::release) is called.
#[derive(Debug, Default)]
pub struct MockBackend {
    routes: HashMap<String, Route>,
    gates: HashMap<String, Arc<Semaphore>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with a JSON body.
    pub fn on(self, path: impl Into<String>, body: Value) -> Self {
        self.reply(path, MockReply::Json(body))
    }

    /// Answer `path` with a non-success status.
    pub fn on_status(self, path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.reply(
            path,
            MockReply::Status {
                status,
                body: body.into(),
            },
        )
    }

    /// Append a reply for `path`. Multiple replies are served in order.
    pub fn reply(mut self, path: impl Into<String>, reply: MockReply) -> Self {
        self.routes
            .entry(path.into())
            .or_insert_with(|| Route {
                replies: Vec::new(),
                index: AtomicUsize::new(0),
            })
            .replies
            .push(reply);
        self
    }

    /// Hold every answer for `path` until [`release`](Self::release) is called.
    pub fn gated(mut self, path: impl Into<String>) -> Self {
        self.gates.insert(path.into(), Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held call to `path` answer.
    pub fn release(&self, path: &str) {
        if let Some(gate) = self.gates.get(path) {
            gate.add_permits(1);
        }
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls made to `path` (query string ignored).
    pub fn calls_to(&self, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| route_key(&c.path) == path)
            .count()
    }

    async fn answer(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<Value> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(ApiCall {
                method,
                path: path.to_string(),
                body,
            });
        }

        let key = route_key(path);
        if let Some(gate) = self.gates.get(key) {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| ConsoleError::Other(e.to_string()))?;
            permit.forget();
        }

        let Some(route) = self.routes.get(key) else {
            return Err(ConsoleError::HttpError {
                status: 404,
                body: format!("no mock reply for {}", key),
            });
        };
        let idx = route.index.fetch_add(1, Ordering::Relaxed) % route.replies.len();
        match &route.replies[idx] {
            MockReply::Json(v) => Ok(v.clone()),
            MockReply::Status { status, body } => Err(ConsoleError::HttpError {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

fn route_key(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

#[async_trait]
impl Backend for MockBackend {
    async fn post_json(
        &self,
        _client: &Client,
        _base_url: &str,
        path: &str,
        body: &Value,
    ) -> Result<Value> {
        self.answer("POST", path, Some(body.clone())).await
    }

    async fn get_json(&self, _client: &Client, _base_url: &str, path: &str) -> Result<Value> {
        self.answer("GET", path, None).await
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_fixed_response() {
        let mock = MockBackend::new().on("/health", json!({"status": "ok"}));
        let client = Client::new();
        let resp = mock.get_json(&client, "http://unused", "/health").await.unwrap();
        assert_eq!(resp, json!({"status": "ok"}));
        assert_eq!(
            mock.calls(),
            vec![ApiCall {
                method: "GET",
                path: "/health".into(),
                body: None,
            }]
        );
    }

    #[test]
    fn test_mock_outside_runtime() {
        let mock = MockBackend::new().on("/api/ticket/analyze", json!({"success": false}));
        let resp = tokio_test::block_on(mock.post_json(
            &Client::new(),
            "http://unused",
            "/api/ticket/analyze",
            &json!({"user_input": "x"}),
        ))
        .unwrap();
        assert_eq!(resp["success"], false);
        assert_eq!(mock.calls()[0].body, Some(json!({"user_input": "x"})));
    }

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let mock = MockBackend::new()
            .on("/a", json!("first"))
            .on("/a", json!("second"));
        let client = Client::new();
        let r1 = mock.get_json(&client, "http://unused", "/a").await.unwrap();
        let r2 = mock.get_json(&client, "http://unused", "/a").await.unwrap();
        let r3 = mock.get_json(&client, "http://unused", "/a").await.unwrap();
        assert_eq!(r1, json!("first"));
        assert_eq!(r2, json!("second"));
        assert_eq!(r3, json!("first")); // cycles
    }

    #[tokio::test]
    async fn test_mock_unknown_path_is_404() {
        let mock = MockBackend::new();
        let client = Client::new();
        let err = mock
            .post_json(&client, "http://unused", "/nope", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::HttpError { status: 404, .. }));
        assert_eq!(mock.calls_to("/nope"), 1);
    }

    #[tokio::test]
    async fn test_mock_status_reply() {
        let mock = MockBackend::new().on_status("/api/trace/x", 503, "Langfuse not configured");
        let client = Client::new();
        let err = mock
            .get_json(&client, "http://unused", "/api/trace/x")
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::HttpError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_mock_query_string_ignored_for_lookup() {
        let mock = MockBackend::new().on("/api/traces", json!([]));
        let client = Client::new();
        mock.get_json(&client, "http://unused", "/api/traces?limit=5")
            .await
            .unwrap();
        assert_eq!(mock.calls_to("/api/traces"), 1);
        assert_eq!(mock.calls()[0].path, "/api/traces?limit=5");
    }

    #[tokio::test]
    async fn test_mock_gate_holds_until_released() {
        let mock = Arc::new(MockBackend::new().on("/slow", json!(1)).gated("/slow"));
        let task = {
            let mock = Arc::clone(&mock);
            tokio::spawn(async move {
                let client = Client::new();
                mock.get_json(&client, "http://unused", "/slow").await
            })
        };
        while mock.calls_to("/slow") == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());
        mock.release("/slow");
        assert_eq!(task.await.unwrap().unwrap(), json!(1));
    }
}
