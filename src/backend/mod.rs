//! Backend trait for talking to the ticket service.
//!
//! The [`Backend`] trait is the single HTTP seam of the crate. Endpoint
//! helpers in [`api`](crate::api) build paths and bodies; the backend moves
//! JSON over the wire. Built-in implementations: [`HttpBackend`] for the real
//! service and [`MockBackend`] for tests.
//!
//! ```text
//! Submitter / TraceViewer ──► api::* ──► Backend::post_json / get_json
//!                                              │
//!                                   ┌──────────┴──────────┐
//!                              HttpBackend            MockBackend
//!                               (reqwest)          (canned replies)
//! ```

pub mod http;
pub mod mock;

pub use http::HttpBackend;
pub use mock::{ApiCall, MockBackend, MockReply};

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Abstraction over the transport to the ticket service.
///
/// Paths are absolute (`/api/...`) and may carry a query string. Any
/// non-success answer is reported as an error; interpreting a successful
/// body is left to the caller.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// POST a JSON body and return the decoded JSON response.
    async fn post_json(
        &self,
        client: &Client,
        base_url: &str,
        path: &str,
        body: &Value,
    ) -> Result<Value>;

    /// GET a path and return the decoded JSON response.
    async fn get_json(&self, client: &Client, base_url: &str, path: &str) -> Result<Value>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}
