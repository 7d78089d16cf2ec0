//! Backend for the ticket service's HTTP API.

use super::Backend;
use crate::config::join_url;
use crate::error::{ConsoleError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

/// Backend that calls the service over HTTP with `reqwest`.
///
/// This is the default backend of [`ApiCtx`](crate::ctx::ApiCtx).
#[derive(Debug, Clone, Default)]
pub struct HttpBackend;

impl HttpBackend {
    /// Turn a response into JSON, mapping non-success statuses to
    /// [`ConsoleError::HttpError`].
    async fn read_json(resp: Response) -> Result<Value> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ConsoleError::HttpError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn post_json(
        &self,
        client: &Client,
        base_url: &str,
        path: &str,
        body: &Value,
    ) -> Result<Value> {
        let url = join_url(base_url, path);
        debug!(%url, "POST");
        let resp = client.post(&url).json(body).send().await?;
        Self::read_json(resp).await
    }

    async fn get_json(&self, client: &Client, base_url: &str, path: &str) -> Result<Value> {
        let url = join_url(base_url, path);
        debug!(%url, "GET");
        let resp = client.get(&url).send().await?;
        Self::read_json(resp).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
