//! Context shared by every operation against the ticket service.
//!
//! [`ApiCtx`] carries the HTTP client, backend, base URL and optional event
//! handler. It is built once from a [`ClientConfig`] and shared (usually as
//! `Arc<ApiCtx>`) by the submitter, the trace viewer and the session.

use crate::backend::{Backend, HttpBackend};
use crate::config::ClientConfig;
use crate::error::{ConsoleError, Result};
use crate::events::{Event, EventHandler};
use reqwest::Client;
use std::sync::Arc;

/// Shared context for calls to the ticket service.
///
/// # Example
///
/// ```
/// use ticket_console::{ApiCtx, ClientConfig};
///
/// let ctx = ApiCtx::builder(ClientConfig::default()).build().unwrap();
/// assert_eq!(ctx.base_url, "http://localhost:8000");
/// ```
pub struct ApiCtx {
    /// HTTP client (cheap to clone -- uses `Arc` internally).
    pub client: Client,
    /// Normalized base URL of the service.
    pub base_url: String,
    /// Transport. Default: [`HttpBackend`].
    pub backend: Arc<dyn Backend>,
    /// Optional event handler for submission and trace lifecycle events.
    pub event_handler: Option<Arc<dyn EventHandler>>,
}

impl ApiCtx {
    /// Create a new builder.
    pub fn builder(config: ClientConfig) -> ApiCtxBuilder {
        ApiCtxBuilder {
            config,
            client: None,
            backend: None,
            event_handler: None,
        }
    }

    /// Emit an event if a handler is present. No-op otherwise.
    pub(crate) fn emit(&self, event: Event) {
        if let Some(ref h) = self.event_handler {
            h.on_event(event);
        }
    }
}

impl std::fmt::Debug for ApiCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCtx")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

/// Builder for [`ApiCtx`].
pub struct ApiCtxBuilder {
    config: ClientConfig,
    client: Option<Client>,
    backend: Option<Arc<dyn Backend>>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl ApiCtxBuilder {
    /// Set the HTTP client. If not set, one is built from the config's timeout.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the backend. Default: [`HttpBackend`].
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the event handler.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the context.
    pub fn build(self) -> Result<ApiCtx> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.config.timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| ConsoleError::InvalidConfig(format!("HTTP client: {}", e)))?
            }
        };
        Ok(ApiCtx {
            client,
            base_url: self.config.base_url,
            backend: self.backend.unwrap_or_else(|| Arc::new(HttpBackend)),
            event_handler: self.event_handler,
        })
    }
}
