//! Endpoint calls against the ticket service.
//!
//! Each function issues exactly one request through the context's backend.
//! Interpretation of analysis bodies is left to
//! [`AnalysisResult::decode`](crate::types::AnalysisResult::decode).

use crate::ctx::ApiCtx;
use crate::error::{ConsoleError, Result};
use crate::types::{AnalysisRequest, HealthStatus, Mode, TraceDetail, TraceSummary};
use serde_json::Value;
use tracing::debug;

/// POST the request to the endpoint selected by `mode`.
pub async fn analyze(ctx: &ApiCtx, mode: Mode, request: &AnalysisRequest) -> Result<Value> {
    let body = serde_json::to_value(request)?;
    debug!(%mode, backend = ctx.backend.name(), "analyze");
    ctx.backend
        .post_json(&ctx.client, &ctx.base_url, mode.path(), &body)
        .await
}

/// Path of the trace-detail endpoint for `trace_id`.
pub fn trace_path(trace_id: &str) -> String {
    format!("/api/trace/{}", encode_segment(trace_id))
}

/// GET `/api/trace/{trace_id}`.
pub async fn fetch_trace(ctx: &ApiCtx, trace_id: &str) -> Result<TraceDetail> {
    if trace_id.trim().is_empty() {
        return Err(ConsoleError::InvalidInput("trace id is empty".into()));
    }
    let raw = ctx
        .backend
        .get_json(&ctx.client, &ctx.base_url, &trace_path(trace_id))
        .await?;
    Ok(TraceDetail {
        trace_id: trace_id.to_string(),
        raw,
    })
}

/// GET `/api/traces?limit={limit}`.
///
/// Accepts either a bare array or a paginated `{"data": [...]}` body.
pub async fn list_traces(ctx: &ApiCtx, limit: u32) -> Result<Vec<TraceSummary>> {
    if limit == 0 {
        return Err(ConsoleError::InvalidInput("limit must be at least 1".into()));
    }
    let path = format!("/api/traces?limit={}", limit);
    let body = ctx
        .backend
        .get_json(&ctx.client, &ctx.base_url, &path)
        .await?;
    let items = match body {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut obj) => obj.remove("data").unwrap_or(Value::Array(Vec::new())),
        other => {
            return Err(ConsoleError::Other(format!(
                "unexpected trace listing: {}",
                other
            )))
        }
    };
    Ok(serde_json::from_value(items)?)
}

/// GET `/health`.
pub async fn health(ctx: &ApiCtx) -> Result<HealthStatus> {
    let body = ctx
        .backend
        .get_json(&ctx.client, &ctx.base_url, "/health")
        .await?;
    Ok(serde_json::from_value(body)?)
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::config::ClientConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx_with(mock: Arc<MockBackend>) -> ApiCtx {
        ApiCtx::builder(ClientConfig::default())
            .backend(mock)
            .build()
            .unwrap()
    }

    #[test]
    fn test_trace_path_encodes() {
        assert_eq!(trace_path("abc-123"), "/api/trace/abc-123");
        assert_eq!(trace_path("a/b c"), "/api/trace/a%2Fb%20c");
    }

    #[tokio::test]
    async fn test_analyze_posts_user_input() {
        let mock = Arc::new(MockBackend::new().on("/api/ticket/analyze-bad", json!({})));
        let ctx = ctx_with(Arc::clone(&mock));
        analyze(&ctx, Mode::Bad, &AnalysisRequest::new("screen is broken"))
            .await
            .unwrap();
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].path, "/api/ticket/analyze-bad");
        assert_eq!(calls[0].body, Some(json!({"user_input": "screen is broken"})));
    }

    #[tokio::test]
    async fn test_analyze_forwards_context() {
        let mock = Arc::new(MockBackend::new().on("/api/ticket/analyze", json!({})));
        let ctx = ctx_with(Arc::clone(&mock));
        let request = AnalysisRequest::new("hi").with_context(json!({"tier": "gold"}));
        analyze(&ctx, Mode::Good, &request).await.unwrap();
        assert_eq!(
            mock.calls()[0].body,
            Some(json!({"user_input": "hi", "context": {"tier": "gold"}}))
        );
    }

    #[tokio::test]
    async fn test_fetch_trace() {
        let mock = Arc::new(MockBackend::new().on("/api/trace/tr-9", json!({"name": "ticket"})));
        let ctx = ctx_with(Arc::clone(&mock));
        let detail = fetch_trace(&ctx, "tr-9").await.unwrap();
        assert_eq!(detail.trace_id, "tr-9");
        assert_eq!(detail.name(), Some("ticket"));
    }

    #[tokio::test]
    async fn test_fetch_trace_rejects_empty_id() {
        let mock = Arc::new(MockBackend::new());
        let ctx = ctx_with(Arc::clone(&mock));
        let err = fetch_trace(&ctx, " ").await.unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidInput(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_traces_accepts_paginated_body() {
        let mock = Arc::new(MockBackend::new().on(
            "/api/traces",
            json!({"data": [{"id": "a", "name": "ticket_analysis"}, {"id": "b"}], "meta": {}}),
        ));
        let ctx = ctx_with(Arc::clone(&mock));
        let traces = list_traces(&ctx, 2).await.unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].name.as_deref(), Some("ticket_analysis"));
        assert_eq!(mock.calls()[0].path, "/api/traces?limit=2");
    }

    #[tokio::test]
    async fn test_list_traces_rejects_zero_limit() {
        let ctx = ctx_with(Arc::new(MockBackend::new()));
        assert!(list_traces(&ctx, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let mock = Arc::new(MockBackend::new().on("/health", json!({"status": "ok"})));
        let ctx = ctx_with(mock);
        assert!(health(&ctx).await.unwrap().is_ok());
    }
}
