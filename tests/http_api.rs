//! End-to-end tests of the HTTP backend against a mock server.

use std::sync::Arc;

use serde_json::json;
use ticket_console::types::FailureStatus;
use ticket_console::{
    api, AnalysisResult, ApiCtx, ClientConfig, Mode, Session, SubmitOutcome, Submitter, TraceFetch,
    View,
};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ctx_for(server: &MockServer) -> ApiCtx {
    ApiCtx::builder(ClientConfig::new(server.uri()).unwrap())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_good_mode_posts_to_analyze() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ticket/analyze"))
        .and(body_json(json!({"user_input": "My SmartWatch X is broken"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "success",
            "result": {
                "category": "complaint",
                "urgency": "P0",
                "product": "SmartWatch X",
                "confidence": 0.92,
                "summary": "Watch stopped working after two days",
                "suggested_action": "Offer a replacement"
            },
            "trace_id": null,
            "duration_ms": 850
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ctx_for(&server);
    let outcome = Submitter::new()
        .submit(&ctx, "My SmartWatch X is broken", Mode::Good)
        .await;
    let Some(AnalysisResult::Success(s)) = outcome.into_result() else {
        panic!("expected success");
    };
    assert_eq!(s.analysis.product, "SmartWatch X");
    assert_eq!(s.duration_ms, 850);
}

#[tokio::test]
async fn test_bad_mode_server_error_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ticket/analyze-bad"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ctx_for(&server);
    let outcome = Submitter::new().submit(&ctx, "refund", Mode::Bad).await;
    let SubmitOutcome::Completed(AnalysisResult::Failure(f)) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(f.mode, Mode::Bad);
    assert_eq!(f.status, Some(FailureStatus::Transport));
    assert!(f.error.unwrap().contains("Internal Server Error"));
}

#[tokio::test]
async fn test_connection_refused_is_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let ctx = ApiCtx::builder(ClientConfig::new(format!("http://127.0.0.1:{}", port)).unwrap())
        .build()
        .unwrap();
    let outcome = Submitter::new().submit(&ctx, "hello", Mode::Compare).await;
    let Some(result) = outcome.into_result() else {
        panic!("expected a result");
    };
    assert_eq!(result.mode(), Mode::Compare);
    assert!(matches!(result, AnalysisResult::Failure(_)));
}

#[tokio::test]
async fn test_compare_and_session_trace_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ticket/compare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "input": "late parcel",
            "bad_approach": {
                "method": "raw LLM JSON",
                "result": {"error": "no JSON found"},
                "problems": ["JSON may be invalid"]
            },
            "good_approach": {
                "method": "structured output",
                "result": {
                    "category": "inquiry",
                    "urgency": "P2",
                    "product": "Parcel",
                    "confidence": 0.75,
                    "summary": "Customer asks where the parcel is"
                },
                "benefits": ["JSON guaranteed"]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(Arc::new(ctx_for(&server)));
    let submission = session.submit("late parcel", Mode::Compare).await.unwrap();
    let View::Comparison(ref view) = submission.view else {
        panic!("expected comparison");
    };
    assert_eq!(view.bad.notes, vec!["JSON may be invalid"]);
    assert_eq!(view.good.notes, vec!["JSON guaranteed"]);
    // Compare results carry no trace id.
    assert_eq!(submission.trace.await.unwrap(), TraceFetch::Cleared);
}

#[tokio::test]
async fn test_trace_fetch_and_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trace/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc123",
            "name": "ticket_analysis",
            "observations": [{"type": "GENERATION"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/traces"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "abc123", "name": "ticket_analysis", "timestamp": "2026-10-18T09:00:00Z"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ctx_for(&server);
    let detail = api::fetch_trace(&ctx, "abc123").await.unwrap();
    assert_eq!(detail.observation_count(), Some(1));

    let traces = api::list_traces(&ctx, 3).await.unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].id, "abc123");
}

#[tokio::test]
async fn test_trace_unconfigured_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trace/x"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Langfuse not configured"))
        .mount(&server)
        .await;

    let ctx = ctx_for(&server);
    let err = api::fetch_trace(&ctx, "x").await.unwrap_err();
    assert!(matches!(
        err,
        ticket_console::ConsoleError::HttpError { status: 503, .. }
    ));
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let health = api::health(&ctx_for(&server)).await.unwrap();
    assert!(health.is_ok());
}
