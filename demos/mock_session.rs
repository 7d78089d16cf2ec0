//! Example: driving a session against MockBackend, without a live service.
//!
//! Run with: `cargo run --example mock_session`

use serde_json::json;
use std::sync::Arc;
use ticket_console::api::trace_path;
use ticket_console::{ApiCtx, ClientConfig, MockBackend, Mode, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Canned replies for the validated path and its trace
    let mock = MockBackend::new()
        .on(
            Mode::Good.path(),
            json!({
                "success": true,
                "status": "success",
                "result": {
                    "category": "complaint",
                    "urgency": "P0",
                    "product": "SmartWatch X",
                    "confidence": 0.92,
                    "summary": "Screen went black two days after purchase",
                    "suggested_action": "Arrange a replacement",
                    "key_issues": ["screen failure", "new device"]
                },
                "trace_id": "demo-trace",
                "duration_ms": 850
            }),
        )
        .on(
            trace_path("demo-trace"),
            json!({"name": "ticket_analysis", "observations": [{"type": "GENERATION"}]}),
        );

    let ctx = ApiCtx::builder(ClientConfig::default())
        .backend(Arc::new(mock))
        .build()?;
    let session = Session::new(Arc::new(ctx));

    if let Some(submission) = session
        .submit("My new SmartWatch X screen went black!", Mode::Good)
        .await
    {
        print!("{}", submission.view);
        submission.trace.await?;
    }

    if let Some(detail) = session.trace_detail() {
        println!("Trace name: {:?}", detail.name());
        println!("Observations: {:?}", detail.observation_count());
    }

    Ok(())
}
