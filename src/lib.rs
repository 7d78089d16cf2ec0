//! # Ticket Console
//!
//! Typed client and terminal console for a support-ticket classification
//! service that contrasts validated structured LLM output with raw JSON
//! parsing, and records every call as a trace.
//!
//! ## Core Concepts
//!
//! - **[`ApiCtx`]** — shared context (HTTP client, base URL, backend,
//!   optional event handler), built from an explicit [`ClientConfig`].
//! - **[`Submitter`]** — sends one analysis request per submission, in one
//!   of three [`Mode`]s, and suppresses blank or overlapping submissions.
//! - **[`AnalysisResult`]** — tagged union of compare / success / failure,
//!   decoded once from the service's loosely shaped JSON.
//! - **[`render`]** — pure function from a result to a displayable [`View`].
//! - **[`TraceViewer`]** — fetches the trace record of the latest result,
//!   never letting a stale response replace a newer one.
//! - **[`Session`]** — all of the above wired together.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticket_console::{ApiCtx, ClientConfig, Mode, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ApiCtx::builder(ClientConfig::new("http://localhost:8000")?).build()?;
//!     let session = Session::new(Arc::new(ctx));
//!
//!     if let Some(submission) = session.submit("My SmartWatch X screen flickers", Mode::Compare).await {
//!         println!("{}", submission.view);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod ctx;
pub mod error;
pub mod events;
pub mod render;
pub mod session;
pub mod submit;
pub mod trace;
pub mod types;

pub use backend::{Backend, HttpBackend, MockBackend};
pub use config::ClientConfig;
pub use ctx::{ApiCtx, ApiCtxBuilder};
pub use error::{ConsoleError, Result};
pub use events::{Event, EventHandler, FnEventHandler};
pub use render::{render, render_trace, View};
pub use session::{Session, Submission};
pub use submit::{SkipReason, SubmitOutcome, Submitter};
pub use trace::{TraceFetch, TraceViewer};
pub use types::{
    AnalysisRequest, AnalysisResult, FailureStatus, Mode, TicketAnalysis, TicketCategory,
    TraceDetail, UrgencyLevel,
};
