//! Ticket submission and mode dispatch.
//!
//! [`Submitter`] sends one analysis request per accepted submission and
//! turns every outcome, including transport errors, into an
//! [`AnalysisResult`]. Failures travel the same path as successes.

use crate::api;
use crate::ctx::ApiCtx;
use crate::events::Event;
use crate::types::{AnalysisRequest, AnalysisResult, Mode};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// Why a submission did not issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The input text was empty or whitespace only.
    EmptyInput,
    /// Another submission is still waiting for its response.
    InFlight,
}

/// Result of [`Submitter::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A request was issued and interpreted.
    Completed(AnalysisResult),
    /// No request was issued.
    Skipped(SkipReason),
}

impl SubmitOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            SubmitOutcome::Completed(r) => Some(r),
            SubmitOutcome::Skipped(_) => None,
        }
    }

    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            SubmitOutcome::Completed(r) => Some(r),
            SubmitOutcome::Skipped(_) => None,
        }
    }
}

/// Submits tickets, allowing at most one request in flight.
///
/// There is no retry and no cancellation: once issued, a request runs to
/// completion even if the caller has moved on.
#[derive(Debug, Default)]
pub struct Submitter {
    in_flight: AtomicBool,
    context: Option<Value>,
}

impl Submitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach extra context sent with every request.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Whether a request is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit `text` for analysis in `mode`.
    ///
    /// Whitespace-only input and submissions made while another is in
    /// flight are skipped without touching the network.
    pub async fn submit(&self, ctx: &ApiCtx, text: &str, mode: Mode) -> SubmitOutcome {
        if text.trim().is_empty() {
            return skip(ctx, mode, SkipReason::EmptyInput);
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return skip(ctx, mode, SkipReason::InFlight);
        };

        ctx.emit(Event::SubmitStart { mode });
        let started = Instant::now();

        let request = AnalysisRequest {
            user_input: text.to_string(),
            context: self.context.clone(),
        };
        let result = match api::analyze(ctx, mode, &request).await {
            Ok(body) => AnalysisResult::decode(mode, body),
            Err(e) => {
                warn!(%mode, error = %e, "analysis request failed");
                AnalysisResult::transport_failure(mode, e.to_string())
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(%mode, elapsed_ms, ok = result.is_success(), "analysis finished");
        ctx.emit(Event::SubmitEnd {
            mode,
            ok: result.is_success(),
            elapsed_ms,
        });
        SubmitOutcome::Completed(result)
    }
}

fn skip(ctx: &ApiCtx, mode: Mode, reason: SkipReason) -> SubmitOutcome {
    debug!(%mode, ?reason, "submission skipped");
    ctx.emit(Event::SubmitSkipped { mode, reason });
    SubmitOutcome::Skipped(reason)
}

/// Holds the in-flight flag; clears it on drop.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
