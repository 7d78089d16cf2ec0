//! A console session: the submission form and the result viewer together.
//!
//! [`Session`] submits through a [`Submitter`], renders the latest result,
//! and kicks off the trace-detail fetch in the background.

use crate::ctx::ApiCtx;
use crate::render::{render, View};
use crate::submit::{SubmitOutcome, Submitter};
use crate::trace::{TraceFetch, TraceStep, TraceViewer};
use crate::types::{AnalysisResult, Mode, TraceDetail};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// What a completed submission produced.
#[derive(Debug)]
pub struct Submission {
    pub result: AnalysisResult,
    pub view: View,
    /// Background trace fetch. Awaiting it is optional.
    pub trace: JoinHandle<TraceFetch>,
}

/// Holds the latest result and its trace detail.
#[derive(Debug)]
pub struct Session {
    ctx: Arc<ApiCtx>,
    submitter: Submitter,
    traces: Arc<TraceViewer>,
    latest: Mutex<Option<AnalysisResult>>,
}

impl Session {
    pub fn new(ctx: Arc<ApiCtx>) -> Self {
        Self::with_submitter(ctx, Submitter::new())
    }

    pub fn with_submitter(ctx: Arc<ApiCtx>, submitter: Submitter) -> Self {
        Self {
            ctx,
            submitter,
            traces: Arc::new(TraceViewer::new()),
            latest: Mutex::new(None),
        }
    }

    pub fn ctx(&self) -> &ApiCtx {
        &self.ctx
    }

    /// Submit `text` in `mode`.
    ///
    /// Returns `None` when the submission was skipped (blank input or a
    /// request already in flight); the previous result stays on display.
    pub async fn submit(&self, text: &str, mode: Mode) -> Option<Submission> {
        let result = match self.submitter.submit(&self.ctx, text, mode).await {
            SubmitOutcome::Completed(result) => result,
            SubmitOutcome::Skipped(_) => return None,
        };
        let view = render(&result, &self.ctx.base_url);
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());

        // Reserve the token before spawning so fetches are ordered by submission.
        let trace = match self.traces.begin(result.trace_id()) {
            TraceStep::Done(outcome) => tokio::spawn(async move { outcome }),
            TraceStep::Fetch(pending) => {
                let ctx = Arc::clone(&self.ctx);
                let traces = Arc::clone(&self.traces);
                tokio::spawn(async move { traces.finish(&ctx, pending).await })
            }
        };

        Some(Submission {
            result,
            view,
            trace,
        })
    }

    /// The latest completed result.
    pub fn latest(&self) -> Option<AnalysisResult> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The view of the latest completed result.
    pub fn latest_view(&self) -> Option<View> {
        self.latest()
            .map(|result| render(&result, &self.ctx.base_url))
    }

    /// Trace detail of the latest result, once fetched.
    pub fn trace_detail(&self) -> Option<TraceDetail> {
        self.traces.current()
    }

    pub fn is_busy(&self) -> bool {
        self.submitter.is_in_flight()
    }
}
