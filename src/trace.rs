//! Trace-detail lookup for the latest result.
//!
//! [`TraceViewer`] fetches the trace record whenever the displayed trace id
//! changes. Every fetch takes a monotonically increasing token and its
//! response is kept only if no newer fetch has started since, so a slow
//! response for an older trace can never replace a newer one.

use crate::api;
use crate::ctx::ApiCtx;
use crate::events::Event;
use crate::types::TraceDetail;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// What a call to [`TraceViewer::observe`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceFetch {
    /// Same trace id as before; no request issued.
    Unchanged,
    /// No trace id; the displayed detail was cleared.
    Cleared,
    /// Fetched and now displayed.
    Fetched(TraceDetail),
    /// Fetched, but a newer fetch started meanwhile; dropped.
    Stale,
    /// The request failed; logged and dropped.
    Failed,
}

/// Outcome of [`TraceViewer::begin`].
#[derive(Debug, Clone, PartialEq)]
pub enum TraceStep {
    /// Nothing to fetch.
    Done(TraceFetch),
    /// A fetch was reserved and must be completed with [`TraceViewer::finish`].
    Fetch(PendingFetch),
}

/// A reserved trace fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub trace_id: String,
    /// Monotonic token; only the latest token may update the display.
    pub token: u64,
}

#[derive(Debug, Default)]
struct TraceState {
    /// Trace id of the latest observed result.
    requested: Option<String>,
    /// Token of the latest fetch.
    token: u64,
    /// Detail currently on display.
    detail: Option<TraceDetail>,
}

/// Holds the trace detail for the latest result.
#[derive(Debug, Default)]
pub struct TraceViewer {
    state: Mutex<TraceState>,
}

impl TraceViewer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TraceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The detail currently on display.
    pub fn current(&self) -> Option<TraceDetail> {
        self.lock().detail.clone()
    }

    /// The trace id of the latest observed result.
    pub fn requested(&self) -> Option<String> {
        self.lock().requested.clone()
    }

    /// React to the trace id of a newly displayed result.
    ///
    /// A new, non-empty id issues exactly one GET; repeating the current id
    /// issues none. Errors never surface to the caller.
    pub async fn observe(&self, ctx: &ApiCtx, trace_id: Option<&str>) -> TraceFetch {
        match self.begin(trace_id) {
            TraceStep::Done(outcome) => outcome,
            TraceStep::Fetch(pending) => self.finish(ctx, pending).await,
        }
    }

    /// Record the new trace id and, if it changed, reserve a token for the
    /// fetch. Synchronous so callers can order it before spawning.
    pub fn begin(&self, trace_id: Option<&str>) -> TraceStep {
        let trace_id = trace_id.map(str::trim).filter(|id| !id.is_empty());
        let mut state = self.lock();
        match trace_id {
            None => {
                state.token += 1;
                state.requested = None;
                state.detail = None;
                TraceStep::Done(TraceFetch::Cleared)
            }
            Some(id) if state.requested.as_deref() == Some(id) => {
                TraceStep::Done(TraceFetch::Unchanged)
            }
            Some(id) => {
                state.token += 1;
                state.requested = Some(id.to_string());
                state.detail = None;
                TraceStep::Fetch(PendingFetch {
                    trace_id: id.to_string(),
                    token: state.token,
                })
            }
        }
    }

    /// Issue the GET reserved by [`begin`](Self::begin) and keep the result
    /// only if its token is still the latest.
    pub async fn finish(&self, ctx: &ApiCtx, pending: PendingFetch) -> TraceFetch {
        let PendingFetch { trace_id, token } = pending;

        debug!(%trace_id, token, "fetching trace detail");
        ctx.emit(Event::TraceFetchStart {
            trace_id: trace_id.clone(),
            token,
        });

        match api::fetch_trace(ctx, &trace_id).await {
            Ok(detail) => {
                let mut state = self.lock();
                if state.token != token {
                    debug!(%trace_id, token, latest = state.token, "discarding stale trace detail");
                    drop(state);
                    ctx.emit(Event::TraceDiscarded { trace_id, token });
                    return TraceFetch::Stale;
                }
                state.detail = Some(detail.clone());
                drop(state);
                ctx.emit(Event::TraceFetchEnd {
                    trace_id,
                    token,
                    ok: true,
                });
                TraceFetch::Fetched(detail)
            }
            Err(e) => {
                warn!(%trace_id, error = %e, "trace detail fetch failed");
                ctx.emit(Event::TraceFetchEnd {
                    trace_id,
                    token,
                    ok: false,
                });
                TraceFetch::Failed
            }
        }
    }
}
