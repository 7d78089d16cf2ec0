//! Event system for submission and trace lifecycle hooks.
//!
//! Provides an optional, non-intrusive way to observe what the console
//! does. Users can implement [`EventHandler`] to receive these events for
//! progress display, metrics, or tests.

use crate::submit::SkipReason;
use crate::types::Mode;

/// Events emitted by the submitter and the trace viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An analysis request is about to be sent.
    SubmitStart {
        mode: Mode,
    },
    /// An analysis request finished (successfully or not).
    SubmitEnd {
        mode: Mode,
        /// Whether the result was a successful classification.
        ok: bool,
        /// Wall time of the request in milliseconds.
        elapsed_ms: u64,
    },
    /// A submission was suppressed without issuing a request.
    SubmitSkipped {
        mode: Mode,
        reason: SkipReason,
    },
    /// A trace-detail fetch was issued.
    TraceFetchStart {
        trace_id: String,
        /// Monotonic request token of this fetch.
        token: u64,
    },
    /// A trace-detail fetch finished.
    TraceFetchEnd {
        trace_id: String,
        token: u64,
        ok: bool,
    },
    /// A trace-detail response arrived after a newer fetch was issued and
    /// was not displayed.
    TraceDiscarded {
        trace_id: String,
        token: u64,
    },
}

/// Handler for console lifecycle events.
///
/// This is entirely optional -- everything works without an event handler.
///
/// # Example
///
/// ```
/// use ticket_console::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         match event {
///             Event::SubmitStart { mode } => println!("[submit] {}", mode),
///             Event::SubmitEnd { ok, elapsed_ms, .. } => println!("[done] ok={} {}ms", ok, elapsed_ms),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when an event is emitted.
    fn on_event(&self, event: Event);
}

/// An [`EventHandler`] backed by a closure.
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}
