//! Result interpretation for display.
//!
//! [`render`] is a pure function of the latest [`AnalysisResult`]: it picks
//! one of three views (comparison, ticket, failure) and precomputes every
//! displayed string. `Display` on [`View`] prints it for the terminal.

use crate::api::trace_path;
use crate::config::join_url;
use crate::types::{
    AnalysisResult, Approach, ApproachOutcome, CompareResult, FailureResult, Mode, SuccessResult,
    TicketAnalysis, TraceDetail, UrgencyLevel, UrgencyStyle,
};
use colored::Colorize;
use std::fmt;

/// What to show for the latest result.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Comparison(ComparisonView),
    Ticket(TicketView),
    Failure(FailureView),
}

/// The displayed fields of a classified ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketFields {
    pub category: &'static str,
    pub urgency: UrgencyLevel,
    pub urgency_style: UrgencyStyle,
    pub product: String,
    /// Confidence as a whole percentage, e.g. `"92%"`.
    pub confidence: String,
    pub summary: String,
    pub suggested_action: Option<String>,
    pub order_id: Option<String>,
    pub key_issues: Vec<String>,
}

/// A successful classification.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketView {
    pub mode: Mode,
    pub fields: TicketFields,
    pub duration_ms: u64,
    pub trace_id: Option<String>,
    /// Where the trace detail can be fetched.
    pub trace_link: Option<String>,
    pub warning: Option<String>,
    /// Field rules the unvalidated output breaks.
    pub field_issues: Vec<String>,
}

/// A failed analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureView {
    pub mode: Mode,
    /// Reported status, or `"failed"` when none was given.
    pub status: String,
    pub error: Option<String>,
    pub validation_errors: Vec<String>,
    pub duration_ms: Option<u64>,
}

/// Body of one comparison panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    Ticket(TicketFields),
    Error(String),
    /// Pretty-printed JSON that did not match the ticket schema.
    Raw(String),
    /// Nothing to show.
    Empty,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproachPanel {
    pub title: &'static str,
    pub method: Option<String>,
    pub body: PanelBody,
    /// Heading for `notes` (`"Problems"` or `"Benefits"`).
    pub notes_heading: &'static str,
    pub notes: Vec<String>,
}

/// Both approaches side by side. Always has two panels.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub input: Option<String>,
    pub bad: ApproachPanel,
    pub good: ApproachPanel,
}

/// Pick and build the view for `result`.
///
/// `base_url` is only used to build the trace link.
pub fn render(result: &AnalysisResult, base_url: &str) -> View {
    match result {
        AnalysisResult::Compare(c) => View::Comparison(comparison_view(c)),
        AnalysisResult::Success(s) => View::Ticket(ticket_view(s, base_url)),
        AnalysisResult::Failure(f) if f.mode == Mode::Compare => {
            View::Comparison(failed_comparison_view(f))
        }
        AnalysisResult::Failure(f) => View::Failure(failure_view(f)),
    }
}

/// Format a confidence in `[0, 1]` as a whole percentage.
pub fn confidence_percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

fn ticket_fields(a: &TicketAnalysis) -> TicketFields {
    TicketFields {
        category: a.category.label(),
        urgency: a.urgency,
        urgency_style: a.urgency.style(),
        product: a.product.clone(),
        confidence: confidence_percent(a.confidence),
        summary: a.summary.clone(),
        suggested_action: a.suggested_action.clone(),
        order_id: a.order_id.clone(),
        key_issues: a.key_issues.clone(),
    }
}

fn ticket_view(s: &SuccessResult, base_url: &str) -> TicketView {
    TicketView {
        mode: s.mode,
        fields: ticket_fields(&s.analysis),
        duration_ms: s.duration_ms,
        trace_id: s.trace_id.clone(),
        trace_link: s
            .trace_id
            .as_deref()
            .map(|id| join_url(base_url, &trace_path(id))),
        warning: s.warning.clone(),
        field_issues: s.field_issues.clone(),
    }
}

fn failure_view(f: &FailureResult) -> FailureView {
    FailureView {
        mode: f.mode,
        status: f
            .status
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "failed".to_string()),
        error: f.error.clone(),
        validation_errors: f.validation_errors.clone(),
        duration_ms: f.duration_ms,
    }
}

fn comparison_view(c: &CompareResult) -> ComparisonView {
    ComparisonView {
        input: c.input.clone(),
        bad: approach_panel(c.bad.as_ref(), "Without validation", "Problems"),
        good: approach_panel(c.good.as_ref(), "With validation", "Benefits"),
    }
}

/// A compare request that produced no comparison still shows both panels,
/// each carrying the error.
fn failed_comparison_view(f: &FailureResult) -> ComparisonView {
    let message = f
        .error
        .clone()
        .or_else(|| f.status.as_ref().map(|s| s.to_string()))
        .unwrap_or_else(|| "failed".to_string());
    let panel = |title: &'static str, notes_heading: &'static str| ApproachPanel {
        title,
        method: None,
        body: PanelBody::Error(message.clone()),
        notes_heading,
        notes: Vec::new(),
    };
    ComparisonView {
        input: None,
        bad: panel("Without validation", "Problems"),
        good: panel("With validation", "Benefits"),
    }
}

fn approach_panel(
    approach: Option<&Approach>,
    title: &'static str,
    notes_heading: &'static str,
) -> ApproachPanel {
    let Some(approach) = approach else {
        return ApproachPanel {
            title,
            method: None,
            body: PanelBody::Empty,
            notes_heading,
            notes: Vec::new(),
        };
    };
    let body = match &approach.outcome {
        ApproachOutcome::Analysis(a) => PanelBody::Ticket(ticket_fields(a)),
        ApproachOutcome::Error(e) => PanelBody::Error(e.clone()),
        ApproachOutcome::Unstructured(v) => {
            PanelBody::Raw(serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()))
        }
        ApproachOutcome::Missing => PanelBody::Empty,
    };
    ApproachPanel {
        title,
        method: approach.method.clone(),
        body,
        notes_heading,
        notes: approach.notes.clone(),
    }
}

fn urgency_badge(urgency: UrgencyLevel, style: &UrgencyStyle) -> String {
    format!("[{} {} {}]", style.marker, urgency, style.label)
        .color(style.color)
        .bold()
        .to_string()
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &TicketFields, indent: &str) -> fmt::Result {
    writeln!(f, "{indent}Category:   {}", fields.category.bold())?;
    writeln!(
        f,
        "{indent}Urgency:    {}",
        urgency_badge(fields.urgency, &fields.urgency_style)
    )?;
    writeln!(f, "{indent}Product:    {}", fields.product)?;
    writeln!(f, "{indent}Confidence: {}", fields.confidence)?;
    writeln!(f, "{indent}Summary:    {}", fields.summary)?;
    if let Some(ref action) = fields.suggested_action {
        writeln!(f, "{indent}Action:     {}", action)?;
    }
    if let Some(ref order_id) = fields.order_id {
        writeln!(f, "{indent}Order:      {}", order_id)?;
    }
    if !fields.key_issues.is_empty() {
        writeln!(f, "{indent}Key issues:")?;
        for issue in &fields.key_issues {
            writeln!(f, "{indent}  - {}", issue)?;
        }
    }
    Ok(())
}

impl fmt::Display for TicketView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            "✓".bright_green(),
            format!("Ticket analysis ({})", self.mode).bright_white().bold()
        )?;
        write_fields(f, &self.fields, "  ")?;
        writeln!(f, "  Duration:   {} ms", self.duration_ms)?;
        if let Some(ref warning) = self.warning {
            writeln!(f, "  {} {}", "Warning:".yellow(), warning)?;
        }
        if !self.field_issues.is_empty() {
            writeln!(f, "  {}", "Unchecked field issues:".yellow())?;
            for issue in &self.field_issues {
                writeln!(f, "    - {}", issue)?;
            }
        }
        if let Some(ref link) = self.trace_link {
            writeln!(f, "  Trace:      {}", link.cyan())?;
        }
        Ok(())
    }
}

impl fmt::Display for FailureView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            "✗".bright_red(),
            format!("Analysis failed ({})", self.mode).bright_white().bold()
        )?;
        writeln!(f, "  Status:     {}", self.status.red())?;
        if let Some(ref error) = self.error {
            writeln!(f, "  Error:      {}", error)?;
        }
        if !self.validation_errors.is_empty() {
            writeln!(f, "  Validation errors:")?;
            for err in &self.validation_errors {
                writeln!(f, "    - {}", err)?;
            }
        }
        if let Some(ms) = self.duration_ms {
            writeln!(f, "  Duration:   {} ms", ms)?;
        }
        Ok(())
    }
}

impl fmt::Display for ApproachPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", format!("[{}]", self.title).bright_white().bold())?;
        if let Some(ref method) = self.method {
            writeln!(f, "  Method: {}", method.bright_black())?;
        }
        match &self.body {
            PanelBody::Ticket(fields) => write_fields(f, fields, "  ")?,
            PanelBody::Error(e) => writeln!(f, "  {} {}", "Error:".red(), e)?,
            PanelBody::Raw(raw) => {
                writeln!(f, "  Unvalidated output:")?;
                for line in raw.lines() {
                    writeln!(f, "    {}", line)?;
                }
            }
            PanelBody::Empty => writeln!(f, "  {}", "(no result)".bright_black())?,
        }
        if !self.notes.is_empty() {
            writeln!(f, "  {}:", self.notes_heading)?;
            for note in &self.notes {
                writeln!(f, "    - {}", note)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ComparisonView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Comparison".bright_white().bold())?;
        if let Some(ref input) = self.input {
            writeln!(f, "  Input: {}", input)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.bad)?;
        writeln!(f)?;
        write!(f, "{}", self.good)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Comparison(v) => fmt::Display::fmt(v, f),
            View::Ticket(v) => fmt::Display::fmt(v, f),
            View::Failure(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// Displayable summary of a trace record.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceView {
    pub trace_id: String,
    pub name: Option<String>,
    pub observation_count: Option<usize>,
    /// Pretty-printed raw record.
    pub raw: String,
}

pub fn render_trace(detail: &TraceDetail) -> TraceView {
    TraceView {
        trace_id: detail.trace_id.clone(),
        name: detail.name().map(str::to_string),
        observation_count: detail.observation_count(),
        raw: serde_json::to_string_pretty(&detail.raw).unwrap_or_else(|_| detail.raw.to_string()),
    }
}

impl fmt::Display for TraceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", "Trace".bright_white().bold(), self.trace_id.cyan())?;
        if let Some(ref name) = self.name {
            writeln!(f, "  Name:         {}", name)?;
        }
        if let Some(count) = self.observation_count {
            writeln!(f, "  Observations: {}", count)?;
        }
        for line in self.raw.lines() {
            writeln!(f, "  {}", line.bright_black())?;
        }
        Ok(())
    }
}
