//! Data model shared by the client, the renderer, and the CLI.
//!
//! The service returns loosely shaped JSON. [`AnalysisResult::decode`] is the
//! only place that inspects that shape; everything downstream works on the
//! tagged [`AnalysisResult`] union.

use colored::Color;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which backend path a submission exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Validated structured output.
    Good,
    /// Raw LLM JSON with no validation.
    Bad,
    /// Both approaches side by side.
    Compare,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Good, Mode::Bad, Mode::Compare];

    /// Endpoint path for this mode.
    pub fn path(self) -> &'static str {
        match self {
            Mode::Good => "/api/ticket/analyze",
            Mode::Bad => "/api/ticket/analyze-bad",
            Mode::Compare => "/api/ticket/compare",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Good => "good",
            Mode::Bad => "bad",
            Mode::Compare => "compare",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mode {:?} (expected good, bad or compare)", s))
    }
}

/// Ticket classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TicketCategory {
    Complaint,
    Inquiry,
    Suggestion,
    Bug,
    Refund,
    Other,
}

impl TicketCategory {
    const ALL: [TicketCategory; 6] = [
        TicketCategory::Complaint,
        TicketCategory::Inquiry,
        TicketCategory::Suggestion,
        TicketCategory::Bug,
        TicketCategory::Refund,
        TicketCategory::Other,
    ];

    /// Wire form (lowercase).
    pub fn as_str(self) -> &'static str {
        match self {
            TicketCategory::Complaint => "complaint",
            TicketCategory::Inquiry => "inquiry",
            TicketCategory::Suggestion => "suggestion",
            TicketCategory::Bug => "bug",
            TicketCategory::Refund => "refund",
            TicketCategory::Other => "other",
        }
    }

    /// Display label (uppercase).
    pub fn label(self) -> &'static str {
        match self {
            TicketCategory::Complaint => "COMPLAINT",
            TicketCategory::Inquiry => "INQUIRY",
            TicketCategory::Suggestion => "SUGGESTION",
            TicketCategory::Bug => "BUG",
            TicketCategory::Refund => "REFUND",
            TicketCategory::Other => "OTHER",
        }
    }
}

impl TryFrom<String> for TicketCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TicketCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown ticket category {:?}", value))
    }
}

/// Ticket priority, P0 highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum UrgencyLevel {
    P0,
    P1,
    P2,
    P3,
}

/// How an urgency level is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrgencyStyle {
    /// Human label, e.g. `"CRITICAL"`.
    pub label: &'static str,
    /// Terminal colour of the badge.
    pub color: Color,
    /// Short marker printed before the level.
    pub marker: &'static str,
}

impl UrgencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::P0 => "P0",
            UrgencyLevel::P1 => "P1",
            UrgencyLevel::P2 => "P2",
            UrgencyLevel::P3 => "P3",
        }
    }

    /// Distinct presentation for each level.
    pub fn style(self) -> UrgencyStyle {
        match self {
            UrgencyLevel::P0 => UrgencyStyle {
                label: "CRITICAL",
                color: Color::BrightRed,
                marker: "!!!",
            },
            UrgencyLevel::P1 => UrgencyStyle {
                label: "HIGH",
                color: Color::Yellow,
                marker: "!!",
            },
            UrgencyLevel::P2 => UrgencyStyle {
                label: "MEDIUM",
                color: Color::Cyan,
                marker: "!",
            },
            UrgencyLevel::P3 => UrgencyStyle {
                label: "LOW",
                color: Color::BrightBlack,
                marker: "-",
            },
        }
    }
}

impl TryFrom<String> for UrgencyLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "P0" => Ok(UrgencyLevel::P0),
            "P1" => Ok(UrgencyLevel::P1),
            "P2" => Ok(UrgencyLevel::P2),
            "P3" => Ok(UrgencyLevel::P3),
            _ => Err(format!("unknown urgency level {:?} (expected P0-P3)", value)),
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketAnalysis {
    pub category: TicketCategory,
    pub urgency: UrgencyLevel,
    pub product: String,
    /// Classification confidence in `[0, 1]`.
    pub confidence: f64,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_issues: Vec<String>,
}

impl TicketAnalysis {
    /// Decode from JSON, enforcing field types and the confidence range.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let analysis: TicketAnalysis = serde_json::from_value(value).map_err(|e| e.to_string())?;
        if !(0.0..=1.0).contains(&analysis.confidence) {
            return Err(format!(
                "confidence must be between 0 and 1, got {}",
                analysis.confidence
            ));
        }
        Ok(analysis)
    }

    /// Check the field rules a validated structured output guarantees.
    ///
    /// Returns every violation; an empty list means the analysis is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let product_len = self.product.trim().chars().count();
        if !(1..=100).contains(&product_len) {
            errors.push(format!("product: length must be 1-100, got {}", product_len));
        }

        let summary_len = self.summary.chars().count();
        if !(10..=500).contains(&summary_len) {
            errors.push(format!("summary: length must be 10-500, got {}", summary_len));
        }

        if let Some(ref order_id) = self.order_id {
            if !is_order_id(order_id) {
                errors.push(format!(
                    "order_id: expected two uppercase letters and 8 digits, got {:?}",
                    order_id
                ));
            }
        }

        if let Some(ref phone) = self.contact_phone {
            let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
            if !(10..=15).contains(&digits) {
                errors.push(format!("contact_phone: invalid phone number {:?}", phone));
            }
        }

        if let Some(ref email) = self.contact_email {
            if !email.contains('@') {
                errors.push(format!("contact_email: invalid email address {:?}", email));
            }
        }

        errors
    }
}

/// `^[A-Z]{2}\d{8}$`
fn is_order_id(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..].iter().all(u8::is_ascii_digit)
}

/// Request body for every analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub user_input: String,
    /// Extra context forwarded to the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl AnalysisRequest {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// Why an analysis failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FailureStatus {
    /// The model output did not pass validation.
    ValidationError,
    /// The model call itself failed.
    LlmError,
    /// The request never produced a response.
    Transport,
    /// The response could not be interpreted.
    InvalidResponse,
    /// Any other status string reported by the service.
    Other(String),
}

impl FailureStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FailureStatus::ValidationError => "validation_error",
            FailureStatus::LlmError => "llm_error",
            FailureStatus::Transport => "transport_error",
            FailureStatus::InvalidResponse => "invalid_response",
            FailureStatus::Other(s) => s,
        }
    }
}

impl From<String> for FailureStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "validation_error" => FailureStatus::ValidationError,
            "llm_error" => FailureStatus::LlmError,
            "transport_error" => FailureStatus::Transport,
            "invalid_response" => FailureStatus::InvalidResponse,
            _ => FailureStatus::Other(s),
        }
    }
}

impl From<FailureStatus> for String {
    fn from(status: FailureStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessResult {
    pub mode: Mode,
    pub analysis: TicketAnalysis,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Service-side caveat (the unvalidated path attaches one).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Field rules an unvalidated result breaks. Shown, never enforced.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_issues: Vec<String>,
}

/// A failed classification, reported by the service or synthesized locally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureResult {
    pub mode: Mode,
    pub status: Option<FailureStatus>,
    pub error: Option<String>,
    pub validation_errors: Vec<String>,
    pub duration_ms: Option<u64>,
}

/// What one side of a comparison produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ApproachOutcome {
    /// A well-formed ticket analysis.
    Analysis(TicketAnalysis),
    /// The approach reported an error.
    Error(String),
    /// JSON that does not match the ticket schema.
    Unstructured(Value),
    /// No result at all.
    Missing,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Approach {
    pub method: Option<String>,
    pub outcome: ApproachOutcome,
    /// `problems` for the unvalidated side, `benefits` for the validated side.
    pub notes: Vec<String>,
}

/// Both approaches applied to the same input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareResult {
    pub input: Option<String>,
    pub bad: Option<Approach>,
    pub good: Option<Approach>,
}

/// Interpreted response of an analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResult {
    Compare(CompareResult),
    Success(SuccessResult),
    Failure(FailureResult),
}

impl AnalysisResult {
    /// Interpret a response body for the mode that produced it.
    ///
    /// Never fails. The mode is checked first, so compare mode always yields
    /// a [`CompareResult`]. Auxiliary fields are read leniently: a field of
    /// the wrong type is dropped, not the whole response. Only a body that
    /// is not a JSON object becomes [`FailureStatus::InvalidResponse`].
    pub fn decode(mode: Mode, body: Value) -> Self {
        let mut obj = match body {
            Value::Object(obj) => obj,
            other if mode == Mode::Compare => {
                debug!(body = %other, "compare response is not an object");
                Map::new()
            }
            other => {
                return AnalysisResult::Failure(FailureResult {
                    mode,
                    status: Some(FailureStatus::InvalidResponse),
                    error: Some("response does not have the expected shape".into()),
                    validation_errors: vec![format!("expected a JSON object, got {}", other)],
                    duration_ms: None,
                })
            }
        };

        if mode == Mode::Compare {
            return AnalysisResult::Compare(CompareResult {
                input: take_string(&mut obj, "input"),
                bad: decode_approach(obj.remove("bad_approach"), "problems"),
                good: decode_approach(obj.remove("good_approach"), "benefits"),
            });
        }

        let duration_ms = obj.get("duration_ms").and_then(Value::as_f64).map(to_millis);
        let error = match obj.remove("error") {
            None | Some(Value::Null) => None,
            Some(e) => Some(value_text(&e)),
        };

        if obj.get("success").and_then(Value::as_bool) == Some(true) {
            if let Some(result) = obj.remove("result").filter(|r| !r.is_null()) {
                return match TicketAnalysis::from_value(result) {
                    Ok(analysis) => {
                        // Unvalidated output keeps its rule violations as notes.
                        let field_issues = if mode == Mode::Bad {
                            analysis.validate()
                        } else {
                            Vec::new()
                        };
                        AnalysisResult::Success(SuccessResult {
                            mode,
                            analysis,
                            duration_ms: duration_ms.unwrap_or(0),
                            trace_id: take_string(&mut obj, "trace_id")
                                .filter(|id| !id.trim().is_empty()),
                            warning: take_string(&mut obj, "warning"),
                            field_issues,
                        })
                    }
                    Err(reason) => AnalysisResult::Failure(FailureResult {
                        mode,
                        status: Some(FailureStatus::InvalidResponse),
                        error: Some(
                            error.unwrap_or_else(|| "result does not match the ticket schema".into()),
                        ),
                        validation_errors: vec![reason],
                        duration_ms,
                    }),
                };
            }
        }

        AnalysisResult::Failure(FailureResult {
            mode,
            status: take_string(&mut obj, "status").map(FailureStatus::from),
            error,
            validation_errors: match obj.remove("validation_errors") {
                Some(Value::Array(items)) => items.iter().map(value_text).collect(),
                None | Some(Value::Null) => Vec::new(),
                Some(other) => vec![value_text(&other)],
            },
            duration_ms,
        })
    }

    /// Result for a request that never produced a usable response.
    pub fn transport_failure(mode: Mode, message: impl Into<String>) -> Self {
        AnalysisResult::Failure(FailureResult {
            mode,
            status: Some(FailureStatus::Transport),
            error: Some(message.into()),
            validation_errors: Vec::new(),
            duration_ms: None,
        })
    }

    pub fn mode(&self) -> Mode {
        match self {
            AnalysisResult::Compare(_) => Mode::Compare,
            AnalysisResult::Success(s) => s.mode,
            AnalysisResult::Failure(f) => f.mode,
        }
    }

    /// Trace id of a successful result, if any.
    pub fn trace_id(&self) -> Option<&str> {
        match self {
            AnalysisResult::Success(s) => s.trace_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success(_))
    }
}

fn decode_approach(value: Option<Value>, notes_key: &str) -> Option<Approach> {
    let Value::Object(mut obj) = value? else {
        return None;
    };

    let method = obj
        .remove("method")
        .and_then(|m| m.as_str().map(str::to_string));
    let notes = obj
        .remove(notes_key)
        .and_then(|n| match n {
            Value::Array(items) => Some(items.iter().map(value_text).collect()),
            _ => None,
        })
        .unwrap_or_default();

    let outcome = match obj.remove("result") {
        None | Some(Value::Null) => ApproachOutcome::Missing,
        Some(result) => match TicketAnalysis::from_value(result.clone()) {
            Ok(analysis) => ApproachOutcome::Analysis(analysis),
            Err(_) => match result.get("error") {
                Some(err) => ApproachOutcome::Error(value_text(err)),
                None => ApproachOutcome::Unstructured(result),
            },
        },
    };

    Some(Approach {
        method,
        outcome,
        notes,
    })
}

/// Take a string field; any other type counts as absent.
fn take_string(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_millis(ms: f64) -> u64 {
    if ms.is_finite() && ms > 0.0 {
        ms.round() as u64
    } else {
        0
    }
}

/// A trace record from the observability backend. Structure is opaque.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceDetail {
    pub trace_id: String,
    pub raw: Value,
}

impl TraceDetail {
    pub fn name(&self) -> Option<&str> {
        self.raw.get("name").and_then(Value::as_str)
    }

    /// Number of recorded observations (spans, generations), if reported.
    pub fn observation_count(&self) -> Option<usize> {
        self.raw
            .get("observations")
            .and_then(Value::as_array)
            .map(Vec::len)
    }
}

/// Entry in the recent-traces listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
