//! Structured extraction of a [`Record`] from free text.
//!
//! Two request shapes are supported (see [`Strategy`]); both feed the same
//! validation path in [`extract`]. Every failure is turned into an
//! [`ExtractOutcome::Failure`] with a fixed user-facing message, so nothing
//! propagates past this boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::providers::{CompletionResponse, LlmProvider};
use crate::record::Record;
use crate::session::ConversationLog;
use crate::validate::validate_email_format;

pub mod function_calling;
pub mod json_schema;

/// Name of the schema (JSON schema mode) and of the function (function mode).
pub const EXTRACTION_NAME: &str = "extract_user_data";

/// System instruction sent with every extraction request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Strict 3-property object schema shared by both strategies.
pub fn user_data_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "description": "The user's name"},
            "email": {"type": "string", "description": "The user's email address"},
            "phone": {"type": "string", "description": "The user's phone number"}
        },
        "required": ["name", "email", "phone"],
        "additionalProperties": false
    })
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How the service is asked to return structured data.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Reply constrained to a strict JSON schema.
    #[default]
    JsonSchema,
    /// Reply delivered as a forced function call.
    FunctionCalling,
}

impl Strategy {
    /// Stable kebab-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JsonSchema => "json-schema",
            Self::FunctionCalling => "function-calling",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::JsonSchema => "JSON Schema",
            Self::FunctionCalling => "Function Calling",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "json-schema" | "schema" => Ok(Self::JsonSchema),
            "function-calling" | "function" | "tool" => Ok(Self::FunctionCalling),
            other => Err(format!(
                "unknown mode '{other}', expected 'json-schema' or 'function-calling'"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Category of a failed extraction or submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The service call failed outright.
    Service,
    /// The service answered without usable content.
    EmptyReply,
    /// The extracted email is malformed.
    EmailFormat,
    /// Some other field is missing or malformed.
    Validation,
    /// The record was extracted but could not be written to the log.
    Persistence,
}

impl ErrorKind {
    /// Fixed user-facing message for this kind.
    pub fn message(self) -> &'static str {
        match self {
            Self::Service => "OpenAI API error occurred. Please try again later.",
            Self::EmptyReply => "No content in the response message.",
            Self::EmailFormat => "Email format validation failed.",
            Self::Validation => "Unable to extract valid data. Please check the input format.",
            Self::Persistence => "Data extracted but could not be saved.",
        }
    }
}

/// Result of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A validated record.
    Success(Record),
    /// A categorized failure with its user-facing message.
    Failure {
        /// Failure category.
        kind: ErrorKind,
        /// Message to show the user.
        message: String,
    },
}

impl ExtractOutcome {
    /// Failure outcome carrying the kind's standard message.
    pub fn failure(kind: ErrorKind) -> Self {
        Self::Failure {
            kind,
            message: kind.message().to_owned(),
        }
    }

    /// The record, if extraction succeeded.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Success(record) => Some(record),
            Self::Failure { .. } => None,
        }
    }

    /// The failure kind, if extraction failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Sampling settings applied to every extraction request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionSettings {
    /// Output length cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.0,
        }
    }
}

/// The candidate payload pulled out of a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// No usable content.
    Empty,
    /// Content that is not valid JSON.
    Malformed(String),
    /// A parsed JSON value.
    Json(Value),
}

impl Reply {
    /// Parse reply text; blank text counts as empty.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => Self::Json(value),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }
}

/// Run one extraction for `user_input` with the chosen strategy.
///
/// On success the parsed reply object is appended to `history` as an
/// assistant turn; every failure leaves `history` untouched. The caller is
/// expected to have recorded the user turn already.
pub async fn extract(
    strategy: Strategy,
    provider: &dyn LlmProvider,
    settings: ExtractionSettings,
    user_input: &str,
    history: &mut ConversationLog,
) -> ExtractOutcome {
    let request = match strategy {
        Strategy::JsonSchema => json_schema::build_request(user_input, settings),
        Strategy::FunctionCalling => function_calling::build_request(user_input, settings),
    };

    debug!(strategy = %strategy, model = %provider.model_id(), "requesting extraction");

    let response = match provider.complete(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(strategy = %strategy, error = %e, "extraction request failed");
            return ExtractOutcome::failure(ErrorKind::Service);
        }
    };

    let outcome = validate_reply(select_reply(strategy, &response));
    match &outcome {
        ExtractOutcome::Success(record) => {
            history.push_assistant(record.to_value());
            info!(strategy = %strategy, model = %response.model, "record extracted");
        }
        ExtractOutcome::Failure { kind, .. } => {
            warn!(strategy = %strategy, kind = ?kind, "extraction rejected");
        }
    }
    outcome
}

fn select_reply(strategy: Strategy, response: &CompletionResponse) -> Reply {
    match strategy {
        Strategy::JsonSchema => json_schema::reply(response),
        Strategy::FunctionCalling => function_calling::reply(response),
    }
}

/// Apply the email check, then record construction, to a reply.
pub fn validate_reply(reply: Reply) -> ExtractOutcome {
    let candidate = match reply {
        Reply::Empty => return ExtractOutcome::failure(ErrorKind::EmptyReply),
        Reply::Malformed(reason) => {
            debug!(reason = %reason, "reply is not JSON");
            return ExtractOutcome::failure(ErrorKind::Validation);
        }
        Reply::Json(value) => value,
    };

    if !validate_email_format(&candidate) {
        return ExtractOutcome::failure(ErrorKind::EmailFormat);
    }

    match Record::from_fields(&candidate) {
        Ok(record) => ExtractOutcome::Success(record),
        Err(e) => {
            debug!(error = %e, content = %candidate, "record construction failed");
            ExtractOutcome::failure(ErrorKind::Validation)
        }
    }
}
