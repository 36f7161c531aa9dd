//! Per-session state: the selected strategy and the conversation transcript.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::extract::{self, ErrorKind, ExtractOutcome, ExtractionSettings, Strategy};
use crate::providers::LlmProvider;
use crate::store::RecordLog;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The person typing.
    User,
    /// The extraction service.
    Assistant,
}

/// Turn payload: raw user text or the extracted object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TurnContent {
    /// Free text.
    Text(String),
    /// Structured data.
    Data(Value),
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    /// Author.
    pub role: TurnRole,
    /// Payload.
    pub content: TurnContent,
    /// When the turn was recorded.
    #[serde(skip)]
    pub at: DateTime<Utc>,
}

impl Turn {
    /// One-line rendering, e.g. `user: hello` or `assistant: {"name":..}`.
    pub fn render(&self) -> String {
        let role = match self.role {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        };
        match &self.content {
            TurnContent::Text(text) => format!("{role}: {text}"),
            TurnContent::Data(value) => format!("{role}: {value}"),
        }
    }
}

/// Ordered, append-only transcript of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the user's raw text.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(TurnRole::User, TurnContent::Text(text.into()));
    }

    /// Append an extracted object.
    pub fn push_assistant(&mut self, data: Value) {
        self.push(TurnRole::Assistant, TurnContent::Data(data));
    }

    fn push(&mut self, role: TurnRole, content: TurnContent) {
        self.turns.push(Turn {
            role,
            content,
            at: Utc::now(),
        });
    }

    /// Turns in append order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// One user session: strategy selection plus transcript.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    strategy: Strategy,
    settings: ExtractionSettings,
    history: ConversationLog,
}

impl Session {
    /// Start a session with the given strategy and sampling settings.
    pub fn new(strategy: Strategy, settings: ExtractionSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            strategy,
            settings,
            history: ConversationLog::new(),
        }
    }

    /// Session identifier, used in log spans.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Currently selected strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Switch strategy for subsequent submissions.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// The transcript so far.
    pub fn history(&self) -> &ConversationLog {
        &self.history
    }

    /// Clear the transcript.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Submit one input line.
    ///
    /// Blank input is a no-op and returns `None`. Otherwise the user turn is
    /// recorded first, the selected strategy runs, and a successful record is
    /// appended to `sink`. A write failure becomes
    /// [`ErrorKind::Persistence`]; the assistant turn stays in the history.
    pub async fn submit(
        &mut self,
        provider: &dyn LlmProvider,
        sink: &RecordLog,
        input: &str,
    ) -> Option<ExtractOutcome> {
        if input.trim().is_empty() {
            return None;
        }

        self.history.push_user(input);

        let span = info_span!("submit", session = %self.id, strategy = %self.strategy);
        let outcome = extract::extract(
            self.strategy,
            provider,
            self.settings,
            input,
            &mut self.history,
        )
        .instrument(span)
        .await;

        if let ExtractOutcome::Success(record) = &outcome {
            if let Err(e) = sink.append(record) {
                error!(session = %self.id, error = %e, "failed to persist record");
                return Some(ExtractOutcome::failure(ErrorKind::Persistence));
            }
        }

        Some(outcome)
    }
}
