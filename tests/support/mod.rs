//! Scripted LLM provider shared by integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use json_extractor::providers::openai::parse_response;
use json_extractor::providers::{
    CompletionRequest, CompletionResponse, ContentPart, LlmProvider, ProviderError, StopReason,
    UsageStats,
};

/// What the provider answers with.
#[derive(Debug, Clone)]
pub enum Script {
    /// Assistant text content.
    Text(String),
    /// A call to `extract_user_data` with these arguments.
    Tool(Value),
    /// No content at all.
    Empty,
    /// Upstream failure.
    Fail,
}

/// Provider that replays one scripted answer and records every request.
pub struct ScriptedProvider {
    script: Script,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(Script::Text(text.to_owned()))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }

        let (content, stop_reason) = match &self.script {
            Script::Text(text) => (
                vec![ContentPart::Text { text: text.clone() }],
                StopReason::EndTurn,
            ),
            Script::Tool(input) => (
                vec![ContentPart::ToolUse {
                    id: "call_1".to_owned(),
                    name: "extract_user_data".to_owned(),
                    arguments: input.to_string(),
                }],
                StopReason::ToolUse,
            ),
            Script::Empty => (vec![], StopReason::EndTurn),
            Script::Fail => {
                return Err(ProviderError::HttpStatus {
                    status: 503,
                    body: "service unavailable".to_owned(),
                })
            }
        };

        Ok(CompletionResponse {
            content,
            stop_reason,
            usage: UsageStats {
                input_tokens: 40,
                output_tokens: 20,
            },
            model: "mock".to_owned(),
        })
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}

/// Provider that answers with a raw chat completions body, decoded exactly
/// as the OpenAI provider decodes it.
pub struct WireProvider {
    body: Value,
}

impl WireProvider {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Body whose assistant message has this text content.
    pub fn content(text: &str) -> Self {
        Self::new(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }],
            "model": "gpt-4o"
        }))
    }

    /// Body with one `extract_user_data` call carrying these raw arguments.
    pub fn tool_arguments(arguments: &str) -> Self {
        Self::new(serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "extract_user_data", "arguments": arguments}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "model": "gpt-4o"
        }))
    }

    /// Body carrying a structured-output refusal and no content.
    pub fn refusal(text: &str) -> Self {
        Self::new(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": null, "refusal": text},
                "finish_reason": "stop"
            }],
            "model": "gpt-4o"
        }))
    }
}

#[async_trait]
impl LlmProvider for WireProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        parse_response(&self.body.to_string())
    }

    fn model_id(&self) -> &str {
        "gpt-4o"
    }
}

/// Reply the service gives for the Stella example.
pub const STELLA_JSON: &str =
    r#"{"name":"Stella","email":"stelladai1028@gmail.com","phone":"0988999999"}"#;

/// The Stella example input.
pub const STELLA_INPUT: &str =
    "我的名字是Stella，請用 stelladai1028@gmail.com 聯絡我，電話是0988999999";
