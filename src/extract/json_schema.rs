//! Schema-constrained extraction: the reply text must be a JSON object that
//! conforms to [`user_data_schema`](super::user_data_schema).

use crate::providers::{CompletionRequest, CompletionResponse, Message, ResponseFormat};

use super::{user_data_schema, ExtractionSettings, Reply, EXTRACTION_NAME, SYSTEM_PROMPT};

/// Build the completion request for `user_input`.
pub fn build_request(user_input: &str, settings: ExtractionSettings) -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user(user_input)],
        system: Some(SYSTEM_PROMPT.to_owned()),
        tools: vec![],
        forced_tool: None,
        response_format: Some(ResponseFormat::JsonSchema {
            name: EXTRACTION_NAME.to_owned(),
            strict: true,
            schema: user_data_schema(),
        }),
        max_tokens: Some(settings.max_tokens),
        temperature: Some(settings.temperature),
    }
}

/// The reply is the assistant's text content.
pub fn reply(response: &CompletionResponse) -> Reply {
    Reply::from_text(&response.text())
}
