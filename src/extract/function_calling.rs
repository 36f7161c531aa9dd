//! Tool-invocation extraction: the model is forced to call
//! `extract_user_data`, and the call arguments are the reply.

use crate::providers::{CompletionRequest, CompletionResponse, Message, ToolDefinition};

use super::{user_data_schema, ExtractionSettings, Reply, EXTRACTION_NAME, SYSTEM_PROMPT};

const TOOL_DESCRIPTION: &str =
    "Record the user's name, email address and phone number found in the message.";

/// The single function offered to the model.
pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: EXTRACTION_NAME.to_owned(),
        description: TOOL_DESCRIPTION.to_owned(),
        input_schema: user_data_schema(),
    }
}

/// Build the completion request for `user_input`.
pub fn build_request(user_input: &str, settings: ExtractionSettings) -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user(user_input)],
        system: Some(SYSTEM_PROMPT.to_owned()),
        tools: vec![tool_definition()],
        forced_tool: Some(EXTRACTION_NAME.to_owned()),
        response_format: None,
        max_tokens: Some(settings.max_tokens),
        temperature: Some(settings.temperature),
    }
}

/// The reply is the arguments of the first `extract_user_data` call.
///
/// A response without that call has no usable content. Arguments that are
/// not JSON are malformed, exactly like a non-JSON schema reply.
pub fn reply(response: &CompletionResponse) -> Reply {
    match response.tool_arguments(EXTRACTION_NAME) {
        Some(arguments) => Reply::from_text(arguments),
        None => Reply::Empty,
    }
}
