//! Drives the interactive shell over in-memory input and output.

use std::io::Cursor;

use json_extractor::extract::{ExtractionSettings, Strategy};
use json_extractor::session::Session;
use json_extractor::shell::Shell;
use json_extractor::store::RecordLog;

use crate::support::{Script, ScriptedProvider, STELLA_INPUT, STELLA_JSON};

async fn drive(provider: &ScriptedProvider, sink: RecordLog, script: &str) -> String {
    let session = Session::new(Strategy::JsonSchema, ExtractionSettings::default());
    let mut shell = Shell::new(provider, sink, session);
    let mut out: Vec<u8> = Vec::new();
    shell
        .run(Cursor::new(script.to_owned()), &mut out)
        .await
        .expect("shell runs");
    String::from_utf8(out).expect("utf-8 output")
}

#[tokio::test]
async fn submit_renders_record_and_history() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let sink = RecordLog::new(tmp.path().join("user-data.json"));
    let provider = ScriptedProvider::text(STELLA_JSON);

    let output = drive(&provider, sink.clone(), &format!("{STELLA_INPUT}\n/history\n/quit\n")).await;

    assert!(output.contains("\"name\": \"Stella\""));
    assert!(output.contains("Data successfully extracted and stored."));
    assert!(output.contains(&format!("user: {STELLA_INPUT}")));
    assert!(output.contains("assistant: {"));
    assert_eq!(sink.read_all().expect("readable").len(), 1);
}

#[tokio::test]
async fn empty_history_has_placeholder() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let provider = ScriptedProvider::new(Script::Empty);

    let output = drive(&provider, RecordLog::new(tmp.path().join("log.json")), "/history\n").await;

    assert!(output.contains("No conversation history available."));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn errors_render_as_error_lines() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let provider = ScriptedProvider::new(Script::Fail);

    let output = drive(&provider, RecordLog::new(tmp.path().join("log.json")), "hello\n").await;

    assert!(output.contains("error: OpenAI API error occurred. Please try again later."));
}

#[tokio::test]
async fn mode_switch_uses_function_calling() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let provider = ScriptedProvider::new(Script::Empty);

    let output = drive(
        &provider,
        RecordLog::new(tmp.path().join("log.json")),
        "/mode function-calling\nStella\n",
    )
    .await;

    assert!(output.contains("Switched to Function Calling method."));
    assert!(output.contains("error: No content in the response message."));
    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tools.len(), 1);
}

#[tokio::test]
async fn blank_lines_and_clear_do_not_call_the_service() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let provider = ScriptedProvider::text(STELLA_JSON);

    let output = drive(
        &provider,
        RecordLog::new(tmp.path().join("log.json")),
        "\n   \n/clear\n/bogus\n",
    )
    .await;

    assert_eq!(provider.call_count(), 0);
    assert!(output.contains("Conversation history cleared."));
    assert!(output.contains("error: unknown command '/bogus'"));
}
