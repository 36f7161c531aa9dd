//! Submission flow: user turn first, extraction, then persistence.

use json_extractor::extract::{ErrorKind, ExtractionSettings, Strategy};
use json_extractor::session::{Session, TurnContent, TurnRole};
use json_extractor::store::RecordLog;

use crate::support::{Script, ScriptedProvider, STELLA_INPUT, STELLA_JSON};

fn session() -> Session {
    Session::new(Strategy::JsonSchema, ExtractionSettings::default())
}

#[tokio::test]
async fn success_appends_user_and_assistant_turns_and_one_log_line() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let sink = RecordLog::new(tmp.path().join("user-data.json"));
    let provider = ScriptedProvider::text(STELLA_JSON);
    let mut session = session();

    let outcome = session
        .submit(&provider, &sink, STELLA_INPUT)
        .await
        .expect("non-empty input produces an outcome");

    assert_eq!(outcome.record().map(|r| r.name.as_str()), Some("Stella"));
    let turns = session.history().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, TurnRole::User);
    assert_eq!(turns[0].content, TurnContent::Text(STELLA_INPUT.to_owned()));
    assert_eq!(turns[1].role, TurnRole::Assistant);

    let contents = std::fs::read_to_string(sink.path()).expect("log written");
    assert_eq!(contents, format!("{STELLA_JSON}\n"));
}

#[tokio::test]
async fn failure_keeps_user_turn_but_writes_nothing() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let sink = RecordLog::new(tmp.path().join("user-data.json"));
    let provider = ScriptedProvider::new(Script::Fail);
    let mut session = session();

    let outcome = session
        .submit(&provider, &sink, STELLA_INPUT)
        .await
        .expect("non-empty input produces an outcome");

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Service));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().turns()[0].role, TurnRole::User);
    assert!(!sink.path().exists());
}

#[tokio::test]
async fn invalid_email_writes_nothing() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let sink = RecordLog::new(tmp.path().join("user-data.json"));
    let provider = ScriptedProvider::text(
        r#"{"name":"Stella","email":"not-an-email","phone":"0988999999"}"#,
    );
    let mut session = session();

    let outcome = session.submit(&provider, &sink, STELLA_INPUT).await;

    assert_eq!(
        outcome.and_then(|o| o.error_kind()),
        Some(ErrorKind::EmailFormat)
    );
    assert!(sink.read_all().expect("readable").is_empty());
}

#[tokio::test]
async fn empty_input_is_a_no_op() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let sink = RecordLog::new(tmp.path().join("user-data.json"));
    let provider = ScriptedProvider::text(STELLA_JSON);
    let mut session = session();

    for input in ["", "   ", "\t"] {
        assert!(session.submit(&provider, &sink, input).await.is_none());
    }

    assert_eq!(provider.call_count(), 0);
    assert!(session.history().is_empty());
    assert!(!sink.path().exists());
}

#[tokio::test]
async fn write_failure_is_reported_as_persistence_error() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let sink = RecordLog::new(tmp.path().join("missing-dir").join("user-data.json"));
    let provider = ScriptedProvider::text(STELLA_JSON);
    let mut session = session();

    let outcome = session
        .submit(&provider, &sink, STELLA_INPUT)
        .await
        .expect("non-empty input produces an outcome");

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Persistence));
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn strategy_switch_changes_request_shape() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let sink = RecordLog::new(tmp.path().join("user-data.json"));
    let provider = ScriptedProvider::new(Script::Empty);
    let mut session = session();

    session.set_strategy(Strategy::FunctionCalling);
    let _ = session.submit(&provider, &sink, "Stella").await;

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tools.len(), 1);
    assert!(requests[0].response_format.is_none());
}
