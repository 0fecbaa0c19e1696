use httpmock::prelude::*;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wordfriends_application::LookupService;
use wordfriends_application::lookup_service::{EMPTY_INPUT_MARKER, EMPTY_INPUT_TEMPERATURE};
use wordfriends_core::query::{QueryError, RateGate};
use wordfriends_core::settings::{AnswerFormat, SettingsRepository, UserSettings};
use wordfriends_infrastructure::{ProfileStore, TomlSettingsRepository, credential};
use wordfriends_interaction::prompt::{PromptKind, PromptLibrary};
use wordfriends_interaction::stream::{RecordingSink, StreamStatus};

const PATH: &str = "/v1/chat/completions";

const ANSWER_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"# apple\"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\"\\n\\nfruit\"}}]}\n\ndata: [DONE]\n\n";

struct Fixture {
    _temp_dir: TempDir,
    settings: Arc<TomlSettingsRepository>,
    service: LookupService,
}

fn fixture(server: &MockServer, gate: RateGate) -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let defaults = temp_dir.path().join("defaults.ini");
    fs::write(
        &defaults,
        format!(
            "[mock]\nname = Mock\nbaseUrl = {}\nmodel = mock-model\nmagic = {}\nisDefault = true\n",
            server.url(PATH),
            credential::encode("sk-live")
        ),
    )
    .unwrap();

    let profiles = Arc::new(ProfileStore::open(
        defaults,
        temp_dir.path().join("profiles.toml"),
    ));
    let settings = Arc::new(TomlSettingsRepository::with_path(
        temp_dir.path().join("settings.toml"),
    ));
    let service = LookupService::new(profiles, settings.clone(), PromptLibrary::bundled())
        .with_rate_gate(gate);

    Fixture {
        _temp_dir: temp_dir,
        settings,
        service,
    }
}

fn no_rate_limit() -> RateGate {
    RateGate::new(Duration::ZERO)
}

#[tokio::test]
async fn test_lookup_sends_sanitised_word() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .header("Authorization", "Bearer sk-live")
                .body_contains("\"model\":\"mock-model\"")
                .body_contains("\"temperature\":0.6")
                .body_contains("{\"role\":\"user\",\"content\":\"apple-pie\"}");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(ANSWER_BODY);
        })
        .await;

    let fixture = fixture(&server, no_rate_limit());
    let mut sink = RecordingSink::new();
    let outcome = fixture
        .service
        .lookup("  apple-pie 123!  ", &mut sink)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.status, StreamStatus::Completed);
    assert_eq!(outcome.answer, "# apple\n\nfruit");
    assert_eq!(sink.done_count(), 1);
}

#[tokio::test]
async fn test_empty_input_uses_greeting_prompt() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("\"temperature\":0.9")
                .body_contains(EMPTY_INPUT_MARKER);
            then.status(200).body("data: [DONE]\n");
        })
        .await;

    let fixture = fixture(&server, no_rate_limit());
    let prepared = fixture.service.prepare("   ").unwrap();
    assert_eq!(prepared.kind, PromptKind::Empty);
    assert_eq!(prepared.request.temperature, EMPTY_INPUT_TEMPERATURE);

    let mut sink = RecordingSink::new();
    let outcome = fixture.service.lookup("", &mut sink).await.unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.answer, "");
    assert_eq!(sink.deltas, vec![(String::new(), String::new(), true)]);
}

#[tokio::test]
async fn test_settings_choose_prompt_format() {
    let server = MockServer::start_async().await;
    let fixture = fixture(&server, no_rate_limit());

    assert_eq!(fixture.service.prepare("word").unwrap().kind, PromptKind::Table);

    fixture
        .settings
        .save(&UserSettings {
            format: AnswerFormat::Sentence,
            friend_number: 3,
            ..UserSettings::default()
        })
        .unwrap();

    let prepared = fixture.service.prepare("word").unwrap();
    assert_eq!(prepared.kind, PromptKind::Sentence);
    assert!(prepared.request.system_prompt.contains("list of 3"));
    assert_eq!(prepared.profile.id, "mock");
}

#[tokio::test]
async fn test_input_without_allowed_characters_is_rejected() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).body("data: [DONE]\n");
        })
        .await;

    let fixture = fixture(&server, no_rate_limit());
    let mut sink = RecordingSink::new();
    let err = fixture
        .service
        .lookup("123 !!", &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        wordfriends_application::LookupError::Query(QueryError::InvalidInput(_))
    ));
    assert_eq!(mock.hits_async().await, 0);
    assert!(sink.deltas.is_empty());
}

#[tokio::test]
async fn test_rapid_resubmission_is_rate_limited() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).body("data: [DONE]\n");
        })
        .await;

    let fixture = fixture(&server, RateGate::new(Duration::from_secs(60)));
    let mut sink = RecordingSink::new();

    fixture.service.lookup("first", &mut sink).await.unwrap();
    let err = fixture
        .service
        .lookup("second", &mut sink)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(sink.done_count(), 1);
}

#[tokio::test]
async fn test_busy_while_in_flight_then_cancel() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200)
                .delay(Duration::from_secs(30))
                .body(ANSWER_BODY);
        })
        .await;

    let fixture = fixture(&server, no_rate_limit());
    let service = Arc::new(fixture.service);

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            let mut sink = RecordingSink::new();
            service.lookup("slow", &mut sink).await
        })
    };

    for _ in 0..200 {
        if service.is_busy() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let mut sink = RecordingSink::new();
    let err = service.lookup("fast", &mut sink).await.unwrap_err();
    assert!(err.is_busy());

    service.cancel();
    let outcome = tokio::time::timeout(Duration::from_secs(5), first)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(outcome.is_cancelled());
    assert!(!service.is_busy());
}
