//! End-to-end tests for the polling loop.
//!
//! The real HTTP clients talk to local stub servers standing in for the
//! homework API and the Telegram Bot API.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{HomeworkApi, TelegramApi, BOT_TOKEN, PRACTICUM_TOKEN};
use homework_bot_core::{
    IterationOutcome, Notifier, PollState, Poller, PracticumClient, ERROR_PREFIX,
};
use homework_bot_telegram::TelegramBot;
use serde_json::json;

const CHAT_ID: &str = "424242";

/// Builds a poller wired to the two stubs, starting at `cursor`.
fn build_poller(
    endpoint: &str,
    telegram_url: &str,
    cursor: i64,
    retry_interval: Duration,
) -> Poller<PracticumClient, TelegramBot> {
    let source = PracticumClient::new(endpoint, PRACTICUM_TOKEN, Duration::from_secs(5))
        .expect("Failed to build homework client");
    let bot = TelegramBot::with_api_url(BOT_TOKEN, telegram_url, Duration::from_secs(5))
        .expect("Failed to build telegram client");
    Poller::with_state(
        source,
        Notifier::new(bot, CHAT_ID),
        retry_interval,
        PollState::with_cursor(cursor),
    )
}

/// Tests that every changed homework becomes one chat message.
#[tokio::test]
async fn test_status_changes_are_forwarded() {
    let api = HomeworkApi::default();
    api.respond_json(
        StatusCode::OK,
        &json!({
            "homeworks": [
                {"homework_name": "lab2", "status": "rejected", "id": 2},
                {"homework_name": "lab1", "status": "approved", "id": 1}
            ],
            "current_date": 2000
        }),
    );
    let telegram = TelegramApi::default();
    let endpoint = api.start().await;
    let telegram_url = telegram.start().await;

    let mut poller = build_poller(&endpoint, &telegram_url, 1000, Duration::from_secs(1));
    let outcome = poller.run_iteration().await;

    assert_eq!(
        outcome,
        IterationOutcome::Notified {
            sent: 2,
            delivered: 2
        }
    );
    assert_eq!(
        telegram.texts(),
        vec![
            "Changed review status for \"lab2\". The work has been reviewed: the reviewer has comments.",
            "Changed review status for \"lab1\". The work has been reviewed: the reviewer liked everything. Hooray!",
        ]
    );
    for message in telegram.messages() {
        assert_eq!(message["chat_id"], CHAT_ID);
    }

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some(format!("OAuth {PRACTICUM_TOKEN}").as_str())
    );
    assert_eq!(requests[0].from_date.as_deref(), Some("1000"));
    assert_eq!(poller.state().cursor, 2000);
}

/// Tests that an empty batch sends nothing but still moves the cursor.
#[tokio::test]
async fn test_empty_batch_advances_cursor() {
    let api = HomeworkApi::default();
    api.respond_json(StatusCode::OK, &json!({"homeworks": [], "current_date": 1700}));
    let telegram = TelegramApi::default();
    let endpoint = api.start().await;
    let telegram_url = telegram.start().await;

    let mut poller = build_poller(&endpoint, &telegram_url, 1000, Duration::from_secs(1));
    assert_eq!(poller.run_iteration().await, IterationOutcome::NoUpdates);
    poller.run_iteration().await;

    assert!(telegram.messages().is_empty());
    assert_eq!(api.from_dates(), vec!["1000", "1700"]);
}

/// Tests that repeated server errors are announced once, and a new error again.
#[tokio::test]
async fn test_server_errors_are_deduplicated() {
    let api = HomeworkApi::default();
    api.respond_raw(StatusCode::INTERNAL_SERVER_ERROR, "{}")
        .respond_raw(StatusCode::INTERNAL_SERVER_ERROR, "{}")
        .respond_json(StatusCode::OK, &json!({"homeworks": "lab1", "current_date": 5}));
    let telegram = TelegramApi::default();
    let endpoint = api.start().await;
    let telegram_url = telegram.start().await;

    let mut poller = build_poller(&endpoint, &telegram_url, 1000, Duration::from_secs(1));
    for _ in 0..3 {
        poller.run_iteration().await;
    }

    let texts = telegram.texts();
    assert_eq!(texts.len(), 2, "Unexpected messages: {texts:?}");
    assert!(texts[0].starts_with(ERROR_PREFIX));
    assert!(texts[0].contains("Endpoint unavailable"));
    assert!(texts[0].contains("500"));
    assert!(texts[1].contains("Malformed API response"));
    assert_eq!(poller.state().cursor, 1000);
}

/// Tests that a non-JSON body is reported as a malformed response.
#[tokio::test]
async fn test_non_json_body_is_reported() {
    let api = HomeworkApi::default();
    api.respond_raw(StatusCode::OK, "<html>maintenance</html>");
    let telegram = TelegramApi::default();
    let endpoint = api.start().await;
    let telegram_url = telegram.start().await;

    let mut poller = build_poller(&endpoint, &telegram_url, 1000, Duration::from_secs(1));
    let outcome = poller.run_iteration().await;

    assert!(
        matches!(&outcome, IterationOutcome::Failed { message, reported: true } if message.contains("not valid JSON")),
        "Unexpected outcome: {outcome:?}"
    );
    assert_eq!(telegram.texts().len(), 1);
}

/// Tests that an unknown status is reported with the list of valid codes.
#[tokio::test]
async fn test_unknown_status_is_reported() {
    let api = HomeworkApi::default();
    api.respond_json(
        StatusCode::OK,
        &json!({
            "homeworks": [{"homework_name": "lab1", "status": "on_hold"}],
            "current_date": 2000
        }),
    );
    let telegram = TelegramApi::default();
    let endpoint = api.start().await;
    let telegram_url = telegram.start().await;

    let mut poller = build_poller(&endpoint, &telegram_url, 1000, Duration::from_secs(1));
    poller.run_iteration().await;

    let texts = telegram.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("on_hold"));
    assert!(texts[0].contains("approved, reviewing, rejected"));
}

/// Tests that a rejecting chat never breaks the loop.
#[tokio::test]
async fn test_rejected_delivery_does_not_stop_polling() {
    let api = HomeworkApi::default();
    api.respond_json(
        StatusCode::OK,
        &json!({
            "homeworks": [{"homework_name": "lab1", "status": "reviewing"}],
            "current_date": 2000
        }),
    );
    let telegram = TelegramApi::rejecting();
    let endpoint = api.start().await;
    let telegram_url = telegram.start().await;

    let mut poller = build_poller(&endpoint, &telegram_url, 1000, Duration::from_secs(1));
    let outcome = poller.run_iteration().await;

    assert_eq!(
        outcome,
        IterationOutcome::Notified {
            sent: 1,
            delivered: 0
        }
    );
    assert_eq!(poller.state().cursor, 2000);
}

/// Tests that an unreachable endpoint is reported as unavailable.
#[tokio::test]
async fn test_unreachable_endpoint_is_reported() {
    let telegram = TelegramApi::default();
    let telegram_url = telegram.start().await;

    let mut poller = build_poller(
        "http://127.0.0.1:9/api/user_api/homework_statuses/",
        &telegram_url,
        1000,
        Duration::from_secs(1),
    );
    let outcome = poller.run_iteration().await;

    assert!(matches!(outcome, IterationOutcome::Failed { reported: true, .. }));
    let texts = telegram.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Endpoint unavailable"));
}

/// Tests the full loop: it keeps polling on the retry interval and follows
/// the cursor the API hands back.
#[tokio::test]
async fn test_loop_follows_cursor_until_shutdown() {
    let api = HomeworkApi::default();
    api.respond_json(
        StatusCode::OK,
        &json!({
            "homeworks": [{"homework_name": "lab1", "status": "approved"}],
            "current_date": 2000
        }),
    );
    let telegram = TelegramApi::default();
    let endpoint = api.start().await;
    let telegram_url = telegram.start().await;

    let mut poller = build_poller(&endpoint, &telegram_url, 1000, Duration::from_millis(20));
    poller
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await;

    let from_dates = api.from_dates();
    assert!(from_dates.len() >= 2, "Expected several polls, got {from_dates:?}");
    assert_eq!(from_dates[0], "1000");
    assert!(from_dates[1..].iter().all(|d| d == "2000"));
    assert_eq!(telegram.texts().len(), 1);
}
