mod common;

use std::time::Duration;

use chart_studio::clients::InferenceError;
use chart_studio::messages::{Locale, Operation, failure_message};
use chart_studio::model::{ChartOptionsPatch, ChartType, seed_data};
use chart_studio::session::Outcome;
use chart_studio::storage::{DATA_KEY, MemoryStorage, StorageBackend};
use common::{SIX_MONTHS_FENCED, ScriptedClient, session};

/// Let spawned tasks run up to their first await on the client
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn generated_data_is_applied_and_persisted() {
    let client = ScriptedClient::new().reply(SIX_MONTHS_FENCED);
    let storage = MemoryStorage::new();
    let session = session(&client, &storage);

    let outcome = session
        .generate_data("  monthly revenue for 6 months ")
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let state = session.state().await;
    assert_eq!(state.data_items.len(), 6);
    assert_eq!(state.data_items[0].name, "Jan");
    assert!(storage.get(DATA_KEY).unwrap().unwrap().contains("\"Jun\""));
    assert_eq!(session.last_error().await, None);
    assert!(!session.is_in_flight(Operation::GenerateData));

    let requests = client.requests();
    assert!(requests[0].prompt.contains("\"  monthly revenue for 6 months \""));
}

#[tokio::test]
async fn empty_prompt_is_skipped_without_a_call() {
    let client = ScriptedClient::new();
    let session = session(&client, &MemoryStorage::new());
    assert_eq!(session.generate_data("   ").await.unwrap(), Outcome::Skipped);
    assert!(client.requests().is_empty());
    assert_eq!(session.state().await.data_items, seed_data());
}

#[tokio::test]
async fn failure_keeps_last_good_state_and_records_localized_message() {
    let client = ScriptedClient::new().reply(r#"[{"name":"Jan","value":"lots"}]"#);
    let session = session(&client, &MemoryStorage::new());

    assert!(session.generate_data("x").await.is_err());
    assert_eq!(session.state().await.data_items, seed_data());
    assert_eq!(
        session.last_error().await.as_deref(),
        Some(failure_message(Locale::Es, Operation::GenerateData))
    );
    assert!(!session.is_in_flight(Operation::GenerateData));
}

#[tokio::test]
async fn insight_reads_current_chart_and_leaves_it_untouched() {
    let client = ScriptedClient::new().reply("Marzo y abril destacan.");
    let session = session(&client, &MemoryStorage::new());
    session
        .update_options(ChartOptionsPatch::chart_type(ChartType::Line))
        .await;
    let before = session.state().await;

    assert_eq!(session.generate_insights().await.unwrap(), Outcome::Applied);
    assert_eq!(session.insight().await.as_deref(), Some("Marzo y abril destacan."));
    assert_eq!(session.state().await, before);
    let requests = client.requests();
    let prompt = &requests[0].prompt;
    assert!(prompt.contains("\"line\""));
    assert!(prompt.contains("Ene"));
}

#[tokio::test]
async fn slower_older_data_request_does_not_overwrite_newer_one() {
    let client = ScriptedClient::new();
    let slow = client.gated_reply(r#"[{"name":"old","value":1}]"#);
    let fast = client.gated_reply(r#"[{"name":"new","value":2}]"#);
    let session = session(&client, &MemoryStorage::new());

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.generate_data("first").await }
    });
    settle().await;
    let second = tokio::spawn({
        let session = session.clone();
        async move { session.generate_data("second").await }
    });
    settle().await;
    assert!(session.is_in_flight(Operation::GenerateData));

    fast.notify_one();
    assert_eq!(second.await.unwrap().unwrap(), Outcome::Applied);
    slow.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), Outcome::Stale);

    let names: Vec<String> = session
        .state()
        .await
        .data_items
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, ["new"]);
    assert!(!session.is_in_flight(Operation::GenerateData));
}

#[tokio::test]
async fn stale_failure_does_not_clobber_newer_success() {
    let client = ScriptedClient::new();
    let slow = client.gated_failure(InferenceError::Timeout { timeout_ms: 1 });
    let fast = client.gated_reply(r#"[{"name":"ok","value":2}]"#);
    let session = session(&client, &MemoryStorage::new());

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.generate_data("first").await }
    });
    settle().await;
    let second = tokio::spawn({
        let session = session.clone();
        async move { session.generate_data("second").await }
    });
    settle().await;

    fast.notify_one();
    assert_eq!(second.await.unwrap().unwrap(), Outcome::Applied);
    slow.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), Outcome::Stale);
    assert_eq!(session.last_error().await, None);
}

#[tokio::test]
async fn data_and_insight_flows_do_not_wait_on_each_other() {
    let client = ScriptedClient::new();
    let data_gate = client.gated_reply(SIX_MONTHS_FENCED);
    let insight_gate = client.gated_reply("Tendencia estable.");
    let session = session(&client, &MemoryStorage::new());

    let data = tokio::spawn({
        let session = session.clone();
        async move { session.generate_data("revenue").await }
    });
    settle().await;
    let insight = tokio::spawn({
        let session = session.clone();
        async move { session.generate_insights().await }
    });
    settle().await;
    assert!(session.is_in_flight(Operation::GenerateData));
    assert!(session.is_in_flight(Operation::GenerateInsights));

    insight_gate.notify_one();
    let insight_outcome = tokio::time::timeout(Duration::from_secs(5), insight)
        .await
        .expect("insight flow blocked behind data flow")
        .unwrap()
        .unwrap();
    assert_eq!(insight_outcome, Outcome::Applied);
    assert!(session.is_in_flight(Operation::GenerateData));
    assert!(!session.is_in_flight(Operation::GenerateInsights));

    data_gate.notify_one();
    assert_eq!(data.await.unwrap().unwrap(), Outcome::Applied);
}

#[tokio::test]
async fn invalid_manual_entry_records_edit_message() {
    let session = session(&ScriptedClient::new(), &MemoryStorage::new());
    assert!(session.add_item(" ", 3.0).await.is_err());
    assert_eq!(
        session.last_error().await.as_deref(),
        Some(failure_message(Locale::Es, Operation::EditData))
    );

    let added = session.add_item("Jul", 70.0).await.unwrap();
    assert!(session.remove_item(&added.id).await);
    assert_eq!(session.state().await.data_items, seed_data());
}
