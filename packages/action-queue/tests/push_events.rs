//! End-to-end tests for push-event assembly and scheduling.
//!
//! These tests verify the full flow:
//! 1. Read dry-run effects, pending children included
//! 2. Derive triggers from the previous step
//! 3. Address events by call-stack id
//! 4. Upload the batch to the push server

use std::time::Duration;

use action_queue::{
    build_events, testing::MockWallets, ActionEffect, ActionQueueError, EffectSlot,
    ExecutionOutput, PartialEffect, PendingBroadcast, PriceLevelEffect, PushScheduler,
    TxConfsEffect,
};
use mockito::{Matcher, Server};
use push_client::{
    DeviceId, LoginId, PushClient, PushConfig, PushError, PushMessage, PushTrigger,
};
use serde_json::json;

/// Helper to build a tx-confs effect.
fn tx_confs(wallet_id: &str, tx_id: &str, confirmations: u32) -> ActionEffect {
    ActionEffect::TxConfs(TxConfsEffect {
        wallet_id: wallet_id.into(),
        tx_id: tx_id.into(),
        confirmations,
    })
}

fn output(effect: impl Into<PartialEffect>, broadcasts: Vec<PendingBroadcast>) -> ExecutionOutput {
    ExecutionOutput {
        effect: effect.into(),
        broadcast_txs: broadcasts,
    }
}

fn message() -> PushMessage {
    PushMessage {
        title: Some("Program finished".into()),
        body: Some("All steps have run".into()),
        data: None,
    }
}

fn wallets() -> MockWallets {
    MockWallets::new()
        .with_wallet("w1", "bitcoin")
        .with_wallet("w2", "ethereum")
}

#[tokio::test]
async fn test_single_step_program() {
    let init = tx_confs("w1", "t1", 1);
    let outputs = vec![output(
        ActionEffect::done(),
        vec![PendingBroadcast {
            wallet_id: "w1".into(),
            signed_tx: vec![0x01, 0xab],
        }],
    )];

    let events = build_events(&wallets(), "prog-1", &init, &outputs, Some(&message()))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event_id, "prog-1:done");
    assert_eq!(
        event.trigger,
        PushTrigger::TxConfirm {
            plugin_id: "bitcoin".into(),
            confirmations: 1,
            txid: "t1".into(),
        }
    );
    assert_eq!(event.push_message, Some(message()));
    assert!(!event.recurring);
    assert_eq!(event.broadcast_txs[0].raw_tx, "01ab");
}

#[tokio::test]
async fn test_triggers_come_from_previous_step() {
    let init = tx_confs("w1", "t0", 1);
    let outputs = vec![
        output(ActionEffect::seq(0, tx_confs("w2", "t1", 2)), vec![]),
        output(
            ActionEffect::seq(
                1,
                ActionEffect::PriceLevel(PriceLevelEffect {
                    currency_pair: "ETH_iso:USD".into(),
                    above_rate: Some(4000.0),
                    below_rate: None,
                }),
            ),
            vec![],
        ),
        output(ActionEffect::done(), vec![]),
    ];

    let events = build_events(&wallets(), "p", &init, &outputs, Some(&message()))
        .await
        .unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, vec!["p:seq_0", "p:seq_1", "p:done"]);

    assert_eq!(
        events[0].trigger,
        PushTrigger::TxConfirm {
            plugin_id: "bitcoin".into(),
            confirmations: 1,
            txid: "t0".into(),
        }
    );
    assert_eq!(
        events[1].trigger,
        PushTrigger::TxConfirm {
            plugin_id: "ethereum".into(),
            confirmations: 2,
            txid: "t1".into(),
        }
    );
    assert_eq!(
        events[2].trigger,
        PushTrigger::PriceLevel {
            currency_pair: "ETH_iso:USD".into(),
            above_rate: Some(4000.0),
            below_rate: None,
        }
    );

    assert!(events[0].push_message.is_none());
    assert!(events[1].push_message.is_none());
    assert_eq!(events[2].push_message, Some(message()));
}

#[tokio::test]
async fn test_order_survives_slow_wallets() {
    // The first step resolves the slowest wallet, so it finishes last.
    let wallets = MockWallets::new()
        .with_wallet("slow", "bitcoin")
        .with_wallet("fast", "ethereum")
        .with_delay("slow", Duration::from_millis(50));

    let init = tx_confs("slow", "t0", 1);
    let outputs = vec![
        output(ActionEffect::seq(0, tx_confs("fast", "t1", 1)), vec![]),
        output(ActionEffect::seq(1, tx_confs("fast", "t2", 1)), vec![]),
        output(ActionEffect::done(), vec![]),
    ];

    let events = build_events(&wallets, "p", &init, &outputs, Some(&message()))
        .await
        .unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, vec!["p:seq_0", "p:seq_1", "p:done"]);
    assert!(matches!(
        &events[0].trigger,
        PushTrigger::TxConfirm { plugin_id, .. } if plugin_id == "bitcoin"
    ));
}

#[tokio::test]
async fn test_par_with_pending_child_is_invariant_violation() {
    let outputs = vec![output(
        PartialEffect::Par {
            child_effects: vec![EffectSlot::Pending, EffectSlot::ready(ActionEffect::Noop)],
        },
        vec![],
    )];

    let err = build_events(&wallets(), "p", &tx_confs("w1", "t0", 1), &outputs, Some(&message()))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionQueueError::InvariantViolation(_)));
}

#[tokio::test]
async fn test_dryrun_json_round_trip_into_events() {
    let outputs: Vec<ExecutionOutput> = serde_json::from_value(json!([
        {
            "effect": {"type": "par", "childEffects": [
                {"type": "seq", "opIndex": 0, "childEffect": {"type": "noop"}},
                {"type": "seq", "opIndex": 2, "childEffect": {"type": "done"}}
            ]},
            "broadcastTxs": [{"walletId": "w2", "signedTx": "c0ffee"}]
        }
    ]))
    .unwrap();

    let events = build_events(&wallets(), "p", &tx_confs("w2", "t9", 3), &outputs, Some(&message()))
        .await
        .unwrap();

    assert_eq!(events[0].event_id, "p:par_seq_0_seq_2");
    assert_eq!(events[0].broadcast_txs[0].plugin_id, "ethereum");
    assert_eq!(events[0].broadcast_txs[0].raw_tx, "c0ffee");
}

#[tokio::test]
async fn test_dryrun_json_with_pending_seq_children() {
    let outputs: Vec<ExecutionOutput> = serde_json::from_value(json!([
        {"effect": {"type": "seq", "opIndex": 1, "childEffect": null}},
        {"effect": {"type": "par", "childEffects": [
            {"type": "seq", "opIndex": 4, "childEffect": null}
        ]}}
    ]))
    .unwrap();

    // Step 1's trigger comes from a seq whose child the dry run never reached.
    let err = build_events(&wallets(), "p", &tx_confs("w1", "t0", 1), &outputs, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ActionQueueError::InvariantViolation(_)));

    let events = build_events(&wallets(), "p", &tx_confs("w1", "t0", 1), &outputs[1..], None)
        .await
        .unwrap();
    assert_eq!(events[0].event_id, "p:par_seq_4");
}

fn scheduler_for(server: &Server) -> PushScheduler<MockWallets> {
    let config = PushConfig::new("key", DeviceId::new("device-1")).with_base_url(server.url());
    PushScheduler::new(PushClient::new(config), wallets())
}

#[tokio::test]
async fn test_schedule_uploads_batch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/login/update")
        .match_body(Matcher::PartialJson(json!({
            "apiKey": "key",
            "deviceId": "device-1",
            "loginId": "AAEC",
            "data": {
                "createEvents": [{
                    "eventId": "prog:done",
                    "recurring": false,
                    "pushMessage": {"title": "Program finished", "body": "All steps have run"},
                    "trigger": {
                        "type": "tx-confirm",
                        "pluginId": "bitcoin",
                        "confirmations": 1,
                        "txid": "t1"
                    }
                }],
                "removeEvents": []
            }
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let scheduler = scheduler_for(&server);
    let ids = scheduler
        .schedule(
            &LoginId::new(vec![0u8, 1, 2]),
            "prog",
            &tx_confs("w1", "t1", 1),
            &[output(ActionEffect::done(), vec![])],
            Some(&message()),
        )
        .await
        .unwrap();

    assert_eq!(ids, vec!["prog:done".to_string()]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_schedule_without_message_omits_push_message() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/login/update")
        .match_body(Matcher::Json(json!({
            "apiKey": "key",
            "deviceId": "device-1",
            "loginId": "AAEC",
            "data": {
                "createEvents": [{
                    "eventId": "prog:done",
                    "broadcastTxs": [],
                    "recurring": false,
                    "trigger": {
                        "type": "tx-confirm",
                        "pluginId": "bitcoin",
                        "confirmations": 1,
                        "txid": "t1"
                    }
                }],
                "removeEvents": []
            }
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let scheduler = scheduler_for(&server);
    scheduler
        .schedule(
            &LoginId::new(vec![0u8, 1, 2]),
            "prog",
            &tx_confs("w1", "t1", 1),
            &[output(ActionEffect::done(), vec![])],
            None,
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_schedule_uploads_nothing_when_assembly_fails() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/login/update")
        .expect(0)
        .create_async()
        .await;

    let scheduler = scheduler_for(&server);
    let err = scheduler
        .schedule(
            &LoginId::new(vec![0u8]),
            "prog",
            &ActionEffect::Noop,
            &[output(ActionEffect::done(), vec![])],
            Some(&message()),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ActionQueueError::UnsupportedEffect { effect_type: "noop" }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_failure_with_garbage_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v2/login/update")
        .with_status(500)
        .with_body("\u{0}not json at all")
        .create_async()
        .await;

    let scheduler = scheduler_for(&server);
    let events = scheduler
        .prepare_events(
            "prog",
            &tx_confs("w1", "t1", 1),
            &[output(ActionEffect::done(), vec![])],
            Some(&message()),
        )
        .await
        .unwrap();
    let err = scheduler
        .upload_events(&LoginId::new(vec![7u8]), &events)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ActionQueueError::Push(PushError::Transport { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_scheduler_check_and_can_trigger() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v2/login")
        .with_status(200)
        .with_body(r#"{"events":[{"eventId":"prog:done","state":"complete"}]}"#)
        .create_async()
        .await;

    let scheduler = scheduler_for(&server);
    let login = LoginId::new(vec![1u8]);

    assert!(scheduler
        .check_events(&login, &["prog:done".into()])
        .await
        .unwrap());
    assert!(!scheduler
        .check_events(&login, &["prog:done".into(), "prog:seq_0".into()])
        .await
        .unwrap());

    assert!(scheduler.can_trigger(&tx_confs("w1", "t1", 1)).await.unwrap());
    assert!(!scheduler.can_trigger(&ActionEffect::done()).await.unwrap());
}
