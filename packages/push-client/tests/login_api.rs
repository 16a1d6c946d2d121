//! HTTP-level tests for the push-server client against a local mock server.

use mockito::{Matcher, Server};
use push_client::{
    DeviceId, ErrorBody, LoginId, NewPushEvent, PushClient, PushConfig, PushError, PushTrigger,
};
use serde_json::json;

fn client_for(server: &Server) -> PushClient {
    let config = PushConfig::new("test-key", DeviceId::new("device-1")).with_base_url(server.url());
    PushClient::new(config)
}

fn login_id() -> LoginId {
    LoginId::new(vec![1u8, 2, 3])
}

fn sample_event() -> NewPushEvent {
    NewPushEvent {
        event_id: "prog:done".into(),
        broadcast_txs: vec![],
        push_message: None,
        recurring: false,
        trigger: PushTrigger::TxConfirm {
            plugin_id: "bitcoin".into(),
            confirmations: 1,
            txid: "t1".into(),
        },
    }
}

#[tokio::test]
async fn test_check_events_sends_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/login")
        .match_body(Matcher::Json(json!({
            "apiKey": "test-key",
            "deviceId": "device-1",
            "loginId": "AQID"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"events": [
                {"eventId": "p:seq_0", "state": "complete"},
                {"eventId": "p:done", "state": "triggered"}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let ok = client
        .check_events(&login_id(), &["p:seq_0".into(), "p:done".into()])
        .await
        .unwrap();

    assert!(ok);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_check_events_false_when_pending_or_missing() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v2/login")
        .with_status(200)
        .with_body(
            json!({"events": [
                {"eventId": "p:a", "state": "waiting"},
                {"eventId": "p:b", "state": "complete"}
            ]})
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(!client.check_events(&login_id(), &["p:a".into()]).await.unwrap());
    assert!(!client
        .check_events(&login_id(), &["p:b".into(), "p:missing".into()])
        .await
        .unwrap());
}

#[tokio::test]
async fn test_check_events_transport_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v2/login")
        .with_status(401)
        .with_body(r#"{"message":"bad api key"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.check_events(&login_id(), &["p:a".into()]).await.unwrap_err();

    match err {
        PushError::Transport { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body.message(), "bad api key");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_events_payload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/login/update")
        .match_body(Matcher::PartialJson(json!({
            "loginId": "AQID",
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

    let client = client_for(&server);
    client.upload_events(&login_id(), &[sample_event()]).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_events_unparseable_error_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v2/login/update")
        .with_status(500)
        .with_body("<html>Internal Server Error</html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .upload_events(&login_id(), &[sample_event()])
        .await
        .unwrap_err();

    match err {
        PushError::Transport { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, ErrorBody::Raw("<html>Internal Server Error</html>".into()));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_remove_events_payload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/login/update")
        .match_body(Matcher::PartialJson(json!({
            "data": {"createEvents": [], "removeEvents": ["prog:done"]}
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = client_for(&server);
    client
        .remove_events(&login_id(), &["prog:done".into()])
        .await
        .unwrap();
    mock.assert_async().await;
}
