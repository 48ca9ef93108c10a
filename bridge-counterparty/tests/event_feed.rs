// bridge-counterparty/tests/event_feed.rs

// What an off-chain relayer sees when it subscribes to the counterparty.

use std::time::Duration;

use bridge_counterparty::{
    test_utils::{test_secret, test_transfer_id, Fixture, OUTSIDER},
    BridgeEvent,
};
use serde_json::json;

#[tokio::test]
async fn events_serialize_for_relayers() {
    let fixture = Fixture::new(1_000).await;
    let mut events = fixture.counterparty.subscribe();
    let id = test_transfer_id(7);
    let secret = test_secret(7);

    fixture.lock(id, &secret, 42).await.unwrap();
    fixture.complete(OUTSIDER, id, &secret).await.unwrap();

    let locked = serde_json::to_value(events.recv().await.unwrap()).unwrap();
    assert_eq!(locked["event"], "locked");
    assert_eq!(locked["bridge_transfer_id"], json!(hex::encode(id.0)));
    assert_eq!(locked["hash_lock"], json!(hex::encode(fixture.hash_lock(&secret).0)));
    assert_eq!(locked["time_lock_window"], json!(86_400));

    let completed = events.recv().await.unwrap();
    let value = serde_json::to_value(&completed).unwrap();
    assert_eq!(value["event"], "completed");
    assert_eq!(value["pre_image"], json!(hex::encode(&secret.0)));

    let parsed: BridgeEvent = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, completed);
}

#[tokio::test]
async fn rejected_calls_publish_nothing() {
    let fixture = Fixture::new(10).await;
    let mut events = fixture.counterparty.subscribe();
    let id = test_transfer_id(1);

    assert!(fixture.lock(id, &test_secret(1), 11).await.is_err());
    assert!(fixture.complete(OUTSIDER, id, &test_secret(1)).await.is_err());
    assert!(fixture.abort(id).await.is_err());
    assert!(events.try_recv().is_err());

    fixture.lock(id, &test_secret(1), 10).await.unwrap();
    fixture.clock.advance(Duration::from_secs(86_401));
    fixture.abort(id).await.unwrap();

    let ids: Vec<_> = [events.recv().await.unwrap(), events.recv().await.unwrap()]
        .iter()
        .map(BridgeEvent::bridge_transfer_id)
        .collect();
    assert_eq!(ids, vec![id, id]);
}
