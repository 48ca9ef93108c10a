// bridge-counterparty/tests/e2e_swap_scenarios.rs

// End-to-end runs of the three swap outcomes: completion, timeout, wrong secret.

use std::time::Duration;

use bridge_counterparty::{
    counterparty::{BridgeContractCounterparty, CounterpartyClient},
    test_utils::{test_secret, test_transfer_id, Fixture, CONTROLLER, OUTSIDER, RECIPIENT},
    BridgeEvent, BridgeTransferState, CounterpartyError, HashLockPreImage,
};
use bridge_counterparty::onchain::EscrowPool;
use ethers::types::U256;

#[tokio::test]
async fn scenario_a_happy_path() {
    let fixture = Fixture::new(1_000).await;
    let mut events = fixture.counterparty.subscribe();
    let s1 = test_transfer_id(1);
    let secret = test_secret(1);

    fixture.lock(s1, &secret, 100).await.expect("controller lock should succeed");

    // Halfway through the window the secret holder settles
    fixture.clock.advance(Duration::from_secs(12 * 60 * 60));
    let completed = fixture.complete(OUTSIDER, s1, &secret).await.unwrap();
    assert_eq!(completed.state, BridgeTransferState::Completed);

    let stored = fixture.counterparty.bridge_transfer(&s1).await.unwrap();
    assert_eq!(stored.state, BridgeTransferState::Completed);

    // Exactly one withdrawal of 100 to the recipient
    let withdrawals = fixture.pool.withdrawals().await;
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(withdrawals[0].recipient, RECIPIENT);
    assert_eq!(withdrawals[0].amount, U256::from(100));
    assert_eq!(fixture.pool.balance_of(RECIPIENT).await, U256::from(100));
    assert_eq!(fixture.pool.query_balance().await.unwrap(), U256::from(900));

    match events.recv().await.unwrap() {
        BridgeEvent::Locked { bridge_transfer_id, amount, time_lock_window, .. } => {
            assert_eq!(bridge_transfer_id, s1);
            assert_eq!(amount.0, U256::from(100));
            assert_eq!(time_lock_window, 86_400);
        }
        other => panic!("expected Locked, got {:?}", other),
    }
    assert_eq!(
        events.recv().await.unwrap(),
        BridgeEvent::Completed { bridge_transfer_id: s1, pre_image: secret }
    );
}

#[tokio::test]
async fn scenario_b_timeout_path() {
    let fixture = Fixture::new(1_000).await;
    let mut events = fixture.counterparty.subscribe();
    let s2 = test_transfer_id(2);
    let secret = test_secret(2);

    fixture.lock(s2, &secret, 100).await.unwrap();
    fixture.clock.advance(Duration::from_secs(86_400 + 1));

    let refunded = fixture.abort(s2).await.unwrap();
    assert_eq!(refunded.state, BridgeTransferState::Refunded);

    let err = fixture.complete(RECIPIENT, s2, &secret).await.unwrap_err();
    assert_eq!(err, CounterpartyError::BridgeTransferStateNotPending);

    // Aborting moves no funds
    assert!(fixture.pool.withdrawals().await.is_empty());
    assert_eq!(fixture.pool.query_balance().await.unwrap(), U256::from(1_000));

    assert!(matches!(events.recv().await.unwrap(), BridgeEvent::Locked { .. }));
    assert_eq!(events.recv().await.unwrap(), BridgeEvent::Aborted { bridge_transfer_id: s2 });
}

#[tokio::test]
async fn scenario_c_wrong_secret() {
    let fixture = Fixture::new(1_000).await;
    let s3 = test_transfer_id(3);
    let secret = test_secret(3);

    fixture.lock(s3, &secret, 100).await.unwrap();

    let err = fixture.complete(OUTSIDER, s3, &test_secret(4)).await.unwrap_err();
    assert_eq!(err, CounterpartyError::InvalidSecret);
    assert_eq!(
        fixture.counterparty.bridge_transfer(&s3).await.unwrap().state,
        BridgeTransferState::Pending
    );
    assert!(fixture.pool.withdrawals().await.is_empty());

    fixture.clock.advance(Duration::from_secs(60));
    let completed = fixture.complete(OUTSIDER, s3, &secret).await.unwrap();
    assert_eq!(completed.state, BridgeTransferState::Completed);
}

#[tokio::test]
async fn relayer_client_drives_full_swap() {
    let fixture = Fixture::new(500).await;
    let controller = CounterpartyClient::new(fixture.counterparty.clone(), CONTROLLER);
    let recipient = CounterpartyClient::new(fixture.counterparty.clone(), RECIPIENT);

    let id = test_transfer_id(10);
    let secret = HashLockPreImage::random();
    let hash_lock = fixture.hash_lock(&secret);

    controller
        .lock_bridge_transfer_assets(
            id,
            hash_lock,
            bridge_counterparty::OriginatorAddress([0x42; 32]),
            bridge_counterparty::RecipientAddress(RECIPIENT),
            bridge_counterparty::Amount::from(250),
        )
        .await
        .unwrap();

    let details = recipient.get_bridge_transfer_details(id).await.unwrap().unwrap();
    assert_eq!(details.state, BridgeTransferState::Pending);
    assert_eq!(details.hash_lock, hash_lock);
    assert_eq!(details.originator.0, [0x42; 32]);

    // The recipient cannot abort, even after expiry
    fixture.clock.advance(Duration::from_secs(100));
    assert!(matches!(
        recipient.abort_bridge_transfer(id).await,
        Err(CounterpartyError::Unauthorized { .. })
    ));

    recipient.complete_bridge_transfer(id, secret).await.unwrap();
    let details = controller.get_bridge_transfer_details(id).await.unwrap().unwrap();
    assert_eq!(details.state, BridgeTransferState::Completed);
    assert_eq!(fixture.pool.balance_of(RECIPIENT).await, U256::from(250));

    assert_eq!(controller.get_bridge_transfer_details(test_transfer_id(11)).await.unwrap(), None);
}
