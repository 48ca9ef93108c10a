// bridge-counterparty/src/test_utils.rs
// Shared fixtures for unit and integration tests.

use std::sync::Arc;

use ethers::types::{Address, H160, U256};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::auth::{identity_from_public_key, SecretKey};
use crate::clock::{Clock, MockClock};
use crate::config::CounterpartyConfig;
use crate::counterparty::{AtomicBridgeCounterparty, CounterpartyError};
use crate::data_structures::{
    Amount, BridgeTransferDetails, BridgeTransferId, HashLock, HashLockPreImage,
    OriginatorAddress, RecipientAddress,
};
use crate::onchain::pool_simulator::PoolSimulator;

// 2023-11-14T22:13:20Z
pub const TEST_START_TIME: u64 = 1_700_000_000;

pub const COUNTERPARTY_ADDRESS: Address = H160([0xC0; 20]);
pub const POOL_ADDRESS: Address = H160([0x99; 20]);
pub const CONTROLLER: Address = H160([0x0A; 20]);
pub const RECIPIENT: Address = H160([0x0B; 20]);
pub const OUTSIDER: Address = H160([0x0C; 20]);

// Deterministic key and its identity
pub fn create_test_signing_key(id: u8) -> (Address, SecretKey) {
    let signing_key = SecretKey::from_bytes(&[id; 32]);
    (identity_from_public_key(&signing_key.verifying_key()), signing_key)
}

pub fn test_transfer_id(index: u64) -> BridgeTransferId {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xB7;
    bytes[24..].copy_from_slice(&index.to_be_bytes());
    BridgeTransferId(bytes)
}

// Reproducible 32-byte secret for a given seed
pub fn test_secret(seed: u64) -> HashLockPreImage {
    let mut rng = SmallRng::seed_from_u64(seed);
    let bytes: [u8; 32] = rng.gen();
    HashLockPreImage(bytes.to_vec())
}

/// A counterparty wired to an in-memory pool and a mock clock.
pub struct Fixture {
    pub counterparty: Arc<AtomicBridgeCounterparty>,
    pub pool: Arc<PoolSimulator>,
    pub clock: Arc<MockClock>,
    pub config: CounterpartyConfig,
}

impl Fixture {
    pub async fn new(pool_balance: u64) -> Self {
        Self::with_config(CounterpartyConfig::default(), CONTROLLER, pool_balance).await
    }

    pub async fn with_config(config: CounterpartyConfig, controller: Address, pool_balance: u64) -> Self {
        let pool = Arc::new(PoolSimulator::new(POOL_ADDRESS, COUNTERPARTY_ADDRESS));
        pool.deposit(U256::from(pool_balance)).await;
        let clock = Arc::new(MockClock::new(TEST_START_TIME));
        let counterparty = AtomicBridgeCounterparty::new(
            config.clone(),
            COUNTERPARTY_ADDRESS,
            controller,
            pool.clone(),
            clock.clone(),
        )
        .expect("fixture counterparty must initialize");
        Fixture { counterparty: Arc::new(counterparty), pool, clock, config }
    }

    pub fn hash_lock(&self, secret: &HashLockPreImage) -> HashLock {
        HashLock::from_pre_image(self.config.hash_function, secret)
    }

    /// Locks `amount` for RECIPIENT as the controller.
    pub async fn lock(
        &self,
        id: BridgeTransferId,
        secret: &HashLockPreImage,
        amount: u64,
    ) -> Result<BridgeTransferDetails, CounterpartyError> {
        self.lock_as(self.counterparty.owner(), id, secret, amount).await
    }

    pub async fn lock_as(
        &self,
        caller: Address,
        id: BridgeTransferId,
        secret: &HashLockPreImage,
        amount: u64,
    ) -> Result<BridgeTransferDetails, CounterpartyError> {
        self.counterparty
            .lock_bridge_transfer(
                caller,
                OriginatorAddress::from(Address::repeat_byte(0x0E)),
                id,
                self.hash_lock(secret),
                RecipientAddress(RECIPIENT),
                Amount::from(amount),
            )
            .await
    }

    pub async fn complete(
        &self,
        caller: Address,
        id: BridgeTransferId,
        pre_image: &HashLockPreImage,
    ) -> Result<BridgeTransferDetails, CounterpartyError> {
        self.counterparty.complete_bridge_transfer(caller, id, pre_image.clone()).await
    }

    pub async fn abort(&self, id: BridgeTransferId) -> Result<BridgeTransferDetails, CounterpartyError> {
        self.counterparty.abort_bridge_transfer(self.counterparty.owner(), id).await
    }

    // Deadline of a record locked right now
    pub fn deadline_from_now(&self) -> u64 {
        self.clock.now() + self.config.lock_window_secs()
    }
}
