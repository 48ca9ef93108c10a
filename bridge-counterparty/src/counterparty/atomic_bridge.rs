// The counterparty HTLC state machine: lock, complete, abort

use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::Address;
use log::{debug, info, warn};
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::clock::Clock;
use crate::config::CounterpartyConfig;
use crate::counterparty::errors::CounterpartyError;
use crate::counterparty::events::BridgeEvent;
use crate::data_structures::{
    Amount, BridgeTransferDetails, BridgeTransferId, BridgeTransferState, HashLock,
    HashLockPreImage, OriginatorAddress, RecipientAddress, TimeLock,
};
use crate::onchain::interface::{EscrowPool, PoolError};

// One record per transfer id. `None` means the id is known but was never locked.
type TransferSlot = Arc<Mutex<Option<BridgeTransferDetails>>>;

/// Mirrors commitments locked on the initiating chain and settles them against the escrow pool.
///
/// Every operation holds the record's slot for its whole duration, so for a given id
/// exactly one of `complete`/`abort` can ever win. Operations on different ids run
/// concurrently.
pub struct AtomicBridgeCounterparty {
    config: CounterpartyConfig,
    // Identity this component acts as towards the pool
    address: Address,
    // Controller allowed to lock, abort and rebind the pool
    owner: Address,
    pool: RwLock<Arc<dyn EscrowPool>>,
    clock: Arc<dyn Clock>,
    transfers: Mutex<HashMap<BridgeTransferId, TransferSlot>>,
    events: broadcast::Sender<BridgeEvent>,
}

impl AtomicBridgeCounterparty {
    /// Binds the controller and the escrow pool. This is the one-time initialization;
    /// zero addresses are rejected.
    pub fn new(
        config: CounterpartyConfig,
        address: Address,
        owner: Address,
        pool: Arc<dyn EscrowPool>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CounterpartyError> {
        config
            .validate()
            .map_err(|e| CounterpartyError::InvalidConfig(e.to_string()))?;
        if address.is_zero() || owner.is_zero() || pool.address().is_zero() {
            return Err(CounterpartyError::ZeroAddress);
        }

        let (events, _) = broadcast::channel(config.event_channel_capacity);
        info!(
            "Counterparty {:?}: initialized with owner {:?}, pool {:?}, window {}s",
            address,
            owner,
            pool.address(),
            config.lock_window_secs()
        );

        Ok(AtomicBridgeCounterparty {
            config,
            address,
            owner,
            pool: RwLock::new(pool),
            clock,
            transfers: Mutex::new(HashMap::new()),
            events,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub async fn escrow_pool_address(&self) -> Address {
        self.pool.read().await.address()
    }

    /// Receives every event published after the call.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Rebinds the escrow pool. Owner only.
    pub async fn set_escrow_pool(
        &self,
        caller: Address,
        pool: Arc<dyn EscrowPool>,
    ) -> Result<(), CounterpartyError> {
        self.ensure_owner(caller)?;
        let new_address = pool.address();
        if new_address.is_zero() {
            return Err(CounterpartyError::ZeroAddress);
        }
        let mut current = self.pool.write().await;
        info!("Counterparty {:?}: escrow pool {:?} -> {:?}", self.address, current.address(), new_address);
        *current = pool;
        Ok(())
    }

    /// Returns the stored record, including its current state.
    pub async fn bridge_transfer(&self, id: &BridgeTransferId) -> Option<BridgeTransferDetails> {
        let slot = self.existing_slot(id).await?;
        let record = slot.lock().await;
        record.clone()
    }

    /// Mirrors a commitment from the initiating chain. Owner only.
    ///
    /// The deadline is `now + lock_window`; callers cannot choose it. An id that already
    /// has a record, in any state, is rejected so terminal records stay terminal.
    pub async fn lock_bridge_transfer(
        &self,
        caller: Address,
        originator: OriginatorAddress,
        bridge_transfer_id: BridgeTransferId,
        hash_lock: HashLock,
        recipient: RecipientAddress,
        amount: Amount,
    ) -> Result<BridgeTransferDetails, CounterpartyError> {
        self.ensure_owner(caller)?;
        if amount.is_zero() {
            return Err(CounterpartyError::ZeroAmount);
        }

        let slot = self.slot(bridge_transfer_id).await;
        let result = self
            .lock_in_slot(&slot, originator, bridge_transfer_id, hash_lock, recipient, amount)
            .await;
        if result.is_err() {
            self.release_if_vacant(&bridge_transfer_id, slot).await;
        }
        result
    }

    async fn lock_in_slot(
        &self,
        slot: &TransferSlot,
        originator: OriginatorAddress,
        bridge_transfer_id: BridgeTransferId,
        hash_lock: HashLock,
        recipient: RecipientAddress,
        amount: Amount,
    ) -> Result<BridgeTransferDetails, CounterpartyError> {
        let mut record = slot.lock().await;
        if record.is_some() {
            warn!("Counterparty: lock rejected, {} already exists", bridge_transfer_id);
            return Err(CounterpartyError::BridgeTransferAlreadyExists);
        }

        let pool = self.current_pool().await;
        let available = pool.query_balance().await?;
        if available < amount.0 {
            return Err(CounterpartyError::InsufficientPoolBalance { requested: amount.0, available });
        }

        let window = self.config.lock_window_secs();
        let time_lock = TimeLock(self.clock.now().saturating_add(window));
        let details = BridgeTransferDetails {
            originator,
            recipient,
            amount,
            hash_lock,
            time_lock,
            state: BridgeTransferState::Pending,
        };
        *record = Some(details.clone());

        info!(
            "Counterparty: locked {} for {:?}, amount {}, expires at {}",
            bridge_transfer_id, recipient.0, amount, time_lock.0
        );
        publish(
            &self.events,
            BridgeEvent::Locked {
                bridge_transfer_id,
                recipient,
                amount,
                hash_lock,
                time_lock_window: window,
            },
        );
        Ok(details)
    }

    /// Reveals the secret and pays the recipient from the pool. Anyone may call this.
    ///
    /// The state flips to `Completed` only once the pool withdrawal has succeeded;
    /// a failed withdrawal leaves the record pending. Once the withdrawal has been
    /// issued it runs to the commit on its own task, even if this future is dropped.
    pub async fn complete_bridge_transfer(
        &self,
        caller: Address,
        bridge_transfer_id: BridgeTransferId,
        pre_image: HashLockPreImage,
    ) -> Result<BridgeTransferDetails, CounterpartyError> {
        let slot = self
            .existing_slot(&bridge_transfer_id)
            .await
            .ok_or(CounterpartyError::BridgeTransferStateNotPending)?;
        let mut record = slot.lock_owned().await;
        let details = pending(record.as_ref())?;

        if self.config.hash_function.digest(&pre_image.0) != details.hash_lock.0 {
            debug!("Counterparty: invalid secret for {} from {:?}", bridge_transfer_id, caller);
            return Err(CounterpartyError::InvalidSecret);
        }
        if details.time_lock.is_expired_at(self.clock.now()) {
            return Err(CounterpartyError::TimeLockExpired);
        }

        let pool = self.current_pool().await;
        let address = self.address;
        let events = self.events.clone();

        // The task owns the record guard until the state is written
        let settlement = tokio::spawn(async move {
            let tx_id = pool
                .withdraw(address, details.recipient.0, details.amount.0)
                .await
                .map_err(|e| {
                    warn!("Counterparty: withdrawal for {} failed: {}", bridge_transfer_id, e);
                    CounterpartyError::from(e)
                })?;

            let completed = BridgeTransferDetails { state: BridgeTransferState::Completed, ..details };
            *record = Some(completed.clone());

            info!(
                "Counterparty: completed {} by {:?}, paid {} to {:?} in {}",
                bridge_transfer_id, caller, completed.amount, completed.recipient.0, tx_id
            );
            publish(&events, BridgeEvent::Completed { bridge_transfer_id, pre_image });
            Ok::<_, CounterpartyError>(completed)
        });

        settlement.await.map_err(|e| {
            warn!("Counterparty: settlement task for {} failed: {}", bridge_transfer_id, e);
            CounterpartyError::Pool(PoolError::Unavailable(format!("settlement task failed: {}", e)))
        })?
    }

    /// Releases an expired commitment. Owner only. No funds move here; the initiating
    /// chain refunds the original depositor.
    pub async fn abort_bridge_transfer(
        &self,
        caller: Address,
        bridge_transfer_id: BridgeTransferId,
    ) -> Result<BridgeTransferDetails, CounterpartyError> {
        self.ensure_owner(caller)?;

        let slot = self
            .existing_slot(&bridge_transfer_id)
            .await
            .ok_or(CounterpartyError::BridgeTransferStateNotPending)?;
        let mut record = slot.lock().await;
        let details = pending(record.as_ref())?;

        // Strictly after the deadline; at the deadline itself completion still wins
        if !details.time_lock.is_expired_at(self.clock.now()) {
            return Err(CounterpartyError::TimeLockNotExpired);
        }

        let refunded = BridgeTransferDetails { state: BridgeTransferState::Refunded, ..details };
        *record = Some(refunded.clone());

        info!("Counterparty: aborted {}", bridge_transfer_id);
        publish(&self.events, BridgeEvent::Aborted { bridge_transfer_id });
        Ok(refunded)
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), CounterpartyError> {
        if caller != self.owner {
            warn!("Counterparty: rejected call from non-owner {:?}", caller);
            return Err(CounterpartyError::Unauthorized { caller });
        }
        Ok(())
    }

    async fn current_pool(&self) -> Arc<dyn EscrowPool> {
        self.pool.read().await.clone()
    }

    async fn slot(&self, id: BridgeTransferId) -> TransferSlot {
        let mut transfers = self.transfers.lock().await;
        transfers.entry(id).or_default().clone()
    }

    async fn existing_slot(&self, id: &BridgeTransferId) -> Option<TransferSlot> {
        self.transfers.lock().await.get(id).cloned()
    }

    // Drops a slot a rejected lock created, unless someone else holds it
    async fn release_if_vacant(&self, id: &BridgeTransferId, slot: TransferSlot) {
        let mut transfers = self.transfers.lock().await;
        // One reference in the map, one here. New holders clone under the map lock.
        if Arc::strong_count(&slot) > 2 {
            return;
        }
        let vacant = slot.try_lock().map(|record| record.is_none()).unwrap_or(false);
        if vacant && transfers.get(id).is_some_and(|stored| Arc::ptr_eq(stored, &slot)) {
            transfers.remove(id);
        }
    }
}

fn publish(events: &broadcast::Sender<BridgeEvent>, event: BridgeEvent) {
    // No subscribers is fine; events are best-effort notifications
    if events.send(event).is_err() {
        debug!("Counterparty: event dropped, no subscribers");
    }
}

fn pending(record: Option<&BridgeTransferDetails>) -> Result<BridgeTransferDetails, CounterpartyError> {
    match record {
        Some(details) if !details.state.is_terminal() => Ok(details.clone()),
        _ => Err(CounterpartyError::BridgeTransferStateNotPending),
    }
}
