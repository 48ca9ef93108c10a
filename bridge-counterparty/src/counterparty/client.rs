// Relayer-facing handle over the counterparty, bound to a single caller identity

use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::Address;

use crate::counterparty::atomic_bridge::AtomicBridgeCounterparty;
use crate::counterparty::errors::CounterpartyError;
use crate::data_structures::{
    Amount, BridgeTransferDetails, BridgeTransferId, HashLock, HashLockPreImage,
    OriginatorAddress, RecipientAddress,
};

pub type BridgeContractCounterpartyResult<T> = Result<T, CounterpartyError>;

/// What a relayer needs from the counterparty side of the bridge.
#[async_trait]
pub trait BridgeContractCounterparty: Send + Sync {
    async fn lock_bridge_transfer_assets(
        &self,
        bridge_transfer_id: BridgeTransferId,
        hash_lock: HashLock,
        originator: OriginatorAddress,
        recipient: RecipientAddress,
        amount: Amount,
    ) -> BridgeContractCounterpartyResult<()>;

    async fn complete_bridge_transfer(
        &self,
        bridge_transfer_id: BridgeTransferId,
        pre_image: HashLockPreImage,
    ) -> BridgeContractCounterpartyResult<()>;

    async fn abort_bridge_transfer(
        &self,
        bridge_transfer_id: BridgeTransferId,
    ) -> BridgeContractCounterpartyResult<()>;

    async fn get_bridge_transfer_details(
        &self,
        bridge_transfer_id: BridgeTransferId,
    ) -> BridgeContractCounterpartyResult<Option<BridgeTransferDetails>>;
}

#[derive(Clone)]
pub struct CounterpartyClient {
    counterparty: Arc<AtomicBridgeCounterparty>,
    caller: Address,
}

impl CounterpartyClient {
    pub fn new(counterparty: Arc<AtomicBridgeCounterparty>, caller: Address) -> Self {
        CounterpartyClient { counterparty, caller }
    }
}

#[async_trait]
impl BridgeContractCounterparty for CounterpartyClient {
    async fn lock_bridge_transfer_assets(
        &self,
        bridge_transfer_id: BridgeTransferId,
        hash_lock: HashLock,
        originator: OriginatorAddress,
        recipient: RecipientAddress,
        amount: Amount,
    ) -> BridgeContractCounterpartyResult<()> {
        self.counterparty
            .lock_bridge_transfer(self.caller, originator, bridge_transfer_id, hash_lock, recipient, amount)
            .await?;
        Ok(())
    }

    async fn complete_bridge_transfer(
        &self,
        bridge_transfer_id: BridgeTransferId,
        pre_image: HashLockPreImage,
    ) -> BridgeContractCounterpartyResult<()> {
        self.counterparty
            .complete_bridge_transfer(self.caller, bridge_transfer_id, pre_image)
            .await?;
        Ok(())
    }

    async fn abort_bridge_transfer(
        &self,
        bridge_transfer_id: BridgeTransferId,
    ) -> BridgeContractCounterpartyResult<()> {
        self.counterparty.abort_bridge_transfer(self.caller, bridge_transfer_id).await?;
        Ok(())
    }

    async fn get_bridge_transfer_details(
        &self,
        bridge_transfer_id: BridgeTransferId,
    ) -> BridgeContractCounterpartyResult<Option<BridgeTransferDetails>> {
        Ok(self.counterparty.bridge_transfer(&bridge_transfer_id).await)
    }
}
