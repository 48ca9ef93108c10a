// Events published for off-chain relayers and auditors

use serde::{Deserialize, Serialize};

use crate::data_structures::{Amount, BridgeTransferId, HashLock, HashLockPreImage, RecipientAddress};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// A commitment was mirrored from the initiating chain.
    Locked {
        bridge_transfer_id: BridgeTransferId,
        recipient: RecipientAddress,
        amount: Amount,
        hash_lock: HashLock,
        // Window length in seconds, not the absolute deadline
        time_lock_window: u64,
    },
    /// The secret was revealed; relayers use it to complete the initiator side.
    Completed {
        bridge_transfer_id: BridgeTransferId,
        pre_image: HashLockPreImage,
    },
    Aborted {
        bridge_transfer_id: BridgeTransferId,
    },
}

impl BridgeEvent {
    pub fn bridge_transfer_id(&self) -> BridgeTransferId {
        match self {
            BridgeEvent::Locked { bridge_transfer_id, .. } => *bridge_transfer_id,
            BridgeEvent::Completed { bridge_transfer_id, .. } => *bridge_transfer_id,
            BridgeEvent::Aborted { bridge_transfer_id } => *bridge_transfer_id,
        }
    }
}
