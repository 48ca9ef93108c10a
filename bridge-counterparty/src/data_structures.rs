// Core bridge transfer types shared by the counterparty, the pool adapters and relayers.

use std::fmt;

use ethers::types::{Address, U256};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::hashing::HashFunction;

/// Identifier of a bridge transfer, chosen by the initiating side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BridgeTransferId(#[serde(with = "hex::serde")] pub [u8; 32]);

impl fmt::Display for BridgeTransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// Digest the revealed secret must hash to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashLock(#[serde(with = "hex::serde")] pub [u8; 32]);

impl HashLock {
    pub fn from_pre_image(hash_function: HashFunction, pre_image: &HashLockPreImage) -> Self {
        HashLock(hash_function.digest(&pre_image.0))
    }
}

impl fmt::Display for HashLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// The secret revealed by `complete`. Arbitrary length, empty included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashLockPreImage(#[serde(with = "hex::serde")] pub Vec<u8>);

impl HashLockPreImage {
    /// Generates a fresh 32-byte secret for a relayer-initiated swap.
    pub fn random() -> Self {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        HashLockPreImage(bytes.to_vec())
    }
}

/// Absolute deadline in unix seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeLock(pub u64);

impl TimeLock {
    /// Completion is allowed up to and including the deadline itself.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(pub U256);

impl Amount {
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(U256::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Local account paid out when the transfer completes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientAddress(pub Address);

// Initiating party on the counterpart ledger. Kept for audit only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginatorAddress(#[serde(with = "hex::serde")] pub [u8; 32]);

impl From<Address> for OriginatorAddress {
    // EVM addresses are left-padded into the 32-byte slot, as `bytes32(uint256(uint160(addr)))`
    fn from(address: Address) -> Self {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(address.as_bytes());
        OriginatorAddress(bytes)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeTransferState {
    Pending,
    Completed,
    Refunded,
}

impl BridgeTransferState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BridgeTransferState::Pending)
    }
}

/// A swap record as stored by the counterparty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTransferDetails {
    pub originator: OriginatorAddress,
    pub recipient: RecipientAddress,
    pub amount: Amount,
    pub hash_lock: HashLock,
    pub time_lock: TimeLock,
    pub state: BridgeTransferState,
}
