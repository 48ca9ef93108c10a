//! Counterparty side of an HTLC atomic bridge.
//!
//! A controller mirrors commitments locked on the initiating chain, anyone holding
//! the secret completes them against the escrow pool, and expired ones are aborted.

pub mod auth;
pub mod clock;
pub mod config;
pub mod counterparty;
pub mod data_structures;
pub mod hashing;
pub mod onchain;

pub mod test_utils;

pub use crate::counterparty::{AtomicBridgeCounterparty, BridgeEvent, CounterpartyError};
pub use crate::data_structures::{
    Amount, BridgeTransferDetails, BridgeTransferId, BridgeTransferState, HashLock,
    HashLockPreImage, OriginatorAddress, RecipientAddress, TimeLock,
};
