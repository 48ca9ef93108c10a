// Counterparty side of the atomic bridge

pub mod atomic_bridge;
pub mod client;
pub mod errors;
pub mod events;

pub use atomic_bridge::AtomicBridgeCounterparty;
pub use client::{BridgeContractCounterparty, BridgeContractCounterpartyResult, CounterpartyClient};
pub use errors::CounterpartyError;
pub use events::BridgeEvent;
