use ethers::types::{Address, U256};
use thiserror::Error;

use crate::onchain::interface::PoolError;

/// Rejections of a counterparty operation. None of them leave a state change behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CounterpartyError {
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("zero address supplied")]
    ZeroAddress,
    #[error("pool balance {available} cannot back a lock of {requested}")]
    InsufficientPoolBalance { requested: U256, available: U256 },
    #[error("bridge transfer is not pending")]
    BridgeTransferStateNotPending,
    #[error("bridge transfer already exists")]
    BridgeTransferAlreadyExists,
    #[error("pre-image does not match the hash lock")]
    InvalidSecret,
    #[error("time lock has expired")]
    TimeLockExpired,
    #[error("time lock has not expired")]
    TimeLockNotExpired,
    #[error("caller {caller:?} is not the controller")]
    Unauthorized { caller: Address },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("escrow pool error: {0}")]
    Pool(#[from] PoolError),
}
