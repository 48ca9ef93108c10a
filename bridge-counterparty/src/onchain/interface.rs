use async_trait::async_trait;
use ethers::types::{Address, U256};
use thiserror::Error;

// Identifier of a pool transaction (e.g., a tx hash)
pub type TransactionId = String;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("caller {caller:?} is not the pool owner")]
    Unauthorized { caller: Address },
    #[error("pool balance {available} cannot cover withdrawal of {requested}")]
    InsufficientBalance { requested: U256, available: U256 },
    #[error("pool unavailable: {0}")]
    Unavailable(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("failed to parse pool response: {0}")]
    Parse(String),
}

/// The escrow pool that custodies the bridged asset.
/// The counterparty only reads its balance and, on completion, withdraws from it.
#[async_trait]
pub trait EscrowPool: Send + Sync {
    /// Address the pool is bound under. A zero address is never a valid binding.
    fn address(&self) -> Address;

    /// Total balance currently custodied by the pool.
    async fn query_balance(&self) -> Result<U256, PoolError>;

    /// Transfers `amount` to `recipient`. Only the pool owner may call this;
    /// `caller` is the identity the counterparty acts as.
    async fn withdraw(
        &self,
        caller: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<TransactionId, PoolError>;
}
