// Escrow pool collaborator: interface plus in-memory and EVM-backed implementations

pub mod evm_pool;
pub mod interface;
pub mod pool_simulator;

pub use evm_pool::{EvmPool, EvmPoolConfig};
pub use interface::{EscrowPool, PoolError, TransactionId};
pub use pool_simulator::{PoolSimulator, Withdrawal};
