// In-memory escrow pool used by tests and local runs

use std::collections::HashMap;

use async_trait::async_trait;
use ethers::types::{Address, U256};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::onchain::interface::{EscrowPool, PoolError, TransactionId};

// A withdrawal the pool has executed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Withdrawal {
    pub tx_id: TransactionId,
    pub recipient: Address,
    pub amount: U256,
}

#[derive(Debug, Default)]
struct PoolState {
    balance: U256,
    // Recipient -> amount received through withdrawals
    credits: HashMap<Address, U256>,
    withdrawals: Vec<Withdrawal>,
    // Error returned by the next withdrawal, then cleared
    injected_failure: Option<PoolError>,
    nonce: u64,
}

/// Simulates the pool contract: a custodied balance, an owner allowed to withdraw,
/// and a history of executed withdrawals.
#[derive(Debug)]
pub struct PoolSimulator {
    address: Address,
    owner: Address,
    state: Mutex<PoolState>,
}

impl PoolSimulator {
    pub fn new(address: Address, owner: Address) -> Self {
        PoolSimulator {
            address,
            owner,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    // Funds the pool, as a depositor on the initiating side would
    pub async fn deposit(&self, amount: U256) {
        let mut state = self.state.lock().await;
        state.balance = state.balance.saturating_add(amount);
        debug!("PoolSim {:?}: deposit {} -> balance {}", self.address, amount, state.balance);
    }

    pub async fn balance_of(&self, recipient: Address) -> U256 {
        let state = self.state.lock().await;
        state.credits.get(&recipient).copied().unwrap_or_default()
    }

    pub async fn withdrawals(&self) -> Vec<Withdrawal> {
        self.state.lock().await.withdrawals.clone()
    }

    /// Makes the next withdrawal fail with `error` without touching balances.
    pub async fn fail_next_withdrawal(&self, error: PoolError) {
        self.state.lock().await.injected_failure = Some(error);
    }
}

#[async_trait]
impl EscrowPool for PoolSimulator {
    fn address(&self) -> Address {
        self.address
    }

    async fn query_balance(&self) -> Result<U256, PoolError> {
        Ok(self.state.lock().await.balance)
    }

    async fn withdraw(
        &self,
        caller: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<TransactionId, PoolError> {
        let mut state = self.state.lock().await;

        if let Some(error) = state.injected_failure.take() {
            warn!("PoolSim {:?}: injected withdrawal failure: {}", self.address, error);
            return Err(error);
        }
        if caller != self.owner {
            return Err(PoolError::Unauthorized { caller });
        }
        if state.balance < amount {
            return Err(PoolError::InsufficientBalance { requested: amount, available: state.balance });
        }

        state.balance -= amount;
        let credit = state.credits.entry(recipient).or_default();
        *credit = credit.saturating_add(amount);

        state.nonce += 1;
        let mut preimage = self.address.as_bytes().to_vec();
        preimage.extend_from_slice(&state.nonce.to_be_bytes());
        let tx_id = format!("0x{}", hex::encode(ethers::utils::keccak256(preimage)));

        state.withdrawals.push(Withdrawal { tx_id: tx_id.clone(), recipient, amount });
        info!("PoolSim {:?}: withdrew {} to {:?} in {}", self.address, amount, recipient, tx_id);
        Ok(tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> PoolSimulator {
        PoolSimulator::new(Address::repeat_byte(0x99), Address::repeat_byte(0x01))
    }

    #[tokio::test]
    async fn deposit_and_withdraw() {
        let pool = pool();
        let recipient = Address::repeat_byte(0x02);
        pool.deposit(U256::from(1000)).await;
        assert_eq!(pool.query_balance().await.unwrap(), U256::from(1000));

        let tx_id = pool.withdraw(pool.owner(), recipient, U256::from(100)).await.unwrap();
        assert!(tx_id.starts_with("0x"));
        assert_eq!(tx_id.len(), 66);
        assert_eq!(pool.query_balance().await.unwrap(), U256::from(900));
        assert_eq!(pool.balance_of(recipient).await, U256::from(100));

        let history = pool.withdrawals().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], Withdrawal { tx_id, recipient, amount: U256::from(100) });
    }

    #[tokio::test]
    async fn withdraw_is_owner_gated() {
        let pool = pool();
        pool.deposit(U256::from(10)).await;
        let stranger = Address::repeat_byte(0x05);
        let err = pool.withdraw(stranger, stranger, U256::from(1)).await.unwrap_err();
        assert_eq!(err, PoolError::Unauthorized { caller: stranger });
        assert_eq!(pool.query_balance().await.unwrap(), U256::from(10));
    }

    #[tokio::test]
    async fn withdraw_beyond_balance_fails() {
        let pool = pool();
        pool.deposit(U256::from(10)).await;
        let err = pool.withdraw(pool.owner(), Address::repeat_byte(2), U256::from(11)).await.unwrap_err();
        assert!(matches!(err, PoolError::InsufficientBalance { .. }));
        assert!(pool.withdrawals().await.is_empty());
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let pool = pool();
        pool.deposit(U256::from(10)).await;
        pool.fail_next_withdrawal(PoolError::Unavailable("rpc down".to_string())).await;

        let recipient = Address::repeat_byte(2);
        let err = pool.withdraw(pool.owner(), recipient, U256::from(5)).await.unwrap_err();
        assert_eq!(err, PoolError::Unavailable("rpc down".to_string()));
        assert_eq!(pool.query_balance().await.unwrap(), U256::from(10));

        pool.withdraw(pool.owner(), recipient, U256::from(5)).await.unwrap();
        assert_eq!(pool.balance_of(recipient).await, U256::from(5));
    }

    #[tokio::test]
    async fn transaction_ids_are_unique() {
        let pool = pool();
        pool.deposit(U256::from(10)).await;
        let a = pool.withdraw(pool.owner(), Address::repeat_byte(2), U256::from(1)).await.unwrap();
        let b = pool.withdraw(pool.owner(), Address::repeat_byte(2), U256::from(1)).await.unwrap();
        assert_ne!(a, b);
    }
}
