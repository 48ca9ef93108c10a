// EscrowPool backed by a deployed EVM pool contract, driven through Foundry's `cast` CLI

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use ethers::types::{Address, U256};
use log::{debug, info};
use regex::Regex;
use tokio::process::Command;

use crate::onchain::interface::{EscrowPool, PoolError, TransactionId};

const TX_HASH_PATTERN: &str = r"(?m)^\s*transactionHash\s+(0x[0-9a-fA-F]{64})\s*$";

#[derive(Debug, Clone)]
pub struct EvmPoolConfig {
    // Path to the `cast` executable
    pub cast_path: PathBuf,
    pub rpc_url: String,
    pub pool_address: Address,
    // Key of the account that owns the pool; transactions are signed with it
    pub signer_private_key: String,
    pub gas_limit: u64,
}

#[derive(Debug, Clone)]
pub struct EvmPool {
    config: EvmPoolConfig,
    tx_hash_pattern: Regex,
}

impl EvmPool {
    pub fn new(config: EvmPoolConfig) -> Result<Self, PoolError> {
        let tx_hash_pattern = Regex::new(TX_HASH_PATTERN)
            .map_err(|e| PoolError::Parse(format!("invalid tx hash pattern: {}", e)))?;
        Ok(EvmPool { config, tx_hash_pattern })
    }

    fn pool_address_arg(&self) -> String {
        format!("{:?}", self.config.pool_address)
    }

    // Runs a prepared cast command and returns its stdout
    async fn run(&self, mut cmd: Command, what: &str) -> Result<String, PoolError> {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        debug!("[EvmPool] Executing command: {:?}", cmd);

        let output = cmd
            .output()
            .await
            .map_err(|e| PoolError::Unavailable(format!("failed to execute cast {}: {}", what, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PoolError::Command(format!(
                "cast {} failed: status: {}, stderr: {}",
                what, output.status, stderr
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn parse_transaction_hash(&self, stdout: &str) -> Result<TransactionId, PoolError> {
        self.tx_hash_pattern
            .captures(stdout)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| PoolError::Parse(format!("no transactionHash in cast output: {}", stdout)))
    }
}

// `cast call` prints raw return data as a single hex word
fn parse_balance(stdout: &str) -> Result<U256, PoolError> {
    let hex_output = stdout.trim();
    let digits = hex_output.strip_prefix("0x").unwrap_or(hex_output);
    if digits.is_empty() {
        return Err(PoolError::Parse("empty balance output".to_string()));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| PoolError::Parse(format!("'{}' is not a hex U256: {}", hex_output, e)))
}

#[async_trait]
impl EscrowPool for EvmPool {
    fn address(&self) -> Address {
        self.config.pool_address
    }

    async fn query_balance(&self) -> Result<U256, PoolError> {
        let mut cmd = Command::new(&self.config.cast_path);
        cmd.arg("call")
            .arg(self.pool_address_arg())
            .arg("totalAssets()")
            .arg("--rpc-url")
            .arg(&self.config.rpc_url);

        let stdout = self.run(cmd, "call totalAssets").await?;
        parse_balance(&stdout)
    }

    async fn withdraw(
        &self,
        caller: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<TransactionId, PoolError> {
        // On chain the sender is the signer key; `caller` only shows up in logs
        debug!("[EvmPool] withdraw on behalf of {:?}", caller);

        let mut cmd = Command::new(&self.config.cast_path);
        cmd.arg("send")
            .arg(self.pool_address_arg())
            .arg("withdraw(address,uint256)")
            .arg(format!("{:?}", recipient))
            .arg(amount.to_string())
            .arg("--private-key")
            .arg(&self.config.signer_private_key)
            .arg("--gas-limit")
            .arg(self.config.gas_limit.to_string())
            .arg("--rpc-url")
            .arg(&self.config.rpc_url);

        let stdout = self.run(cmd, "send withdraw").await?;
        let tx_hash = self.parse_transaction_hash(&stdout)?;
        info!("[EvmPool] withdrew {} to {:?}: {}", amount, recipient, tx_hash);
        Ok(tx_hash)
    }
}
