// Caller identity verification for calls arriving from outside the process.
//
// A caller signs the canonical encoding of a call with an ed25519 key; the
// verified key maps to the 20-byte identity the counterparty checks against.

use ed25519_dalek::{Signer, Verifier};
use ethers::types::Address;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::counterparty::{AtomicBridgeCounterparty, CounterpartyError};
use crate::data_structures::{
    Amount, BridgeTransferDetails, BridgeTransferId, HashLock, HashLockPreImage,
    OriginatorAddress, RecipientAddress,
};

pub use ed25519_dalek::{Signature, SigningKey as SecretKey, VerifyingKey as PublicKey};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("signature does not verify for the given public key")]
    InvalidSignature,
    #[error("failed to encode call: {0}")]
    Encoding(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Counterparty(#[from] CounterpartyError),
}

pub fn generate_keypair() -> SecretKey {
    SecretKey::generate(&mut OsRng)
}

/// Identity of a key holder: the last 20 bytes of keccak256(public key).
pub fn identity_from_public_key(public_key: &PublicKey) -> Address {
    let digest = ethers::utils::keccak256(public_key.as_bytes());
    Address::from_slice(&digest[12..])
}

/// A state-changing call as submitted by an external caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CounterpartyCall {
    Lock {
        originator: OriginatorAddress,
        bridge_transfer_id: BridgeTransferId,
        hash_lock: HashLock,
        recipient: RecipientAddress,
        amount: Amount,
    },
    Complete {
        bridge_transfer_id: BridgeTransferId,
        pre_image: HashLockPreImage,
    },
    Abort {
        bridge_transfer_id: BridgeTransferId,
    },
}

// Wire form of a call, fixed-width fields only
#[derive(bincode::Encode)]
enum CallPayload {
    Lock {
        originator: [u8; 32],
        bridge_transfer_id: [u8; 32],
        hash_lock: [u8; 32],
        recipient: [u8; 20],
        amount: [u8; 32],
    },
    Complete {
        bridge_transfer_id: [u8; 32],
        pre_image: Vec<u8>,
    },
    Abort {
        bridge_transfer_id: [u8; 32],
    },
}

#[derive(bincode::Encode)]
struct SigningPayload {
    // Counterparty address, so a signature is only valid for one deployment
    domain: [u8; 20],
    call: CallPayload,
}

impl CounterpartyCall {
    /// Canonical bytes signed by the caller.
    pub fn signing_bytes(&self, domain: Address) -> Result<Vec<u8>, AuthError> {
        let call = match self {
            CounterpartyCall::Lock { originator, bridge_transfer_id, hash_lock, recipient, amount } => {
                let mut amount_bytes = [0u8; 32];
                amount.0.to_big_endian(&mut amount_bytes);
                CallPayload::Lock {
                    originator: originator.0,
                    bridge_transfer_id: bridge_transfer_id.0,
                    hash_lock: hash_lock.0,
                    recipient: recipient.0.to_fixed_bytes(),
                    amount: amount_bytes,
                }
            }
            CounterpartyCall::Complete { bridge_transfer_id, pre_image } => CallPayload::Complete {
                bridge_transfer_id: bridge_transfer_id.0,
                pre_image: pre_image.0.clone(),
            },
            CounterpartyCall::Abort { bridge_transfer_id } => {
                CallPayload::Abort { bridge_transfer_id: bridge_transfer_id.0 }
            }
        };
        let payload = SigningPayload { domain: domain.to_fixed_bytes(), call };
        bincode::encode_to_vec(&payload, bincode::config::standard())
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }
}

/// A call plus the key and signature proving who sent it. This is the form
/// calls travel in between processes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    pub call: CounterpartyCall,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl SignedCall {
    /// Checks the signature and returns the caller identity it proves.
    pub fn verify(&self, domain: Address) -> Result<Address, AuthError> {
        let message = self.call.signing_bytes(domain)?;
        self.public_key
            .verify(&message, &self.signature)
            .map_err(|_| AuthError::InvalidSignature)?;
        Ok(identity_from_public_key(&self.public_key))
    }
}

pub fn sign_call(call: CounterpartyCall, key: &SecretKey, domain: Address) -> Result<SignedCall, AuthError> {
    let message = call.signing_bytes(domain)?;
    let signature = key.sign(&message);
    Ok(SignedCall { call, public_key: key.verifying_key(), signature })
}

/// Verifies the caller, then runs the call on the counterparty as that caller.
pub async fn dispatch_signed(
    counterparty: &AtomicBridgeCounterparty,
    signed: &SignedCall,
) -> Result<BridgeTransferDetails, DispatchError> {
    let caller = signed.verify(counterparty.address())?;
    let details = match signed.call.clone() {
        CounterpartyCall::Lock { originator, bridge_transfer_id, hash_lock, recipient, amount } => {
            counterparty
                .lock_bridge_transfer(caller, originator, bridge_transfer_id, hash_lock, recipient, amount)
                .await?
        }
        CounterpartyCall::Complete { bridge_transfer_id, pre_image } => {
            counterparty.complete_bridge_transfer(caller, bridge_transfer_id, pre_image).await?
        }
        CounterpartyCall::Abort { bridge_transfer_id } => {
            counterparty.abort_bridge_transfer(caller, bridge_transfer_id).await?
        }
    };
    Ok(details)
}
