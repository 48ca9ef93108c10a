// Hash functions usable for hash locks

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The digest a deployment compares revealed secrets against.
/// Both sides of a swap must agree on it; the EVM initiator uses keccak256.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashFunction {
    #[default]
    Keccak256,
    Sha256,
    Blake3,
}

impl HashFunction {
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        match self {
            HashFunction::Keccak256 => ethers::utils::keccak256(data),
            HashFunction::Sha256 => Sha256::digest(data).into(),
            HashFunction::Blake3 => *blake3::hash(data).as_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex32(s: &str) -> [u8; 32] {
        let bytes = hex::decode(s).unwrap();
        bytes.try_into().unwrap()
    }

    #[test]
    fn empty_input_vectors() {
        assert_eq!(
            HashFunction::Keccak256.digest(b""),
            hex32("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
        assert_eq!(
            HashFunction::Sha256.digest(b""),
            hex32("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
        assert_eq!(
            HashFunction::Blake3.digest(b""),
            hex32("af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262")
        );
    }

    #[test]
    fn default_is_keccak() {
        assert_eq!(HashFunction::default(), HashFunction::Keccak256);
    }

    #[test]
    fn serde_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&HashFunction::Sha256).unwrap(), "\"sha256\"");
        let parsed: HashFunction = serde_json::from_str("\"blake3\"").unwrap();
        assert_eq!(parsed, HashFunction::Blake3);
    }
}
