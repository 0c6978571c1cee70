//! Driven ports: the network connection and the key holder.

use crate::domain::{SubmitPayload, SubmitReply, ValidatedTransaction};
use async_trait::async_trait;
use shared_types::{AccountId, Hash, LedgerIndex};
use thiserror::Error;

/// Failure talking to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Not connected")]
    Disconnected,

    #[error("Request timed out")]
    Timeout,

    #[error("Server error {code}: {message}")]
    Remote { code: String, message: String },
}

/// Request/reply access to a server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Next sequence number the network expects from `account`.
    async fn next_sequence(&self, account: &AccountId) -> Result<u32, TransportError>;

    /// Submit a signed blob, or JSON for server-side signing.
    async fn submit(&self, payload: SubmitPayload) -> Result<SubmitReply, TransportError>;

    /// Validated transactions of `account` from `min_ledger` onward.
    async fn account_tx(
        &self,
        account: &AccountId,
        min_ledger: LedgerIndex,
    ) -> Result<Vec<ValidatedTransaction>, TransportError>;
}

/// Key handling failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Derives public keys and signs signing hashes.
pub trait TransactionSigner: Send + Sync {
    /// Uppercase hex public key for `secret`.
    fn public_key(&self, secret: &str) -> Result<String, SignerError>;

    /// Signature over a 32-byte signing hash.
    fn sign(&self, secret: &str, signing_hash: &Hash) -> Result<Vec<u8>, SignerError>;
}

/// Deterministic signer for tests: the "signature" is the first 16 bytes
/// of the signing hash.
#[cfg(test)]
pub struct MockSigner {
    pub public_key: String,
}

#[cfg(test)]
impl MockSigner {
    pub fn new() -> Self {
        Self {
            public_key: format!("02{}", "AB".repeat(32)),
        }
    }
}

#[cfg(test)]
impl TransactionSigner for MockSigner {
    fn public_key(&self, secret: &str) -> Result<String, SignerError> {
        if secret.starts_with("bad") {
            return Err(SignerError::InvalidSecret(secret.to_string()));
        }
        Ok(self.public_key.clone())
    }

    fn sign(&self, _secret: &str, signing_hash: &Hash) -> Result<Vec<u8>, SignerError> {
        Ok(signing_hash[..16].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_signer_rejects_bad_secret() {
        let signer = MockSigner::new();
        assert!(signer.public_key("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").is_ok());
        assert!(matches!(
            signer.public_key("bad-secret"),
            Err(SignerError::InvalidSecret(_))
        ));
    }
}
