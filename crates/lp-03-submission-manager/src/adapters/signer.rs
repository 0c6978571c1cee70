//! secp256k1 ECDSA signing over the transaction signing hash.

use crate::ports::{SignerError, TransactionSigner};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use shared_types::Hash;

/// Signs with a raw 32-byte secp256k1 private key given as hex.
///
/// Signatures are DER encoded with a low S value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Signer;

impl Secp256k1Signer {
    fn key(secret: &str) -> Result<SigningKey, SignerError> {
        let raw = hex::decode(secret.trim())
            .map_err(|e| SignerError::InvalidSecret(format!("not hex: {e}")))?;
        SigningKey::from_slice(&raw)
            .map_err(|_| SignerError::InvalidSecret("not a valid secp256k1 scalar".into()))
    }
}

impl TransactionSigner for Secp256k1Signer {
    fn public_key(&self, secret: &str) -> Result<String, SignerError> {
        let key = Self::key(secret)?;
        let point = key.verifying_key().to_encoded_point(true);
        Ok(hex::encode_upper(point.as_bytes()))
    }

    fn sign(&self, secret: &str, signing_hash: &Hash) -> Result<Vec<u8>, SignerError> {
        let key = Self::key(secret)?;
        let signature: Signature = key
            .sign_prehash(signing_hash)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::signature::hazmat::PrehashVerifier;
    use k256::ecdsa::VerifyingKey;

    const SECRET: &str = "1ACAAEDECE405B2A958212629E16F2EB46B153EEE94CDD350FDEFF52795525B7";

    #[test]
    fn test_public_key_is_compressed() {
        let key = Secp256k1Signer.public_key(SECRET).unwrap();
        assert_eq!(key.len(), 66);
        assert!(key.starts_with("02") || key.starts_with("03"));
    }

    #[test]
    fn test_signature_verifies() {
        let hash = [0x5A; 32];
        let der = Secp256k1Signer.sign(SECRET, &hash).unwrap();
        let signature = Signature::from_der(&der).unwrap();
        assert!(signature.normalize_s().is_none(), "low S");

        let public = hex::decode(Secp256k1Signer.public_key(SECRET).unwrap()).unwrap();
        let verifying = VerifyingKey::from_sec1_bytes(&public).unwrap();
        assert!(verifying.verify_prehash(&hash, &signature).is_ok());
    }

    #[test]
    fn test_rejects_bad_secret() {
        assert!(matches!(
            Secp256k1Signer.public_key("zz"),
            Err(SignerError::InvalidSecret(_))
        ));
        assert!(Secp256k1Signer.public_key(&"00".repeat(32)).is_err());
    }
}
