pub use ed25519_dalek::{SigningKey, VerifyingKey};
use anyhow::{anyhow, bail, Result};
use ed25519_dalek::{Signature, Signer, Verifier};
use mutual_types::{Address, Transaction};
use rand::rngs::OsRng;

pub fn generate_keypair() -> SigningKey {
    let mut csprng = OsRng;
    SigningKey::generate(&mut csprng)
}

pub fn address_of(key: &SigningKey) -> Address {
    key.verifying_key().to_bytes()
}

pub fn sign(key: &SigningKey, message: &[u8]) -> Vec<u8> {
    let sig: Signature = key.sign(message);
    sig.to_bytes().to_vec()
}

/// Fills in `tx.signature` over its signing bytes.
pub fn sign_transaction(key: &SigningKey, tx: &mut Transaction) {
    tx.signature = sign(key, &tx.signing_bytes());
}

pub fn verify_signature(pubkey_bytes: &Address, message: &[u8], signature_bytes: &[u8]) -> Result<()> {
    let pubkey = VerifyingKey::from_bytes(pubkey_bytes).map_err(|_| anyhow!("Invalid public key"))?;

    let raw: &[u8; 64] = match signature_bytes.try_into() {
        Ok(raw) => raw,
        Err(_) => bail!("Invalid signature length"),
    };
    let signature = Signature::from_bytes(raw);

    pubkey
        .verify(message, &signature)
        .map_err(|_| anyhow!("Signature verification failed"))
}

pub fn verify_transaction(tx: &Transaction) -> Result<()> {
    verify_signature(&tx.sender, &tx.signing_bytes(), &tx.signature)
}

/// Parses 32 bytes of hex, with or without a `0x` prefix.
pub fn parse_hex32(text: &str) -> Result<[u8; 32]> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(text.trim_start_matches("0x"), &mut out)
        .map_err(|e| anyhow!("Invalid 32-byte hex {}: {}", text, e))?;
    Ok(out)
}

pub fn parse_address(text: &str) -> Result<Address> {
    parse_hex32(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutual_types::InsuranceInstruction;

    #[test]
    fn signed_transaction_verifies() {
        let key = generate_keypair();
        let mut tx = Transaction::new(address_of(&key), 0, InsuranceInstruction::Contribute { amount: 10 });
        sign_transaction(&key, &mut tx);
        assert!(verify_transaction(&tx).is_ok());

        tx.nonce = 1;
        assert!(verify_transaction(&tx).is_err());
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let key = generate_keypair();
        let other = generate_keypair();
        let mut tx = Transaction::new(address_of(&key), 0, InsuranceInstruction::EmergencyDrain);
        sign_transaction(&other, &mut tx);
        assert!(verify_transaction(&tx).is_err());

        tx.signature.truncate(10);
        assert!(verify_transaction(&tx).is_err());
    }

    #[test]
    fn address_round_trips_through_hex() {
        let key = generate_keypair();
        let addr = address_of(&key);
        assert_eq!(parse_address(&hex::encode(addr)).unwrap(), addr);
        assert_eq!(parse_address(&format!("0x{}", hex::encode(addr))).unwrap(), addr);
        assert!(parse_address("zz").is_err());
    }
}
