use crate::{BlockHeader, Transaction};
use sha2::{Digest, Sha256};

/// Compact JSON with fields in declaration order (id, from, to, amount, timestamp).
pub fn canonical_transactions(transactions: &[Transaction]) -> String {
    serde_json::to_string(transactions).expect("transaction fields always serialize")
}

/// SHA-256 over `index ‖ previous_hash ‖ timestamp ‖ transactions ‖ nonce`,
/// numbers in decimal, rendered as lowercase hex.
pub fn calculate_hash(
    index: u64,
    previous_hash: &str,
    timestamp: i64,
    transactions: &[Transaction],
    nonce: u64,
) -> String {
    HeaderHasher::from_parts(index, previous_hash, timestamp, transactions).digest(nonce)
}

/// Hasher state primed with every field except the nonce, so a nonce search
/// only pays for the trailing digits on each attempt.
#[derive(Clone)]
pub struct HeaderHasher {
    base: Sha256,
}

impl HeaderHasher {
    pub fn new(header: &BlockHeader) -> Self {
        Self::from_parts(
            header.index,
            &header.previous_hash,
            header.timestamp,
            &header.transactions,
        )
    }

    pub fn from_parts(
        index: u64,
        previous_hash: &str,
        timestamp: i64,
        transactions: &[Transaction],
    ) -> Self {
        let mut base = Sha256::new();
        base.update(index.to_string());
        base.update(previous_hash);
        base.update(timestamp.to_string());
        base.update(canonical_transactions(transactions));
        Self { base }
    }

    pub fn digest(&self, nonce: u64) -> String {
        let digest = self.base.clone().chain_update(nonce.to_string()).finalize();
        hex::encode(digest)
    }
}

/// Number of leading `'0'` characters in a hex digest.
pub fn leading_zero_digits(hash: &str) -> u32 {
    hash.bytes().take_while(|b| *b == b'0').count() as u32
}

pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    leading_zero_digits(hash) >= difficulty
}
