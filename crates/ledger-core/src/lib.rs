//! Hash-linked proof-of-work chain engine.
//!
//! Every operation here is a pure function over a chain snapshot (`&[Block]`):
//! hashing, mining, validation, tamper simulation and re-mining. Callers own
//! the chain and decide when to replace it with the snapshot an operation
//! returns.
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod constants;
pub mod error;
pub mod hasher;
pub mod mutate;
pub mod pow;
pub mod validate;

pub use error::{LedgerError, Result};
pub use hasher::{calculate_hash, leading_zero_digits, meets_difficulty, HeaderHasher};
pub use mutate::{mutate_block, remine_block};
pub use pow::{mine_block, mine_block_parallel, Mined};
pub use validate::{annotate_chain, block_verdicts, validate_chain, ChainReport, Verdict};

use constants::{GENESIS_PREVIOUS_HASH, TX_ID_LEN};

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Short lowercase alphanumeric token. Unique in practice, not by construction.
pub fn generate_tx_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TX_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub timestamp: i64,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        amount: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            amount,
            timestamp,
        }
    }

    /// New transaction with a fresh id, stamped with the current time.
    pub fn issue(from: impl Into<String>, to: impl Into<String>, amount: f64) -> Self {
        Self::new(generate_tx_id(), from, to, amount, now_millis())
    }
}

/// Everything the hash commits to. This is the "block without a hash" handed
/// to the miner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
}

impl BlockHeader {
    pub fn new(
        index: u64,
        previous_hash: impl Into<String>,
        timestamp: i64,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            index,
            previous_hash: previous_hash.into(),
            timestamp,
            transactions,
            nonce: 0,
        }
    }

    /// The exact string fed to SHA-256.
    pub fn preimage(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.index,
            self.previous_hash,
            self.timestamp,
            hasher::canonical_transactions(&self.transactions),
            self.nonce
        )
    }

    pub fn hash(&self) -> String {
        calculate_hash(
            self.index,
            &self.previous_hash,
            self.timestamp,
            &self.transactions,
            self.nonce,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(flatten)]
    pub header: BlockHeader,
    pub hash: String,
    /// Leading-zero target the nonce was searched for. Not part of the preimage.
    #[serde(default)]
    pub difficulty: u32,
    /// Cached verdict. Recompute with [`annotate_chain`] before trusting it.
    #[serde(default)]
    pub is_valid: bool,
    /// Advisory flag: a mining job for this slot is in flight.
    #[serde(default)]
    pub is_mining: bool,
    /// Set when the block was edited or relinked after mining. Only sealing a
    /// freshly mined header clears it.
    #[serde(default)]
    pub tampered: bool,
}

impl Block {
    /// Attach a mining result to its header.
    pub fn seal(mut header: BlockHeader, mined: Mined) -> Self {
        header.nonce = mined.nonce;
        Self {
            header,
            hash: mined.hash,
            difficulty: mined.difficulty,
            is_valid: true,
            is_mining: false,
            tampered: false,
        }
    }

    pub fn compute_hash(&self) -> String {
        self.header.hash()
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.header.transactions
    }
}

pub mod chain {
    use super::*;

    /// Genesis block stamped with the current time.
    pub fn genesis_block() -> Block {
        genesis_block_at(now_millis())
    }

    /// Index 0, sentinel previous hash, no transactions, nonce 0. Never mined.
    pub fn genesis_block_at(timestamp: i64) -> Block {
        let header = BlockHeader::new(0, GENESIS_PREVIOUS_HASH, timestamp, vec![]);
        let hash = header.hash();
        Block {
            header,
            hash,
            difficulty: 0,
            is_valid: true,
            is_mining: false,
            tampered: false,
        }
    }

    pub fn tip(chain: &[Block]) -> Result<&Block> {
        chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Unmined header that would extend the current tip.
    pub fn next_header(
        chain: &[Block],
        transactions: Vec<Transaction>,
        timestamp: i64,
    ) -> Result<BlockHeader> {
        let tip = tip(chain)?;
        Ok(BlockHeader::new(
            tip.header.index + 1,
            tip.hash.clone(),
            timestamp,
            transactions,
        ))
    }

    /// Mine a block on top of `chain`. The caller appends it.
    pub fn mine_next(
        chain: &[Block],
        transactions: Vec<Transaction>,
        timestamp: i64,
        difficulty: u32,
    ) -> Result<Block> {
        let header = next_header(chain, transactions, timestamp)?;
        let mined = mine_block(&header, difficulty);
        Ok(Block::seal(header, mined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_AT_ZERO: &str =
        "e328a3885aa86f5165394c943b6378ed6729663b545f84b1a2bf5ce79bf0f370";

    fn sample_txs() -> Vec<Transaction> {
        vec![
            Transaction::new("t1", "Alice", "Bob", 10.0, 1_600_000_000),
            Transaction::new("t2", "Bob", "Charlie", 5.5, 1_600_000_100),
        ]
    }

    #[test]
    fn genesis_block_example() {
        let genesis = chain::genesis_block_at(0);
        assert_eq!(genesis.header.index, 0);
        assert_eq!(genesis.header.previous_hash, "0");
        assert_eq!(genesis.header.nonce, 0);
        assert!(genesis.transactions().is_empty());
        assert_eq!(genesis.hash, GENESIS_AT_ZERO);
        assert!(genesis.is_valid);
        assert!(!genesis.is_mining);
        assert!(!genesis.tampered);
    }

    #[test]
    fn genesis_hash_is_self_consistent() {
        let genesis = chain::genesis_block();
        assert_eq!(genesis.hash, genesis.compute_hash());
        assert!(genesis.header.timestamp > 0);
    }

    #[test]
    fn header_preimage_example() {
        let header = BlockHeader::new(
            1,
            "abc",
            1000,
            vec![Transaction::new("a", "X", "Y", 5.0, 1000)],
        );
        assert_eq!(
            header.preimage(),
            r#"1abc1000[{"id":"a","from":"X","to":"Y","amount":5.0,"timestamp":1000}]0"#
        );
    }

    #[test]
    fn block_hash_consistency() {
        let header = BlockHeader::new(1, GENESIS_AT_ZERO, 1_600_000_200, sample_txs());
        assert_eq!(header.hash(), header.hash());
        assert_eq!(header.hash().len(), constants::HASH_HEX_SIZE);
    }

    #[test]
    fn block_hash_changes_with_nonce() {
        let mut header = BlockHeader::new(1, GENESIS_AT_ZERO, 1_600_000_200, sample_txs());
        let hash1 = header.hash();
        header.nonce += 1;
        assert_ne!(hash1, header.hash());
    }

    #[test]
    fn block_hash_changes_with_amount() {
        let mut header = BlockHeader::new(1, GENESIS_AT_ZERO, 1_600_000_200, sample_txs());
        let hash1 = header.hash();
        header.transactions[0].amount = 1000.0;
        assert_ne!(hash1, header.hash());
    }

    #[test]
    fn transaction_equality_example() {
        let tx1 = Transaction::new("t1", "Alice", "Bob", 10.0, 1_600_000_000);
        let tx2 = Transaction::new("t1", "Alice", "Bob", 10.0, 1_600_000_000);
        let tx3 = Transaction::new("t1", "Alice", "Charlie", 10.0, 1_600_000_000);
        assert_eq!(tx1, tx2);
        assert_ne!(tx1, tx3);
    }

    #[test]
    fn transaction_serialization_example() {
        let tx = Transaction::new("t1", "Alice", "Bob", 10.0, 1_600_000_000);
        let json = serde_json::to_string(&tx).unwrap();
        let expected_json =
            r#"{"id":"t1","from":"Alice","to":"Bob","amount":10.0,"timestamp":1600000000}"#;
        assert_eq!(json, expected_json);
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, deserialized);
    }

    #[test]
    fn block_serializes_with_camel_case_fields() {
        let genesis = chain::genesis_block_at(0);
        let value = serde_json::to_value(&genesis).unwrap();
        assert_eq!(value["previousHash"], "0");
        assert_eq!(value["isValid"], true);
        assert_eq!(value["isMining"], false);
        assert_eq!(value["hash"], GENESIS_AT_ZERO);
        let back: Block = serde_json::from_value(value).unwrap();
        assert_eq!(back, genesis);
    }

    #[test]
    fn issued_transactions_get_fresh_ids() {
        let tx1 = Transaction::issue("Alice", "Bob", 1.0);
        let tx2 = Transaction::issue("Alice", "Bob", 1.0);
        assert_eq!(tx1.id.len(), constants::TX_ID_LEN);
        assert!(tx1
            .id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(tx1.id, tx2.id);
        assert!(tx1.timestamp > 0);
    }

    #[test]
    fn next_header_extends_tip() {
        let chain = vec![chain::genesis_block_at(0)];
        let header = chain::next_header(&chain, sample_txs(), 42).unwrap();
        assert_eq!(header.index, 1);
        assert_eq!(header.previous_hash, GENESIS_AT_ZERO);
        assert_eq!(header.timestamp, 42);
        assert_eq!(header.nonce, 0);
    }

    #[test]
    fn next_header_on_empty_chain_fails() {
        let err = chain::next_header(&[], vec![], 0).unwrap_err();
        assert_eq!(err, LedgerError::EmptyChain);
    }

    #[test]
    fn mine_next_seals_a_valid_block() {
        let chain = vec![chain::genesis_block_at(0)];
        let block = chain::mine_next(&chain, sample_txs(), 1_000, 2).unwrap();
        assert_eq!(block.hash, block.compute_hash());
        assert!(block.hash.starts_with("00"));
        assert_eq!(block.difficulty, 2);
        assert!(block.is_valid);
    }
}
