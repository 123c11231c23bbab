//! Chain validation. Verdicts are recomputed from stored fields only; the
//! cached `is_valid` flag is never consulted.
use crate::{constants::GENESIS_PREVIOUS_HASH, meets_difficulty, Block};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    /// `index` does not match the block's position in the chain.
    IndexOutOfSequence,
    /// `previous_hash` is not the predecessor's hash (or `"0"` for genesis).
    BrokenLink,
    /// Stored hash differs from the recomputed one.
    HashMismatch,
    /// Edited or relinked after mining and not re-mined since.
    Tampered,
    /// Hash does not carry the leading zeros of the recorded difficulty.
    InsufficientWork,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        self == Verdict::Valid
    }
}

/// Checks run in order: position, link, hash, tamper mark, work. The first
/// failure wins.
pub fn verify_block(position: usize, block: &Block, previous: Option<&Block>) -> Verdict {
    if block.header.index != position as u64 {
        return Verdict::IndexOutOfSequence;
    }
    let expected_previous = previous.map_or(GENESIS_PREVIOUS_HASH, |p| p.hash.as_str());
    if block.header.previous_hash != expected_previous {
        return Verdict::BrokenLink;
    }
    if block.compute_hash() != block.hash {
        return Verdict::HashMismatch;
    }
    if block.tampered {
        return Verdict::Tampered;
    }
    if !meets_difficulty(&block.hash, block.difficulty) {
        return Verdict::InsufficientWork;
    }
    Verdict::Valid
}

fn predecessor(chain: &[Block], position: usize) -> Option<&Block> {
    position.checked_sub(1).map(|p| &chain[p])
}

/// One independent verdict per block; a failure does not stop the scan.
pub fn block_verdicts(chain: &[Block]) -> Vec<Verdict> {
    chain
        .iter()
        .enumerate()
        .map(|(position, block)| {
            let verdict = verify_block(position, block, predecessor(chain, position));
            debug!(block = position, ?verdict, "verified block");
            verdict
        })
        .collect()
}

/// `true` iff every block verifies. Stops at the first failure; an empty
/// chain is vacuously valid.
pub fn validate_chain(chain: &[Block]) -> bool {
    chain.iter().enumerate().all(|(position, block)| {
        verify_block(position, block, predecessor(chain, position)).is_valid()
    })
}

/// Copy of `chain` with `is_valid` recomputed. `is_mining` is left alone.
pub fn annotate_chain(chain: &[Block]) -> Vec<Block> {
    ChainReport::of(chain).annotate(chain)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReport {
    pub valid: bool,
    pub verdicts: Vec<Verdict>,
}

impl ChainReport {
    pub fn of(chain: &[Block]) -> Self {
        let verdicts = block_verdicts(chain);
        Self {
            valid: verdicts.iter().all(|v| v.is_valid()),
            verdicts,
        }
    }

    pub fn first_invalid(&self) -> Option<usize> {
        self.verdicts.iter().position(|v| !v.is_valid())
    }

    /// Copy `chain` with `is_valid` taken from this report's verdicts, without
    /// hashing anything again. `chain` must be the snapshot the report was
    /// built from.
    pub fn annotate(&self, chain: &[Block]) -> Vec<Block> {
        chain
            .iter()
            .zip(&self.verdicts)
            .map(|(block, verdict)| Block {
                is_valid: verdict.is_valid(),
                ..block.clone()
            })
            .collect()
    }
}
