//! Proof-of-work: search for the first nonce whose hash starts with
//! `difficulty` zero hex digits.
use crate::{constants::MAX_DIFFICULTY, meets_difficulty, BlockHeader, HeaderHasher};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mined {
    pub hash: String,
    pub nonce: u64,
    /// Target actually searched for, after clamping.
    pub difficulty: u32,
}

/// Clamp to [`MAX_DIFFICULTY`]; expected work grows as 16^difficulty.
pub fn clamp_difficulty(difficulty: u32) -> u32 {
    if difficulty > MAX_DIFFICULTY {
        warn!(
            "difficulty {} exceeds maximum {}, clamping",
            difficulty, MAX_DIFFICULTY
        );
        MAX_DIFFICULTY
    } else {
        difficulty
    }
}

/// Single-threaded linear search. The header's own nonce is ignored; the
/// search starts at 1 and returns the first satisfying nonce.
pub fn mine_block(header: &BlockHeader, difficulty: u32) -> Mined {
    let difficulty = clamp_difficulty(difficulty);
    let hasher = HeaderHasher::new(header);
    let mut nonce = 0u64;
    loop {
        nonce = nonce.wrapping_add(1);
        let hash = hasher.digest(nonce);
        if meets_difficulty(&hash, difficulty) {
            info!(
                "Mined block {} with nonce {} and hash {}",
                header.index, nonce, hash
            );
            return Mined {
                hash,
                nonce,
                difficulty,
            };
        }
    }
}

/// Same result as [`mine_block`], searched across the rayon pool.
/// `find_first` keeps the lowest satisfying nonce, so the answer does not
/// depend on thread scheduling.
pub fn mine_block_parallel(header: &BlockHeader, difficulty: u32) -> Mined {
    let difficulty = clamp_difficulty(difficulty);
    let hasher = HeaderHasher::new(header);

    let nonce = (1u64..u64::MAX)
        .into_par_iter()
        .find_first(|nonce| meets_difficulty(&hasher.digest(*nonce), difficulty))
        .expect("nonce space exhausted (practically impossible)");
    let hash = hasher.digest(nonce);

    info!(
        "Mined block {} with nonce {} and hash {} (parallel)",
        header.index, nonce, hash
    );
    Mined {
        hash,
        nonce,
        difficulty,
    }
}
