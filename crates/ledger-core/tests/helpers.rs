#![allow(dead_code)]

use ledger_core::{chain, Block, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const DIFFICULTY: u32 = 2;

pub fn transfer(i: i64) -> Transaction {
    Transaction::new(format!("tx{i}"), "Alice", "Bob", i as f64, 1000 * i)
}

/// Genesis at t=0 plus `len - 1` blocks, one transfer each, at t=1000*i.
pub fn fixed_chain(len: usize) -> Vec<Block> {
    let mut blocks = vec![chain::genesis_block_at(0)];
    for i in 1..len as i64 {
        let block = chain::mine_next(&blocks, vec![transfer(i)], 1000 * i, DIFFICULTY)
            .expect("chain is never empty");
        blocks.push(block);
    }
    blocks
}

pub fn random_txs(rng: &mut StdRng, count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|i| {
            Transaction::new(
                format!("r{}", rng.gen::<u32>()),
                format!("User{}", rng.gen_range(0..50)),
                format!("User{}", rng.gen_range(0..50)),
                rng.gen_range(0.0..10_000.0),
                1_600_000_000_000 + i as i64,
            )
        })
        .collect()
}

pub fn random_chain(seed: u64, len: usize, difficulty: u32) -> Vec<Block> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut blocks = vec![chain::genesis_block_at(1_600_000_000_000)];
    for i in 1..len as i64 {
        let count = rng.gen_range(0..6);
        let txs = random_txs(&mut rng, count);
        let block = chain::mine_next(&blocks, txs, 1_600_000_000_000 + i * 60_000, difficulty)
            .expect("chain is never empty");
        blocks.push(block);
    }
    blocks
}

pub fn forged() -> Vec<Transaction> {
    vec![Transaction::new("tx1", "Alice", "Mallory", 1000.0, 1000)]
}
