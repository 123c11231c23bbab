#![allow(dead_code)]

use ledger_core::{chain, Transaction};
use ledger_sim::{Session, SimConfig};

pub const DIFFICULTY: u32 = 2;

pub fn transfer(i: i64) -> Transaction {
    Transaction::new(format!("tx{i}"), "Alice", "Bob", i as f64, 1000 * i)
}

pub fn forged() -> Vec<Transaction> {
    vec![Transaction::new("tx1", "Alice", "Mallory", 1000.0, 1000)]
}

pub fn frozen_session() -> Session {
    Session::with_genesis(SimConfig::new(DIFFICULTY), chain::genesis_block_at(0))
}

/// Genesis plus `blocks` mined blocks, one transfer each, timestamps frozen at
/// 1000*i, every job run on the blocking pool.
pub async fn frozen_chain(blocks: i64) -> anyhow::Result<Session> {
    let mut session = frozen_session();
    for i in 1..=blocks {
        session.enqueue(transfer(i))?;
        let handle = session.start_mining_at(1000 * i)?.spawn();
        let done = handle.join().await?;
        session.finish(done)?;
    }
    Ok(session)
}
