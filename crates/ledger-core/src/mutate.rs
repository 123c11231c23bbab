//! Tamper simulation and re-mining.
//!
//! Both operations cascade forward: every later block is relinked to its
//! predecessor's new hash, re-hashed with its old nonce and marked
//! `tampered`. The relinked blocks are link-consistent, so the mark is what
//! the validator rejects them on until each one is re-mined in order.
use crate::{
    constants::GENESIS_PREVIOUS_HASH,
    error::{check_index, Result},
    mine_block, Block, BlockHeader, Mined, Transaction,
};
use tracing::info;

/// Replace the transactions of block `index` without redoing its work.
pub fn mutate_block(
    chain: &[Block],
    index: usize,
    transactions: Vec<Transaction>,
) -> Result<Vec<Block>> {
    check_index(index, chain.len())?;

    let mut next = chain.to_vec();
    let block = &mut next[index];
    block.header.transactions = transactions;
    block.hash = block.compute_hash();
    block.is_valid = false;
    block.tampered = true;
    cascade(&mut next, index + 1);

    info!(
        "Tampered block {}; {} descendant(s) relinked",
        index,
        next.len() - index - 1
    );
    Ok(next)
}

/// Header to re-mine at `index`: same transactions and timestamp, linked to
/// the current predecessor, nonce reset.
pub fn remine_header(chain: &[Block], index: usize) -> Result<BlockHeader> {
    check_index(index, chain.len())?;
    let previous_hash = match index {
        0 => GENESIS_PREVIOUS_HASH.to_string(),
        _ => chain[index - 1].hash.clone(),
    };
    Ok(BlockHeader {
        previous_hash,
        nonce: 0,
        ..chain[index].header.clone()
    })
}

/// Put a freshly mined header at `index` and cascade.
pub fn install_remined(
    chain: &[Block],
    index: usize,
    header: BlockHeader,
    mined: Mined,
) -> Result<Vec<Block>> {
    check_index(index, chain.len())?;

    let mut next = chain.to_vec();
    next[index] = Block::seal(header, mined);
    cascade(&mut next, index + 1);

    info!(
        "Re-mined block {} with nonce {}",
        index, next[index].header.nonce
    );
    Ok(next)
}

/// Re-run the miner on block `index`. Only that block becomes valid;
/// descendants are relinked but stay invalid.
pub fn remine_block(chain: &[Block], index: usize, difficulty: u32) -> Result<Vec<Block>> {
    let header = remine_header(chain, index)?;
    let mined = mine_block(&header, difficulty);
    install_remined(chain, index, header, mined)
}

fn cascade(chain: &mut [Block], from: usize) {
    for i in from..chain.len() {
        let previous_hash = chain[i - 1].hash.clone();
        let block = &mut chain[i];
        block.header.previous_hash = previous_hash;
        block.hash = block.compute_hash();
        block.is_valid = false;
        block.tampered = true;
    }
}
