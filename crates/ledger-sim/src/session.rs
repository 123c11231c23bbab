use crate::{
    config::SimConfig,
    error::{Result, SimError},
    pool::TransactionPool,
    worker::{MinedJob, MiningJob, MiningTarget},
};
use ledger_core::{
    chain,
    mutate::{install_remined, remine_header},
    mutate_block, now_millis,
    pow::clamp_difficulty,
    Block, BlockHeader, ChainReport, LedgerError, Transaction,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What a front end shows for a block. `Restricted` wins over everything:
/// a block after an invalid one cannot be trusted or edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    Valid,
    Invalid,
    Mining,
    Restricted,
}

/// Owns the chain and the pending pool. Every chain change goes through a
/// `ledger-core` operation and replaces the whole snapshot.
///
/// Each started job gets a fresh ticket. The append flag and every re-mine
/// slot remember the ticket that holds them, so a cancelled job that finishes
/// late cannot release or install over the job that replaced it.
#[derive(Debug)]
pub struct Session {
    config: SimConfig,
    chain: Vec<Block>,
    pool: TransactionPool,
    next_ticket: u64,
    append_ticket: Option<u64>,
    remine_tickets: HashMap<usize, u64>,
}

impl Session {
    pub fn new(config: SimConfig) -> Self {
        Self::with_genesis(config, chain::genesis_block())
    }

    /// Start from a caller-built genesis, e.g. one with a frozen timestamp.
    pub fn with_genesis(config: SimConfig, genesis: Block) -> Self {
        Self {
            config: config.clamped(),
            chain: vec![genesis],
            pool: TransactionPool::new(),
            next_ticket: 0,
            append_ticket: None,
            remine_tickets: HashMap::new(),
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    /// Applies to jobs started afterwards; mined blocks keep their own target.
    pub fn set_difficulty(&mut self, difficulty: u32) {
        self.config.difficulty = clamp_difficulty(difficulty);
    }

    /// True while an append job is in flight.
    pub fn is_mining(&self) -> bool {
        self.append_ticket.is_some()
    }

    pub fn submit_transaction(&mut self, from: &str, to: &str, amount: f64) -> Result<Transaction> {
        self.pool.submit(from, to, amount)
    }

    /// Queue an already-built transaction.
    pub fn enqueue(&mut self, tx: Transaction) -> Result<()> {
        self.pool.push(tx)
    }

    pub fn start_mining(&mut self) -> Result<MiningJob> {
        self.start_mining_at(now_millis())
    }

    /// Snapshot the pool into a header on the current tip and take the
    /// session's mining flag.
    pub fn start_mining_at(&mut self, timestamp: i64) -> Result<MiningJob> {
        if self.is_mining() {
            return Err(SimError::MiningInProgress);
        }
        if self.pool.is_empty() {
            return Err(SimError::NoPendingTransactions);
        }
        let header = chain::next_header(&self.chain, self.pool.snapshot(), timestamp)?;
        let job = self.job(MiningTarget::Append, header);
        self.append_ticket = Some(job.ticket);
        Ok(job)
    }

    /// Take the slot's `is_mining` flag and build a re-mine job for it.
    pub fn start_remine(&mut self, index: usize) -> Result<MiningJob> {
        if index == 0 {
            return Err(SimError::GenesisLocked);
        }
        let header = remine_header(&self.chain, index)?;
        if self.remine_tickets.contains_key(&index) {
            return Err(SimError::SlotBusy(index));
        }
        let job = self.job(MiningTarget::Remine(index), header);
        self.remine_tickets.insert(index, job.ticket);
        self.chain[index].is_mining = true;
        Ok(job)
    }

    fn job(&mut self, target: MiningTarget, header: BlockHeader) -> MiningJob {
        self.next_ticket += 1;
        MiningJob {
            target,
            ticket: self.next_ticket,
            header,
            difficulty: self.config.difficulty,
            parallel: self.config.parallel,
        }
    }

    /// Install a finished job and return the position it landed at. A job
    /// that no longer holds its flag is rejected without touching anything;
    /// one mined against a chain that has since changed releases its flag and
    /// is dropped.
    pub fn finish(&mut self, done: MinedJob) -> Result<usize> {
        let MinedJob { job, mined } = done;
        if !self.release(job.target, job.ticket) {
            warn!(
                "Ignoring superseded mining result for block {} (ticket {})",
                job.header.index, job.ticket
            );
            return Err(SimError::Superseded(job.header.index));
        }

        match job.target {
            MiningTarget::Append => {
                let tip = chain::tip(&self.chain)?;
                if job.header.previous_hash != tip.hash || job.header.index != tip.index() + 1 {
                    warn!("Dropping stale mining result for block {}", job.header.index);
                    return Err(SimError::StaleResult(job.header.index));
                }
                let block = Block::seal(job.header, mined);
                self.pool.remove_mined(block.transactions());
                info!("Block {} has been mined successfully", block.index());
                self.chain.push(block);
                Ok(self.chain.len() - 1)
            }
            MiningTarget::Remine(index) => {
                if remine_header(&self.chain, index)? != job.header {
                    warn!("Dropping stale re-mining result for block {}", index);
                    return Err(SimError::StaleResult(job.header.index));
                }
                self.chain = install_remined(&self.chain, index, job.header, mined)?;
                info!("Block {} has been re-mined successfully", index);
                Ok(index)
            }
        }
    }

    /// Release the flag `job` holds without installing anything. Returns
    /// `false`, and changes nothing, if the job no longer holds it.
    pub fn cancel(&mut self, job: &MiningJob) -> bool {
        self.release(job.target, job.ticket)
    }

    fn release(&mut self, target: MiningTarget, ticket: u64) -> bool {
        let released = match target {
            MiningTarget::Append => {
                let current = self.append_ticket == Some(ticket);
                if current {
                    self.append_ticket = None;
                }
                current
            }
            MiningTarget::Remine(index) => {
                let current = self.remine_tickets.get(&index) == Some(&ticket);
                if current {
                    self.remine_tickets.remove(&index);
                    if let Some(block) = self.chain.get_mut(index) {
                        block.is_mining = false;
                    }
                }
                current
            }
        };
        debug!(target_slot = ?target, ticket, released, "release mining flag");
        released
    }

    /// Mine the whole pool into a new block off the async executor.
    pub async fn mine_pending(&mut self) -> Result<usize> {
        let job = self.start_mining()?;
        self.run_job(job).await
    }

    pub async fn remine(&mut self, index: usize) -> Result<usize> {
        let job = self.start_remine(index)?;
        self.run_job(job).await
    }

    async fn run_job(&mut self, job: MiningJob) -> Result<usize> {
        let (target, ticket) = (job.target, job.ticket);
        match job.spawn().join().await {
            Ok(done) => self.finish(done),
            Err(err) => {
                self.release(target, ticket);
                Err(err)
            }
        }
    }

    /// Replace a block's transactions, leaving its nonce stale.
    pub fn tamper(&mut self, index: usize, transactions: Vec<Transaction>) -> Result<()> {
        self.check_editable(index)?;
        self.chain = mutate_block(&self.chain, index, transactions)?;
        warn!(
            "Block {} modified; blocks {}..{} are no longer trusted",
            index,
            index,
            self.chain.len() - 1
        );
        Ok(())
    }

    /// Rewrite the amount of one transaction inside a mined block.
    pub fn tamper_amount(&mut self, index: usize, tx_index: usize, amount: f64) -> Result<()> {
        self.check_editable(index)?;
        let mut transactions = self.chain[index].transactions().to_vec();
        let tx = transactions
            .get_mut(tx_index)
            .ok_or(SimError::NoSuchTransaction { index, tx_index })?;
        tx.amount = amount;
        self.tamper(index, transactions)
    }

    fn check_editable(&self, index: usize) -> Result<()> {
        if index >= self.chain.len() {
            return Err(LedgerError::IndexOutOfRange {
                index,
                len: self.chain.len(),
            }
            .into());
        }
        if index == 0 {
            return Err(SimError::GenesisLocked);
        }
        if self.is_restricted(index) {
            return Err(SimError::Restricted(index));
        }
        if self.remine_tickets.contains_key(&index) {
            return Err(SimError::SlotBusy(index));
        }
        Ok(())
    }

    /// Recompute every block's verdict once and store the flags from it.
    pub fn validate(&mut self) -> ChainReport {
        let report = ChainReport::of(&self.chain);
        self.chain = report.annotate(&self.chain);
        match report.first_invalid() {
            None => info!("Blockchain is valid: all {} blocks verified", self.chain.len()),
            Some(index) => warn!("Blockchain is invalid: first bad block is {}", index),
        }
        report
    }

    /// Uses the cached flags, so it reflects the last tamper/validate.
    fn is_restricted(&self, index: usize) -> bool {
        self.chain[..index].iter().any(|b| !b.is_valid)
    }

    pub fn statuses(&self) -> Vec<BlockStatus> {
        (0..self.chain.len())
            .map(|index| {
                let block = &self.chain[index];
                if self.is_restricted(index) {
                    BlockStatus::Restricted
                } else if block.is_mining {
                    BlockStatus::Mining
                } else if !block.is_valid {
                    BlockStatus::Invalid
                } else {
                    BlockStatus::Valid
                }
            })
            .collect()
    }
}
