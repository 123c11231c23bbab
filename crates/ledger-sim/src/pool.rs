use crate::error::{Result, SimError};
use ledger_core::Transaction;
use std::collections::HashSet;
use tracing::info;

/// Transactions waiting for the next mined block.
#[derive(Clone, Debug, Default)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
}

/// Input checks the engine itself does not make.
pub fn check_transaction(tx: &Transaction) -> Result<()> {
    if tx.from.trim().is_empty() {
        return Err(SimError::InvalidTransaction("sender is empty".into()));
    }
    if tx.to.trim().is_empty() {
        return Err(SimError::InvalidTransaction("recipient is empty".into()));
    }
    if !tx.amount.is_finite() || tx.amount < 0.0 {
        return Err(SimError::InvalidTransaction(format!(
            "amount {} must be a non-negative number",
            tx.amount
        )));
    }
    Ok(())
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new transaction (fresh id, current time) and queue it.
    pub fn submit(&mut self, from: &str, to: &str, amount: f64) -> Result<Transaction> {
        let tx = Transaction::issue(from.trim(), to.trim(), amount);
        self.push(tx.clone())?;
        Ok(tx)
    }

    pub fn push(&mut self, tx: Transaction) -> Result<()> {
        check_transaction(&tx)?;
        info!("Transaction {} added to the pool", tx.id);
        self.pending.push(tx);
        Ok(())
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.pending.clone()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop the transactions that made it into a block. Anything queued after
    /// the block's snapshot was taken stays pending.
    pub fn remove_mined(&mut self, mined: &[Transaction]) {
        let ids: HashSet<&str> = mined.iter().map(|tx| tx.id.as_str()).collect();
        self.pending.retain(|tx| !ids.contains(tx.id.as_str()));
    }
}
