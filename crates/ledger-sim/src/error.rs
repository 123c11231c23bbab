use ledger_core::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("a block is already being mined")]
    MiningInProgress,

    #[error("block {0} is already being mined")]
    SlotBusy(usize),

    #[error("no pending transactions to mine")]
    NoPendingTransactions,

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("the genesis block cannot be edited or re-mined")]
    GenesisLocked,

    #[error("block {0} follows an invalid block and cannot be edited")]
    Restricted(usize),

    #[error("block {index} has no transaction {tx_index}")]
    NoSuchTransaction { index: usize, tx_index: usize },

    #[error("mining result for block {0} no longer fits the chain")]
    StaleResult(u64),

    #[error("mining job for block {0} was cancelled or replaced")]
    Superseded(u64),

    #[error("mining worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SimError>;
