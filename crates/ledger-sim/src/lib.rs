//! Single-player session around `ledger-core`.
//!
//! The engine is pure; this crate owns the mutable pieces around it: the
//! chain snapshot, the pending transaction pool and the background mining
//! jobs, plus the advisory `is_mining` flags that keep one job per slot.
pub mod config;
pub mod error;
pub mod pool;
pub mod session;
pub mod worker;

pub use config::SimConfig;
pub use error::{Result, SimError};
pub use pool::TransactionPool;
pub use session::{BlockStatus, Session};
pub use worker::{MinedJob, MiningHandle, MiningJob, MiningTarget};
