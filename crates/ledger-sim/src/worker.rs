//! Background mining. The nonce search is CPU-bound, so jobs run on tokio's
//! blocking pool and the caller keeps a handle to await.
use crate::error::Result;
use ledger_core::{mine_block, mine_block_parallel, BlockHeader, Mined};
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MiningTarget {
    /// A new block on top of the current tip.
    Append,
    /// Replace the block at this position.
    Remine(usize),
}

/// Everything a worker needs; owns its own copy of the header.
#[derive(Clone, Debug)]
pub struct MiningJob {
    pub target: MiningTarget,
    /// Issued by the session when the job takes its flag. Only the holder of
    /// the current ticket for a target may release it.
    pub ticket: u64,
    pub header: BlockHeader,
    pub difficulty: u32,
    pub parallel: bool,
}

#[derive(Clone, Debug)]
pub struct MinedJob {
    pub job: MiningJob,
    pub mined: Mined,
}

impl MiningJob {
    /// Mine on the current thread.
    pub fn run(self) -> MinedJob {
        debug!(
            target_slot = ?self.target,
            ticket = self.ticket,
            difficulty = self.difficulty,
            "mining job started"
        );
        let mined = if self.parallel {
            mine_block_parallel(&self.header, self.difficulty)
        } else {
            mine_block(&self.header, self.difficulty)
        };
        MinedJob { job: self, mined }
    }

    /// Mine on the blocking pool. Must be called inside a tokio runtime.
    pub fn spawn(self) -> MiningHandle {
        let target = self.target;
        MiningHandle {
            target,
            task: tokio::task::spawn_blocking(move || self.run()),
        }
    }
}

/// Dropping the handle abandons the result; the search itself runs to
/// completion in the background.
pub struct MiningHandle {
    target: MiningTarget,
    task: JoinHandle<MinedJob>,
}

impl MiningHandle {
    pub fn target(&self) -> MiningTarget {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<MinedJob> {
        Ok(self.task.await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{chain, Transaction};

    fn job(parallel: bool) -> MiningJob {
        let genesis = chain::genesis_block_at(0);
        MiningJob {
            target: MiningTarget::Append,
            ticket: 1,
            header: BlockHeader::new(
                1,
                genesis.hash,
                1000,
                vec![Transaction::new("a", "X", "Y", 5.0, 1000)],
            ),
            difficulty: 2,
            parallel,
        }
    }

    #[test]
    fn run_mines_in_place() {
        let done = job(false).run();
        assert_eq!(done.mined.nonce, 129);
        assert_eq!(done.job.target, MiningTarget::Append);
        assert_eq!(done.job.ticket, 1);
    }

    #[tokio::test]
    async fn spawned_job_resolves_to_same_result() {
        let handle = job(true).spawn();
        assert_eq!(handle.target(), MiningTarget::Append);
        let done = handle.join().await.unwrap();
        assert_eq!(done.mined, job(false).run().mined);
    }
}
