use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("block index {index} is out of range for a chain of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("chain has no blocks")]
    EmptyChain,
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Bounds-check `index` against a chain of `len` blocks.
pub fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(LedgerError::IndexOutOfRange { index, len })
    }
}
