pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Sentinel `previous_hash` carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
/// Highest difficulty the miner will search for; ~16^6 hashes on average.
pub const MAX_DIFFICULTY: u32 = 6;
pub const DEFAULT_DIFFICULTY: u32 = 4;
pub const TX_ID_LEN: usize = 7;
