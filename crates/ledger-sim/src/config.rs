use ledger_core::{constants::DEFAULT_DIFFICULTY, pow::clamp_difficulty};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Leading zero hex digits required of every mined hash.
    pub difficulty: u32,
    /// Search nonces across the rayon pool instead of one thread.
    pub parallel: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            parallel: false,
        }
    }
}

impl SimConfig {
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
        .clamped()
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::clamped)
    }

    pub fn clamped(mut self) -> Self {
        self.difficulty = clamp_difficulty(self.difficulty);
        self
    }
}
