use std::fmt;
use thiserror::Error;

/// Which stage of the two-level construction ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Partitioning keys into buckets under the load bound.
    First,
    /// Collision-free placement inside one bucket.
    Second,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::First => f.write_str("first-level"),
            Level::Second => f.write_str("second-level"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhtError {
    #[error("duplicate key in the input set")]
    DuplicateKey,
    #[error("{level} hashing failed after {attempts} attempts")]
    Exhausted { level: Level, attempts: u32 },
    #[error("no such key in the hash table")]
    KeyNotFound,
}
