//! fks_table — static two-level (FKS) perfect hash table.
//!
//! - Build once from a set of **distinct** keys with values.
//! - Worst-case O(1) lookups: two hash evaluations, two array reads, no probing.
//! - Randomized build: a first-level universal hash is redrawn until
//!   Σ (bucket size)² ≤ 4n, then every bucket gets a private second-level
//!   hash over k² slots, redrawn until its k keys do not collide.
//! - Shape is frozen after construction; values can be replaced and
//!   entries erased, but keys cannot be added.
//!
//! ```
//! use fks_table::PerfectHashTable;
//!
//! let mut table = PerfectHashTable::new([
//!     ("best lyceum".to_string(), 239),
//!     ("good school".to_string(), 80),
//! ])?;
//! assert_eq!(table.find("best lyceum"), Some(&239));
//! assert_eq!(table.find("good"), None);
//! *table.at("good school")? = 610;
//! assert_eq!(table.find("good school"), Some(&610));
//! # Ok::<(), fks_table::PhtError>(())
//! ```

mod builder;
mod error;
mod hash;
mod table;
mod util;

pub use builder::{BuildConfig, Builder};
pub use error::{Level, PhtError};
pub use hash::{AffineHash, HashKey, PolynomialHash, UNIVERSAL_PRIME, UniversalHash};
pub use table::{BuildStats, Bucket, PerfectHashTable, Slot};
