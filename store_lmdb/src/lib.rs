//! LMDB storage backend for the DAO governance core.
//!
//! Implements the `dao-store` traits using the `heed` LMDB bindings. The
//! proposal log, the vote ledger and the schema metadata live in three named
//! databases inside a single environment, so a vote and its tally update can
//! share one write transaction.

pub mod environment;
pub mod error;
pub mod governance;
pub mod meta;
pub mod proposal;
pub mod vote;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use governance::LmdbGovernanceStore;
