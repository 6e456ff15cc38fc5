//! Abstract storage traits for the DAO governance core.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The governance engine depends only on the traits.

pub mod error;
pub mod governance;
pub mod proposal;
pub mod vote;

pub use error::StoreError;
pub use governance::GovernanceStore;
pub use proposal::ProposalStore;
pub use vote::VoteLedger;
