//! Governance core for a small DAO.
//!
//! Lifecycle: Submit → Vote (one vote per voter per proposal) → Execute.
//! A proposal is `Pending` until it is executed after its deadline, at which
//! point it becomes `Approved` or `Rejected` and stays that way.
//!
//! Voter identities arrive already authenticated; the engine treats them as
//! opaque keys. Time comes from an injected [`Clock`](dao_types::Clock).

pub mod config;
pub mod engine;
pub mod error;

pub use config::{GovernanceConfig, OutcomePolicy};
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
