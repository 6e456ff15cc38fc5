//! Fundamental types for the DAO governance core.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! timestamps and the clock capability, voter identities, proposal ids,
//! proposal records, statuses, and vote records.

pub mod error;
pub mod proposal;
pub mod time;
pub mod voter;

pub use error::TypesError;
pub use proposal::{NewProposal, Proposal, ProposalId, ProposalStatus, VoteRecord};
pub use time::{Clock, SystemClock, Timestamp};
pub use voter::VoterId;
