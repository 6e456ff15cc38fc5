//! Combined governance storage with atomic vote casting.

use crate::{ProposalStore, StoreError, VoteLedger};
use dao_types::{Proposal, VoteRecord};

/// A backend that holds both the proposal log and the vote ledger and can
/// update them together.
pub trait GovernanceStore: ProposalStore + VoteLedger {
    /// Record `vote` and bump the matching tally on its proposal as one
    /// atomic unit. Returns the updated proposal.
    ///
    /// On any error neither the ledger nor the tally has changed:
    /// - [`StoreError::NotFound`] if the proposal does not exist,
    /// - [`StoreError::InvalidTransition`] if it is no longer pending,
    /// - [`StoreError::Duplicate`] if the voter already voted on it,
    /// - [`StoreError::Overflow`] if the tally would wrap.
    fn cast_vote(&self, vote: &VoteRecord) -> Result<Proposal, StoreError>;
}
