//! Vote ledger storage trait.

use crate::StoreError;
use dao_types::{ProposalId, VoteRecord, VoterId};

/// Records which voter voted on which proposal.
///
/// At most one record exists per `(voter, proposal)` pair, and records are
/// never removed or overwritten.
pub trait VoteLedger {
    fn has_voted(&self, voter: &VoterId, proposal: ProposalId) -> Result<bool, StoreError>;

    /// Store a vote. Fails with [`StoreError::Duplicate`] if the pair exists.
    fn record_vote(&self, vote: &VoteRecord) -> Result<(), StoreError>;

    fn get_vote(
        &self,
        voter: &VoterId,
        proposal: ProposalId,
    ) -> Result<Option<VoteRecord>, StoreError>;

    /// All votes cast on a proposal.
    fn votes_for(&self, proposal: ProposalId) -> Result<Vec<VoteRecord>, StoreError>;
}
