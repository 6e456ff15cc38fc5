//! Proposal log storage trait.

use crate::StoreError;
use dao_types::{NewProposal, Proposal, ProposalId, ProposalStatus, Timestamp};

/// Append-only log of proposals, indexed by position.
pub trait ProposalStore {
    /// Append a new pending proposal and return its id.
    ///
    /// Fails with [`StoreError::InvalidInput`] if the voting duration is zero
    /// or the deadline does not fit in a timestamp.
    fn append(&self, new: NewProposal) -> Result<ProposalId, StoreError>;

    /// Get a proposal by id.
    fn get(&self, id: ProposalId) -> Result<Proposal, StoreError>;

    /// Number of proposals ever appended.
    fn len(&self) -> Result<u64, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Up to `count` proposals starting at `from`, in id order.
    fn range(&self, from: u64, count: u64) -> Result<Vec<Proposal>, StoreError>;

    /// Move a pending proposal to a terminal status.
    ///
    /// Fails with [`StoreError::InvalidTransition`] if the proposal is no
    /// longer pending or `status` is not terminal.
    fn set_status(
        &self,
        id: ProposalId,
        status: ProposalStatus,
        executed_at: Timestamp,
        asserted_outcome: Option<ProposalStatus>,
    ) -> Result<Proposal, StoreError>;
}
