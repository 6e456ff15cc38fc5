//! Nullable store: thread-safe in-memory governance storage.

use dao_store::{GovernanceStore, ProposalStore, StoreError, VoteLedger};
use dao_types::{
    NewProposal, Proposal, ProposalId, ProposalStatus, Timestamp, VoteRecord, VoterId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    proposals: Vec<Proposal>,
    votes: HashMap<ProposalId, BTreeMap<VoterId, VoteRecord>>,
}

impl Inner {
    fn proposal(&self, id: ProposalId) -> Result<&Proposal, StoreError> {
        usize::try_from(id.as_u64())
            .ok()
            .and_then(|i| self.proposals.get(i))
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", id)))
    }

    fn proposal_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, StoreError> {
        usize::try_from(id.as_u64())
            .ok()
            .and_then(|i| self.proposals.get_mut(i))
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", id)))
    }

    fn has_voted(&self, voter: &VoterId, proposal: ProposalId) -> bool {
        self.votes
            .get(&proposal)
            .is_some_and(|ballots| ballots.contains_key(voter))
    }

    fn insert_vote(&mut self, vote: &VoteRecord) {
        self.votes
            .entry(vote.proposal)
            .or_default()
            .insert(vote.voter.clone(), vote.clone());
    }
}

/// An in-memory proposal log and vote ledger.
///
/// All state sits behind one mutex, so `cast_vote` validates and then applies
/// both effects without another caller observing the gap.
#[derive(Default)]
pub struct NullGovernanceStore {
    inner: Mutex<Inner>,
}

impl NullGovernanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a proposal's tallies, e.g. to put a counter at its limit.
    pub fn set_tally(&self, id: ProposalId, yes: u64, no: u64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let proposal = inner.proposal_mut(id)?;
        proposal.yes_votes = yes;
        proposal.no_votes = no;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Mutations validate before writing; poisoned state is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProposalStore for NullGovernanceStore {
    fn append(&self, new: NewProposal) -> Result<ProposalId, StoreError> {
        let mut inner = self.lock();
        let id = ProposalId::new(inner.proposals.len() as u64);
        let proposal = Proposal::open(id, new).ok_or_else(|| {
            StoreError::InvalidInput(
                "voting duration must be positive and the deadline must fit".to_string(),
            )
        })?;
        inner.proposals.push(proposal);
        Ok(id)
    }

    fn get(&self, id: ProposalId) -> Result<Proposal, StoreError> {
        self.lock().proposal(id).cloned()
    }

    fn len(&self) -> Result<u64, StoreError> {
        Ok(self.lock().proposals.len() as u64)
    }

    fn range(&self, from: u64, count: u64) -> Result<Vec<Proposal>, StoreError> {
        let inner = self.lock();
        let start = usize::try_from(from).unwrap_or(usize::MAX);
        let take = usize::try_from(count).unwrap_or(usize::MAX);
        Ok(inner
            .proposals
            .iter()
            .skip(start)
            .take(take)
            .cloned()
            .collect())
    }

    fn set_status(
        &self,
        id: ProposalId,
        status: ProposalStatus,
        executed_at: Timestamp,
        asserted_outcome: Option<ProposalStatus>,
    ) -> Result<Proposal, StoreError> {
        if !status.is_terminal() {
            return Err(StoreError::InvalidTransition(format!(
                "proposal {} cannot move to {}",
                id, status
            )));
        }
        let mut inner = self.lock();
        let proposal = inner.proposal_mut(id)?;
        if !proposal.is_pending() {
            return Err(StoreError::InvalidTransition(format!(
                "proposal {} is already {}",
                id, proposal.status
            )));
        }
        proposal.status = status;
        proposal.executed_at = Some(executed_at);
        proposal.asserted_outcome = asserted_outcome;
        Ok(proposal.clone())
    }
}

impl VoteLedger for NullGovernanceStore {
    fn has_voted(&self, voter: &VoterId, proposal: ProposalId) -> Result<bool, StoreError> {
        Ok(self.lock().has_voted(voter, proposal))
    }

    fn record_vote(&self, vote: &VoteRecord) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.has_voted(&vote.voter, vote.proposal) {
            return Err(StoreError::Duplicate(format!(
                "{} already voted on {}",
                vote.voter, vote.proposal
            )));
        }
        inner.insert_vote(vote);
        Ok(())
    }

    fn get_vote(
        &self,
        voter: &VoterId,
        proposal: ProposalId,
    ) -> Result<Option<VoteRecord>, StoreError> {
        Ok(self
            .lock()
            .votes
            .get(&proposal)
            .and_then(|ballots| ballots.get(voter))
            .cloned())
    }

    fn votes_for(&self, proposal: ProposalId) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self
            .lock()
            .votes
            .get(&proposal)
            .map(|ballots| ballots.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl GovernanceStore for NullGovernanceStore {
    fn cast_vote(&self, vote: &VoteRecord) -> Result<Proposal, StoreError> {
        let mut inner = self.lock();

        let proposal = inner.proposal(vote.proposal)?;
        if !proposal.is_pending() {
            return Err(StoreError::InvalidTransition(format!(
                "proposal {} is already {}",
                proposal.id, proposal.status
            )));
        }
        if inner.has_voted(&vote.voter, vote.proposal) {
            return Err(StoreError::Duplicate(format!(
                "{} already voted on {}",
                vote.voter, vote.proposal
            )));
        }
        let updated = proposal
            .with_vote(vote.support)
            .ok_or_else(|| StoreError::Overflow(format!("tally of proposal {}", proposal.id)))?;

        // Nothing below can fail.
        inner.insert_vote(vote);
        *inner.proposal_mut(vote.proposal)? = updated.clone();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_proposal() -> (NullGovernanceStore, ProposalId) {
        let store = NullGovernanceStore::new();
        let id = store
            .append(NewProposal {
                description: "Sample Proposal".to_string(),
                requested_amount: 100,
                voting_duration_secs: 30,
                created_at: Timestamp::new(0),
            })
            .unwrap();
        (store, id)
    }

    fn ballot(voter: &str, proposal: ProposalId, support: bool) -> VoteRecord {
        VoteRecord {
            voter: VoterId::new(voter).unwrap(),
            proposal,
            support,
            cast_at: Timestamp::new(1),
        }
    }

    #[test]
    fn first_proposal_gets_id_zero() {
        let (store, id) = store_with_proposal();
        assert_eq!(id, ProposalId::new(0));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn overflowing_tally_rejects_vote_and_records_nothing() {
        let (store, id) = store_with_proposal();
        store.set_tally(id, u64::MAX, 0).unwrap();

        let err = store.cast_vote(&ballot("alice", id, true)).unwrap_err();
        assert!(matches!(err, StoreError::Overflow(_)));
        assert!(!store.has_voted(&VoterId::new("alice").unwrap(), id).unwrap());
        assert_eq!(store.get(id).unwrap().yes_votes, u64::MAX);
    }

    #[test]
    fn cast_vote_counts_both_sides() {
        let (store, id) = store_with_proposal();
        store.cast_vote(&ballot("alice", id, true)).unwrap();
        store.cast_vote(&ballot("bob", id, false)).unwrap();
        store.cast_vote(&ballot("carol", id, false)).unwrap();

        let p = store.get(id).unwrap();
        assert_eq!((p.yes_votes, p.no_votes), (1, 2));
        assert_eq!(store.votes_for(id).unwrap().len(), 3);
    }

    #[test]
    fn record_vote_alone_is_one_per_pair() {
        let (store, id) = store_with_proposal();
        store.record_vote(&ballot("alice", id, true)).unwrap();
        assert!(matches!(
            store.record_vote(&ballot("alice", id, true)),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn range_pages_through_log() {
        let store = NullGovernanceStore::new();
        for i in 0..4 {
            store
                .append(NewProposal {
                    description: format!("p{i}"),
                    requested_amount: 0,
                    voting_duration_secs: 10,
                    created_at: Timestamp::new(0),
                })
                .unwrap();
        }
        let page: Vec<u64> = store
            .range(1, 2)
            .unwrap()
            .iter()
            .map(|p| p.id.as_u64())
            .collect();
        assert_eq!(page, vec![1, 2]);
        assert!(store.range(u64::MAX, 1).unwrap().is_empty());
    }
}
