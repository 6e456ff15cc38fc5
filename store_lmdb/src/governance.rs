//! LMDB implementation of GovernanceStore.
//!
//! `cast_vote` writes the vote record and the updated proposal in the same
//! write transaction. Any early return drops the transaction, which aborts it,
//! so the ledger and the tally change together or not at all.

use heed::types::Bytes;
use heed::{Database, Env};

use dao_store::{GovernanceStore, StoreError};
use dao_types::{Proposal, VoteRecord};

use crate::proposal::{encode_proposal, read_proposal};
use crate::vote::{vote_exists, vote_key};
use crate::LmdbError;

/// Proposal log and vote ledger sharing one LMDB environment.
#[derive(Clone)]
pub struct LmdbGovernanceStore {
    pub(crate) env: Env,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
}

impl GovernanceStore for LmdbGovernanceStore {
    fn cast_vote(&self, vote: &VoteRecord) -> Result<Proposal, StoreError> {
        let key = vote_key(vote.proposal, &vote.voter);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let proposal = read_proposal(&self.proposals_db, &wtxn, vote.proposal)?;
        if !proposal.is_pending() {
            return Err(StoreError::InvalidTransition(format!(
                "proposal {} is already {}",
                proposal.id, proposal.status
            )));
        }
        if vote_exists(&self.votes_db, &wtxn, &key)? {
            return Err(StoreError::Duplicate(format!(
                "{} already voted on {}",
                vote.voter, vote.proposal
            )));
        }
        let updated = proposal
            .with_vote(vote.support)
            .ok_or_else(|| StoreError::Overflow(format!("tally of proposal {}", proposal.id)))?;

        let vote_bytes = bincode::serialize(vote).map_err(LmdbError::from)?;
        let proposal_bytes = encode_proposal(&updated)?;
        self.votes_db
            .put(&mut wtxn, &key, &vote_bytes)
            .map_err(LmdbError::from)?;
        self.proposals_db
            .put(&mut wtxn, &updated.id.to_be_bytes(), &proposal_bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::trace!(proposal = %updated.id, voter = %vote.voter, "vote committed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use dao_store::{ProposalStore, VoteLedger};
    use dao_types::{NewProposal, ProposalId, ProposalStatus, Timestamp, VoterId};

    fn setup(dir: &std::path::Path) -> (LmdbEnvironment, ProposalId) {
        let env = LmdbEnvironment::open_default(dir).unwrap();
        let id = env
            .governance_store()
            .append(NewProposal {
                description: "Sample Proposal".to_string(),
                requested_amount: 100,
                voting_duration_secs: 30,
                created_at: Timestamp::new(1_000),
            })
            .unwrap();
        (env, id)
    }

    fn ballot(voter: &str, proposal: ProposalId, support: bool) -> VoteRecord {
        VoteRecord {
            voter: VoterId::new(voter).unwrap(),
            proposal,
            support,
            cast_at: Timestamp::new(1_005),
        }
    }

    #[test]
    fn cast_vote_updates_ledger_and_tally_together() {
        let dir = tempfile::tempdir().unwrap();
        let (env, id) = setup(dir.path());
        let store = env.governance_store();

        let after = store.cast_vote(&ballot("alice", id, true)).unwrap();
        assert_eq!((after.yes_votes, after.no_votes), (1, 0));
        store.cast_vote(&ballot("bob", id, false)).unwrap();

        let stored = store.get(id).unwrap();
        assert_eq!((stored.yes_votes, stored.no_votes), (1, 1));
        assert!(store.has_voted(&VoterId::new("bob").unwrap(), id).unwrap());
    }

    #[test]
    fn duplicate_cast_leaves_tally_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (env, id) = setup(dir.path());
        let store = env.governance_store();

        store.cast_vote(&ballot("alice", id, true)).unwrap();
        let err = store.cast_vote(&ballot("alice", id, false)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let stored = store.get(id).unwrap();
        assert_eq!((stored.yes_votes, stored.no_votes), (1, 0));
    }

    #[test]
    fn cast_on_finalized_proposal_records_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (env, id) = setup(dir.path());
        let store = env.governance_store();
        store
            .set_status(id, ProposalStatus::Rejected, Timestamp::new(2_000), None)
            .unwrap();

        let err = store.cast_vote(&ballot("alice", id, true)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition(_)));
        assert!(!store.has_voted(&VoterId::new("alice").unwrap(), id).unwrap());
    }

    #[test]
    fn cast_on_unknown_proposal_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (env, _) = setup(dir.path());
        let store = env.governance_store();
        let err = store
            .cast_vote(&ballot("alice", ProposalId::new(42), true))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let (env, id) = setup(dir.path());
            env.governance_store()
                .cast_vote(&ballot("alice", id, true))
                .unwrap();
            id
        };

        let env = LmdbEnvironment::open_default(dir.path()).unwrap();
        let store = env.governance_store();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get(id).unwrap().yes_votes, 1);
        assert!(store.has_voted(&VoterId::new("alice").unwrap(), id).unwrap());
    }
}
