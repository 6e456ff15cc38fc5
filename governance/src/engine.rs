//! Core governance engine: drives proposals from submission to finalization.
//!
//! The engine is the only place with business rules. It owns the store and
//! the clock, and serializes every mutating call behind one lock so a
//! duplicate-vote check and the tally update it guards can never interleave
//! with another call.

use std::sync::{Mutex, MutexGuard};

use dao_store::{GovernanceStore, StoreError};
use dao_types::{
    Clock, NewProposal, Proposal, ProposalId, ProposalStatus, VoteRecord, VoterId,
};
use tracing::{debug, info, warn};

use crate::config::{GovernanceConfig, OutcomePolicy};
use crate::error::GovernanceError;

pub struct GovernanceEngine<S, C> {
    store: S,
    clock: C,
    config: GovernanceConfig,
    write_lock: Mutex<()>,
}

impl<S: GovernanceStore, C: Clock> GovernanceEngine<S, C> {
    /// Build an engine over `store`, reading time from `clock`.
    pub fn new(store: S, clock: C, config: GovernanceConfig) -> Result<Self, GovernanceError> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// Build an engine with [`GovernanceConfig::default`].
    pub fn with_default_config(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            config: GovernanceConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // Guards `()`, so a poisoned lock holds no state.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Mutating operations ─────────────────────────────────────────────

    /// Submit a new proposal. Any caller may submit.
    ///
    /// The voting window opens now and closes `voting_duration_secs` later.
    pub fn submit_proposal(
        &self,
        description: impl Into<String>,
        requested_amount: u128,
        voting_duration_secs: u64,
    ) -> Result<ProposalId, GovernanceError> {
        let description = description.into();
        self.check_description(&description)?;
        if voting_duration_secs == 0 {
            warn!("rejected proposal with zero voting duration");
            return Err(GovernanceError::InvalidInput(
                "voting duration must be positive".to_string(),
            ));
        }

        let _guard = self.lock();
        let created_at = self.clock.now();
        let id = self
            .store
            .append(NewProposal {
                description,
                requested_amount,
                voting_duration_secs,
                created_at,
            })
            .map_err(|e| match e {
                StoreError::InvalidInput(msg) => GovernanceError::InvalidInput(msg),
                other => GovernanceError::Store(other),
            })?;

        info!(
            proposal = %id,
            requested_amount = %requested_amount,
            voting_duration_secs,
            %created_at,
            "proposal submitted"
        );
        Ok(id)
    }

    /// Cast `voter`'s vote on a pending proposal.
    ///
    /// Votes arriving after the deadline but before execution are accepted
    /// unless `close_voting_at_deadline` is set.
    pub fn vote(
        &self,
        voter: &VoterId,
        proposal_id: ProposalId,
        support: bool,
    ) -> Result<(), GovernanceError> {
        let _guard = self.lock();
        let proposal = self.load(proposal_id)?;
        let now = self.clock.now();

        if !proposal.is_pending() {
            warn!(proposal = %proposal_id, %voter, status = %proposal.status, "vote on closed proposal");
            return Err(GovernanceError::VotingClosed(proposal_id));
        }
        if self.config.close_voting_at_deadline && proposal.voting_ended(now) {
            warn!(proposal = %proposal_id, %voter, deadline = %proposal.deadline, %now, "vote after deadline");
            return Err(GovernanceError::VotingClosed(proposal_id));
        }
        if self.store.has_voted(voter, proposal_id)? {
            warn!(proposal = %proposal_id, %voter, "duplicate vote");
            return Err(GovernanceError::DuplicateVote {
                voter: voter.clone(),
                proposal: proposal_id,
            });
        }

        let record = VoteRecord {
            voter: voter.clone(),
            proposal: proposal_id,
            support,
            cast_at: now,
        };
        let updated = self.store.cast_vote(&record).map_err(|e| match e {
            StoreError::NotFound(_) => GovernanceError::NotFound(proposal_id),
            StoreError::InvalidTransition(_) => GovernanceError::VotingClosed(proposal_id),
            StoreError::Duplicate(_) => GovernanceError::DuplicateVote {
                voter: voter.clone(),
                proposal: proposal_id,
            },
            StoreError::Overflow(_) => GovernanceError::TallyOverflow(proposal_id),
            other => GovernanceError::Store(other),
        })?;

        debug!(
            proposal = %proposal_id,
            %voter,
            support,
            yes = updated.yes_votes,
            no = updated.no_votes,
            "vote recorded"
        );
        Ok(())
    }

    /// Finalize a proposal once its voting window has ended.
    ///
    /// `outcome` must be `Approved` or `Rejected`. Under
    /// [`OutcomePolicy::CallerAsserted`] it becomes the final status; under
    /// [`OutcomePolicy::TallyDerived`] the tallies decide and `outcome` is
    /// stored for audit. Returns the final status.
    pub fn execute_proposal(
        &self,
        proposal_id: ProposalId,
        outcome: ProposalStatus,
    ) -> Result<ProposalStatus, GovernanceError> {
        if !outcome.is_terminal() {
            return Err(GovernanceError::InvalidInput(
                "execution outcome must be approved or rejected".to_string(),
            ));
        }

        let _guard = self.lock();
        let proposal = self.load(proposal_id)?;
        if !proposal.is_pending() {
            warn!(proposal = %proposal_id, status = %proposal.status, "proposal already executed");
            return Err(GovernanceError::AlreadyExecuted(proposal_id));
        }

        let now = self.clock.now();
        if !proposal.voting_ended(now) {
            warn!(proposal = %proposal_id, deadline = %proposal.deadline, %now, "execution before deadline");
            return Err(GovernanceError::VotingStillOpen {
                proposal: proposal_id,
                deadline: proposal.deadline,
                now,
            });
        }

        let status = match self.config.outcome_policy {
            OutcomePolicy::CallerAsserted => outcome,
            OutcomePolicy::TallyDerived => {
                let derived = proposal.tally_outcome();
                if derived != outcome {
                    warn!(
                        proposal = %proposal_id,
                        asserted = %outcome,
                        derived = %derived,
                        "asserted outcome disagrees with tally"
                    );
                }
                derived
            }
        };

        let executed = self
            .store
            .set_status(proposal_id, status, now, Some(outcome))
            .map_err(|e| match e {
                StoreError::NotFound(_) => GovernanceError::NotFound(proposal_id),
                StoreError::InvalidTransition(_) => GovernanceError::AlreadyExecuted(proposal_id),
                other => GovernanceError::Store(other),
            })?;

        info!(
            proposal = %proposal_id,
            status = %executed.status,
            yes = executed.yes_votes,
            no = executed.no_votes,
            "proposal executed"
        );
        Ok(executed.status)
    }

    // ── Read-only queries ───────────────────────────────────────────────

    pub fn get_proposal(&self, proposal_id: ProposalId) -> Result<Proposal, GovernanceError> {
        self.load(proposal_id)
    }

    /// Whether `voter` has voted on `proposal_id`. Unknown proposals have no
    /// votes, so this is `false` for them rather than an error.
    pub fn has_voted(
        &self,
        voter: &VoterId,
        proposal_id: ProposalId,
    ) -> Result<bool, GovernanceError> {
        Ok(self.store.has_voted(voter, proposal_id)?)
    }

    pub fn proposals_len(&self) -> Result<u64, GovernanceError> {
        Ok(self.store.len()?)
    }

    /// Up to `count` proposals starting at id `from`.
    pub fn proposals(&self, from: u64, count: u64) -> Result<Vec<Proposal>, GovernanceError> {
        Ok(self.store.range(from, count)?)
    }

    /// All proposals still awaiting execution.
    pub fn active_proposals(&self) -> Result<Vec<Proposal>, GovernanceError> {
        let len = self.store.len()?;
        Ok(self
            .store
            .range(0, len)?
            .into_iter()
            .filter(Proposal::is_pending)
            .collect())
    }

    /// Every vote cast on `proposal_id`.
    pub fn votes(&self, proposal_id: ProposalId) -> Result<Vec<VoteRecord>, GovernanceError> {
        self.load(proposal_id)?;
        Ok(self.store.votes_for(proposal_id)?)
    }

    pub fn vote_of(
        &self,
        voter: &VoterId,
        proposal_id: ProposalId,
    ) -> Result<Option<VoteRecord>, GovernanceError> {
        Ok(self.store.get_vote(voter, proposal_id)?)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn load(&self, proposal_id: ProposalId) -> Result<Proposal, GovernanceError> {
        self.store.get(proposal_id).map_err(|e| match e {
            StoreError::NotFound(_) => GovernanceError::NotFound(proposal_id),
            other => GovernanceError::Store(other),
        })
    }

    fn check_description(&self, description: &str) -> Result<(), GovernanceError> {
        if description.trim().is_empty() {
            return Err(GovernanceError::InvalidInput(
                "description must not be empty".to_string(),
            ));
        }
        if description.len() > self.config.max_description_len {
            return Err(GovernanceError::InvalidInput(format!(
                "description is {} bytes, limit is {}",
                description.len(),
                self.config.max_description_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_nullables::{NullClock, NullGovernanceStore};
    use std::sync::Arc;

    fn engine() -> GovernanceEngine<NullGovernanceStore, Arc<NullClock>> {
        GovernanceEngine::with_default_config(
            NullGovernanceStore::new(),
            Arc::new(NullClock::new(1_000)),
        )
    }

    #[test]
    fn blank_description_is_invalid_input() {
        let engine = engine();
        let err = engine.submit_proposal("   ", 100, 30).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidInput(_)));
        assert_eq!(engine.proposals_len().unwrap(), 0);
    }

    #[test]
    fn oversized_description_is_invalid_input() {
        let config = GovernanceConfig {
            max_description_len: 8,
            ..GovernanceConfig::default()
        };
        let engine = GovernanceEngine::new(
            NullGovernanceStore::new(),
            Arc::new(NullClock::new(0)),
            config,
        )
        .unwrap();
        assert!(engine.submit_proposal("12345678", 0, 30).is_ok());
        let err = engine.submit_proposal("123456789", 0, 30).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidInput(_)));
    }

    #[test]
    fn overflowing_deadline_is_invalid_input() {
        let engine = engine();
        engine.clock().set(u64::MAX - 10);
        let err = engine.submit_proposal("late", 0, 11).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidInput(_)));
        assert_eq!(engine.proposals_len().unwrap(), 0);
    }

    #[test]
    fn pending_outcome_is_invalid_input() {
        let engine = engine();
        let id = engine.submit_proposal("p", 0, 30).unwrap();
        engine.clock().advance(30);
        let err = engine
            .execute_proposal(id, ProposalStatus::Pending)
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidInput(_)));
        assert!(engine.get_proposal(id).unwrap().is_pending());
    }

    #[test]
    fn execution_exactly_at_deadline_is_allowed() {
        let engine = engine();
        let id = engine.submit_proposal("p", 0, 30).unwrap();
        engine.clock().advance(29);
        assert!(matches!(
            engine.execute_proposal(id, ProposalStatus::Rejected),
            Err(GovernanceError::VotingStillOpen { .. })
        ));
        engine.clock().advance(1);
        assert_eq!(
            engine.execute_proposal(id, ProposalStatus::Rejected).unwrap(),
            ProposalStatus::Rejected
        );
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = GovernanceConfig {
            max_description_len: 0,
            ..GovernanceConfig::default()
        };
        let result = GovernanceEngine::new(
            NullGovernanceStore::new(),
            Arc::new(NullClock::new(0)),
            config,
        );
        assert!(matches!(result, Err(GovernanceError::Config(_))));
    }
}
