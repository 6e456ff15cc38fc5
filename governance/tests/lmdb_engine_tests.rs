//! The engine over the durable LMDB backend.

use std::sync::Arc;

use dao_governance::{GovernanceEngine, GovernanceError};
use dao_nullables::NullClock;
use dao_store_lmdb::LmdbEnvironment;
use dao_types::{ProposalId, ProposalStatus, VoterId};

#[test]
fn full_lifecycle_persists_across_reopen() {
    dao_utils::init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(NullClock::new(1_000));
    let alice = VoterId::new("alice").unwrap();

    {
        let env = LmdbEnvironment::open_default(dir.path()).unwrap();
        let engine =
            GovernanceEngine::with_default_config(env.governance_store(), Arc::clone(&clock));
        let id = engine.submit_proposal("Sample Proposal", 100, 30).unwrap();
        assert_eq!(id, ProposalId::new(0));
        engine.vote(&alice, id, true).unwrap();
        assert!(matches!(
            engine.vote(&alice, id, true),
            Err(GovernanceError::DuplicateVote { .. })
        ));
    }

    clock.advance(300);
    let env = LmdbEnvironment::open_default(dir.path()).unwrap();
    let engine = GovernanceEngine::with_default_config(env.governance_store(), Arc::clone(&clock));
    let id = ProposalId::new(0);

    assert_eq!(engine.proposals_len().unwrap(), 1);
    assert!(engine.has_voted(&alice, id).unwrap());
    assert!(matches!(
        engine.vote(&alice, id, false),
        Err(GovernanceError::DuplicateVote { .. })
    ));

    engine.execute_proposal(id, ProposalStatus::Approved).unwrap();
    let p = engine.get_proposal(id).unwrap();
    assert_eq!(p.status, ProposalStatus::Approved);
    assert_eq!((p.yes_votes, p.no_votes), (1, 0));
    assert!(matches!(
        engine.execute_proposal(id, ProposalStatus::Rejected),
        Err(GovernanceError::AlreadyExecuted(_))
    ));
}

#[test]
fn early_execution_is_rejected_on_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open_default(dir.path()).unwrap();
    let engine =
        GovernanceEngine::with_default_config(env.governance_store(), NullClock::new(50));
    let id = engine.submit_proposal("Sample Proposal", 100, 30).unwrap();

    assert!(matches!(
        engine.execute_proposal(id, ProposalStatus::Approved),
        Err(GovernanceError::VotingStillOpen { .. })
    ));
    assert_eq!(engine.get_proposal(id).unwrap().status, ProposalStatus::Pending);
}

#[test]
fn long_voter_ids_vote_like_on_the_in_memory_store() {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open_default(dir.path()).unwrap();
    let lmdb = GovernanceEngine::with_default_config(env.governance_store(), NullClock::new(0));
    let memory = GovernanceEngine::with_default_config(
        dao_nullables::NullGovernanceStore::new(),
        NullClock::new(0),
    );
    let long = VoterId::new("k".repeat(600)).unwrap();
    let longer = VoterId::new("k".repeat(601)).unwrap();

    for_both(&lmdb, &memory, |id, vote| {
        vote(&long, id, true).unwrap();
        vote(&longer, id, false).unwrap();
        assert!(matches!(
            vote(&long, id, false),
            Err(GovernanceError::DuplicateVote { .. })
        ));
    });

    let p = lmdb.get_proposal(ProposalId::new(0)).unwrap();
    assert_eq!((p.yes_votes, p.no_votes), (1, 1));
    assert!(lmdb.has_voted(&long, p.id).unwrap());
    let kept = lmdb.vote_of(&long, p.id).unwrap().unwrap();
    assert_eq!(kept.voter, long);
    assert_eq!(lmdb.votes(p.id).unwrap().len(), 2);
}

/// Submit one proposal to each engine and run the same voting steps on both.
fn for_both<A, B>(
    a: &GovernanceEngine<A, NullClock>,
    b: &GovernanceEngine<B, NullClock>,
    steps: impl Fn(ProposalId, &dyn Fn(&VoterId, ProposalId, bool) -> Result<(), GovernanceError>),
) where
    A: dao_store::GovernanceStore,
    B: dao_store::GovernanceStore,
{
    let id = a.submit_proposal("Sample Proposal", 100, 30).unwrap();
    steps(id, &|v, p, s| a.vote(v, p, s));
    let id = b.submit_proposal("Sample Proposal", 100, 30).unwrap();
    steps(id, &|v, p, s| b.vote(v, p, s));
}
