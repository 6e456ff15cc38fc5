use dao_store::StoreError;
use dao_types::{ProposalId, Timestamp, VoterId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("proposal {0} not found")]
    NotFound(ProposalId),

    #[error("voter {voter} has already voted on proposal {proposal}")]
    DuplicateVote { voter: VoterId, proposal: ProposalId },

    #[error("voting on proposal {0} is closed")]
    VotingClosed(ProposalId),

    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(ProposalId),

    #[error("voting on proposal {proposal} is still open until {deadline} (now {now})")]
    VotingStillOpen {
        proposal: ProposalId,
        deadline: Timestamp,
        now: Timestamp,
    },

    #[error("vote tally of proposal {0} would overflow")]
    TallyOverflow(ProposalId),

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
