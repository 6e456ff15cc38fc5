//! Proposal records, their lifecycle status, and vote records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Timestamp, TypesError, VoterId};

/// Position of a proposal in the append-only proposal log.
///
/// Ids are zero-based and assigned in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(u64);

impl ProposalId {
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Big-endian bytes, so storage keys sort in id order.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ProposalId {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

/// Lifecycle status of a proposal.
///
/// `Pending` transitions exactly once, to `Approved` or `Rejected`. The numeric
/// codes are part of the storage format and serialize as a bare `u8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ProposalStatus {
    Pending = 0,
    Approved = 1,
    Rejected = 2,
}

impl ProposalStatus {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether this status is final.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ProposalStatus> for u8 {
    fn from(status: ProposalStatus) -> Self {
        status.as_u8()
    }
}

impl TryFrom<u8> for ProposalStatus {
    type Error = TypesError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Approved),
            2 => Ok(Self::Rejected),
            other => Err(TypesError::InvalidStatus(other)),
        }
    }
}

/// Input for appending a proposal to the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProposal {
    pub description: String,
    pub requested_amount: u128,
    pub voting_duration_secs: u64,
    pub created_at: Timestamp,
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Position in the proposal log.
    pub id: ProposalId,
    /// Free-form text describing what is proposed.
    pub description: String,
    /// Resource amount the proposal asks for (e.g. funding).
    pub requested_amount: u128,
    pub voting_duration_secs: u64,
    pub created_at: Timestamp,
    /// `created_at + voting_duration_secs`, fixed at creation.
    pub deadline: Timestamp,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub status: ProposalStatus,
    /// When the proposal was finalized. `None` while pending.
    pub executed_at: Option<Timestamp>,
    /// Outcome the executing caller asserted, kept for audit.
    pub asserted_outcome: Option<ProposalStatus>,
}

impl Proposal {
    /// Build a fresh pending proposal at position `id`.
    ///
    /// Returns `None` if the duration is zero or the deadline overflows.
    pub fn open(id: ProposalId, new: NewProposal) -> Option<Self> {
        if new.voting_duration_secs == 0 {
            return None;
        }
        let deadline = new.created_at.checked_add_secs(new.voting_duration_secs)?;
        Some(Self {
            id,
            description: new.description,
            requested_amount: new.requested_amount,
            voting_duration_secs: new.voting_duration_secs,
            created_at: new.created_at,
            deadline,
            yes_votes: 0,
            no_votes: 0,
            status: ProposalStatus::Pending,
            executed_at: None,
            asserted_outcome: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    /// Whether the voting window has ended at `now`.
    pub fn voting_ended(&self, now: Timestamp) -> bool {
        self.deadline.is_reached(now)
    }

    /// Outcome implied by the tallies: strictly more yes than no votes.
    pub fn tally_outcome(&self) -> ProposalStatus {
        if self.yes_votes > self.no_votes {
            ProposalStatus::Approved
        } else {
            ProposalStatus::Rejected
        }
    }

    /// Add one vote to the matching tally, failing instead of wrapping.
    pub fn with_vote(&self, support: bool) -> Option<Self> {
        let mut next = self.clone();
        if support {
            next.yes_votes = next.yes_votes.checked_add(1)?;
        } else {
            next.no_votes = next.no_votes.checked_add(1)?;
        }
        Some(next)
    }
}

/// One voter's vote on one proposal. At most one exists per pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: VoterId,
    pub proposal: ProposalId,
    pub support: bool,
    pub cast_at: Timestamp,
}
