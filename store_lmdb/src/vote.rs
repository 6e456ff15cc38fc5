//! LMDB implementation of VoteLedger.
//!
//! Key format: `proposal_id_be ++ blake2b_256(voter_bytes)`, a fixed 40 bytes
//! whatever the identity length, so it stays under LMDB's key size limit. The
//! full voter id lives in the value. Listing all votes on a proposal is a
//! prefix scan over the 8-byte id.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use heed::types::Bytes;
use heed::{Database, RoTxn};

use dao_store::{StoreError, VoteLedger};
use dao_types::{ProposalId, VoteRecord, VoterId};

use crate::governance::LmdbGovernanceStore;
use crate::LmdbError;

type Blake2b256 = Blake2b<U32>;

pub(crate) const VOTE_KEY_LEN: usize = 8 + 32;

/// Build composite key `proposal_id_be ++ blake2b_256(voter_bytes)`.
pub(crate) fn vote_key(proposal: ProposalId, voter: &VoterId) -> [u8; VOTE_KEY_LEN] {
    let mut hasher = Blake2b256::new();
    hasher.update(voter.as_bytes());
    let digest = hasher.finalize();

    let mut key = [0u8; VOTE_KEY_LEN];
    key[..8].copy_from_slice(&proposal.to_be_bytes());
    key[8..].copy_from_slice(&digest);
    key
}

pub(crate) fn vote_exists(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    key: &[u8],
) -> Result<bool, StoreError> {
    Ok(db.get(txn, key).map_err(LmdbError::from)?.is_some())
}

impl VoteLedger for LmdbGovernanceStore {
    fn has_voted(&self, voter: &VoterId, proposal: ProposalId) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        vote_exists(&self.votes_db, &rtxn, &vote_key(proposal, voter))
    }

    fn record_vote(&self, vote: &VoteRecord) -> Result<(), StoreError> {
        let key = vote_key(vote.proposal, &vote.voter);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if vote_exists(&self.votes_db, &wtxn, &key)? {
            return Err(StoreError::Duplicate(format!(
                "{} already voted on {}",
                vote.voter, vote.proposal
            )));
        }
        let bytes = bincode::serialize(vote).map_err(LmdbError::from)?;
        self.votes_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_vote(
        &self,
        voter: &VoterId,
        proposal: ProposalId,
    ) -> Result<Option<VoteRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .votes_db
            .get(&rtxn, &vote_key(proposal, voter))
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn votes_for(&self, proposal: ProposalId) -> Result<Vec<VoteRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = proposal.to_be_bytes();
        let iter = self
            .votes_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut votes = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            votes.push(bincode::deserialize(val).map_err(LmdbError::from)?);
        }
        Ok(votes)
    }
}
