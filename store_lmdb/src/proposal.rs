//! LMDB implementation of ProposalStore.
//!
//! Key format: proposal id as big-endian `u64`, so the database iterates in
//! id order and the entry count equals the next id.

use heed::types::Bytes;
use heed::{Database, RoTxn};

use dao_store::{ProposalStore, StoreError};
use dao_types::{NewProposal, Proposal, ProposalId, ProposalStatus, Timestamp};

use crate::governance::LmdbGovernanceStore;
use crate::LmdbError;

/// Read and decode one proposal inside an open transaction.
pub(crate) fn read_proposal(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    id: ProposalId,
) -> Result<Proposal, StoreError> {
    let bytes = db
        .get(txn, &id.to_be_bytes())
        .map_err(LmdbError::from)?
        .ok_or_else(|| StoreError::NotFound(format!("proposal {}", id)))?;
    let proposal: Proposal = bincode::deserialize(bytes).map_err(LmdbError::from)?;
    if proposal.id != id {
        return Err(StoreError::Corruption(format!(
            "proposal stored under {} claims id {}",
            id, proposal.id
        )));
    }
    Ok(proposal)
}

pub(crate) fn encode_proposal(proposal: &Proposal) -> Result<Vec<u8>, StoreError> {
    Ok(bincode::serialize(proposal).map_err(LmdbError::from)?)
}

impl ProposalStore for LmdbGovernanceStore {
    fn append(&self, new: NewProposal) -> Result<ProposalId, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = ProposalId::new(self.proposals_db.len(&wtxn).map_err(LmdbError::from)?);
        let proposal = Proposal::open(id, new).ok_or_else(|| {
            StoreError::InvalidInput(
                "voting duration must be positive and the deadline must fit".to_string(),
            )
        })?;
        let bytes = encode_proposal(&proposal)?;
        self.proposals_db
            .put(&mut wtxn, &id.to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(id)
    }

    fn get(&self, id: ProposalId) -> Result<Proposal, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        read_proposal(&self.proposals_db, &rtxn, id)
    }

    fn len(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.proposals_db.len(&rtxn).map_err(LmdbError::from)?)
    }

    fn range(&self, from: u64, count: u64) -> Result<Vec<Proposal>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let len = self.proposals_db.len(&rtxn).map_err(LmdbError::from)?;
        let end = from.saturating_add(count).min(len);
        (from..end)
            .map(|i| read_proposal(&self.proposals_db, &rtxn, ProposalId::new(i)))
            .collect()
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
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut proposal = read_proposal(&self.proposals_db, &wtxn, id)?;
        if !proposal.is_pending() {
            return Err(StoreError::InvalidTransition(format!(
                "proposal {} is already {}",
                id, proposal.status
            )));
        }
        proposal.status = status;
        proposal.executed_at = Some(executed_at);
        proposal.asserted_outcome = asserted_outcome;
        let bytes = encode_proposal(&proposal)?;
        self.proposals_db
            .put(&mut wtxn, &id.to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(proposal)
    }
}
