//! The proposal store view.
//!
//! [`ProposalView`] owns the five governance tables on top of any
//! [`OrderedKv`] backend. All mutations validate before touching the store,
//! so a failed call leaves every table byte-identical. Multi-key updates
//! are made consistent by the caller running the view over an
//! [`Overlay`](tally_store::Overlay) that is committed or discarded as a
//! whole.

use tally_store::kv::prefix_upper_bound;
use tally_store::{OrderedKv, StoreError};
use tally_types::{BlockHeight, MasternodeId, ProposalId};

use crate::error::GovernanceError;
use crate::keys;
use crate::proposal::{
    CreateProposal, ProposalRecord, ProposalStatus, ProposalType, ProposalVote, VoteChoice,
    VoteKey, VoteTally, DEFAULT_VOTING_PERIOD, MAX_CYCLES, MAX_TITLE_LEN, VOC_CYCLES,
};

pub struct ProposalView<S> {
    kv: S,
}

impl<S: OrderedKv> ProposalView<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Hand the underlying store back, e.g. to commit or discard an overlay.
    pub fn into_inner(self) -> S {
        self.kv
    }

    // ── Proposals ───────────────────────────────────────────────────────

    /// Record a new proposal at `height` and open its first voting window.
    pub fn create_proposal(
        &mut self,
        id: &ProposalId,
        height: BlockHeight,
        msg: &CreateProposal,
    ) -> Result<(), GovernanceError> {
        let valid_cycles = match msg.proposal_type {
            ProposalType::VoteOfConfidence => msg.cycles == VOC_CYCLES,
            _ => msg.cycles >= 1 && msg.cycles <= MAX_CYCLES,
        };
        if !valid_cycles {
            return Err(GovernanceError::InvalidCycles {
                proposal_type: msg.proposal_type.as_str(),
                requested: msg.cycles,
            });
        }
        if msg.title.len() > MAX_TITLE_LEN {
            return Err(GovernanceError::InvalidArgument("proposal title too long"));
        }
        if self.kv.get(&keys::proposal_key(id))?.is_some() {
            return Err(GovernanceError::DuplicateProposal(*id));
        }

        let final_height = height.saturating_add(self.voting_period()?);
        let record = ProposalRecord {
            proposal_type: msg.proposal_type,
            payout: msg.payout.clone(),
            amount: msg.amount,
            requested_cycles: msg.cycles,
            title: msg.title.clone(),
            cycle: 1,
            creation_height: height,
            final_height,
            status: ProposalStatus::Voting,
        };
        self.put_record(id, &record)?;
        self.kv.put(&keys::status_key(ProposalStatus::Voting, id), &[])?;
        self.kv.put(&keys::due_key(final_height, id), &[])?;
        tracing::debug!(proposal = %id, height, final_height, "proposal created");
        Ok(())
    }

    pub fn get_proposal(&self, id: &ProposalId) -> Result<Option<ProposalRecord>, GovernanceError> {
        match self.kv.get(&keys::proposal_key(id))? {
            Some(bytes) => Ok(Some(decode_record(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Advance a voting proposal to `new_cycle`, opening the next window
    /// directly after the current one.
    pub fn update_proposal_cycle(
        &mut self,
        id: &ProposalId,
        new_cycle: u8,
    ) -> Result<(), GovernanceError> {
        let mut record = self
            .get_proposal(id)?
            .ok_or(GovernanceError::ProposalNotFound(*id))?;
        if record.status != ProposalStatus::Voting {
            return Err(GovernanceError::InvalidTransition(
                "cannot advance the cycle of a finalized proposal",
            ));
        }
        if new_cycle <= record.cycle {
            return Err(GovernanceError::InvalidTransition(
                "cycle may only move forward",
            ));
        }
        if new_cycle > record.requested_cycles {
            return Err(GovernanceError::InvalidTransition(
                "cycle exceeds the requested cycle count",
            ));
        }

        let old_due = keys::due_key(record.final_height, id);
        record.cycle = new_cycle;
        record.final_height = record.final_height.saturating_add(self.voting_period()?);
        self.put_record(id, &record)?;
        self.kv.delete(&old_due)?;
        self.kv.put(&keys::due_key(record.final_height, id), &[])?;
        tracing::debug!(
            proposal = %id,
            cycle = new_cycle,
            final_height = record.final_height,
            "voting window reopened"
        );
        Ok(())
    }

    /// Finalize a voting proposal to a terminal status at `height`.
    pub fn update_proposal_status(
        &mut self,
        id: &ProposalId,
        height: BlockHeight,
        status: ProposalStatus,
    ) -> Result<(), GovernanceError> {
        if !status.is_terminal() {
            return Err(GovernanceError::InvalidTransition(
                "target status must be terminal",
            ));
        }
        let mut record = self
            .get_proposal(id)?
            .ok_or(GovernanceError::ProposalNotFound(*id))?;
        if record.status != ProposalStatus::Voting {
            return Err(GovernanceError::InvalidTransition(
                "proposal is already finalized",
            ));
        }

        self.kv.delete(&keys::due_key(record.final_height, id))?;
        self.kv.delete(&keys::status_key(ProposalStatus::Voting, id))?;
        self.kv.put(&keys::status_key(status, id), &[])?;
        record.status = status;
        record.final_height = height;
        self.put_record(id, &record)?;
        tracing::debug!(proposal = %id, status = %status, height, "proposal finalized");
        Ok(())
    }

    // ── Votes ───────────────────────────────────────────────────────────

    /// Record a masternode's vote for the proposal's current cycle. A later
    /// vote for the same (proposal, cycle, masternode) overwrites.
    pub fn add_vote(
        &mut self,
        id: &ProposalId,
        masternode: &MasternodeId,
        vote: VoteChoice,
    ) -> Result<(), GovernanceError> {
        let record = self
            .get_proposal(id)?
            .filter(|r| r.status == ProposalStatus::Voting)
            .ok_or(GovernanceError::ProposalNotFound(*id))?;
        self.kv
            .put(&keys::vote_key(id, record.cycle, masternode), &[vote.tag()])?;
        Ok(())
    }

    /// Apply a cast-vote message from the transaction layer.
    pub fn apply_vote(&mut self, msg: &ProposalVote) -> Result<(), GovernanceError> {
        self.add_vote(&msg.proposal_id, &msg.masternode_id, msg.vote)
    }

    pub fn get_vote(
        &self,
        id: &ProposalId,
        cycle: u8,
        masternode: &MasternodeId,
    ) -> Result<Option<VoteChoice>, GovernanceError> {
        match self.kv.get(&keys::vote_key(id, cycle, masternode))? {
            Some(bytes) => Ok(Some(decode_vote(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Tally all votes of one (proposal, cycle) pair. Bounded scan of the
    /// cycle's slice of the Votes table.
    pub fn count_votes(
        &self,
        id: &ProposalId,
        cycle: u8,
    ) -> Result<VoteTally, GovernanceError> {
        let prefix = keys::votes_cycle_prefix(id, cycle);
        let upper = prefix_upper_bound(&prefix);
        let mut tally = VoteTally::default();
        for item in self.kv.range(&prefix, upper.as_deref()) {
            let (_key, value) = item?;
            tally.record(decode_vote(&value)?);
        }
        Ok(tally)
    }

    // ── Enumeration ─────────────────────────────────────────────────────

    /// Visit proposals until the callback returns false. With a status
    /// filter, visits exactly that status group in proposal-id order via
    /// the ByStatus index; without one, visits every proposal in id order.
    pub fn for_each_proposal<F>(
        &self,
        status: Option<ProposalStatus>,
        mut f: F,
    ) -> Result<(), GovernanceError>
    where
        F: FnMut(&ProposalId, &ProposalRecord) -> bool,
    {
        match status {
            Some(status) => {
                let prefix = keys::status_prefix(status);
                let upper = prefix_upper_bound(&prefix);
                for item in self.kv.range(&prefix, upper.as_deref()) {
                    let (key, _) = item?;
                    let (_, id) = keys::parse_status_key(&key)
                        .ok_or_else(|| corrupt_key("ByStatus", &key))?;
                    let record = self.require_record(&id)?;
                    if !f(&id, &record) {
                        break;
                    }
                }
            }
            None => {
                let prefix = keys::proposals_prefix();
                let upper = prefix_upper_bound(&prefix);
                for item in self.kv.range(&prefix, upper.as_deref()) {
                    let (key, value) = item?;
                    let id = keys::parse_proposal_key(&key)
                        .ok_or_else(|| corrupt_key("Proposals", &key))?;
                    let record = decode_record(&value)?;
                    if !f(&id, &record) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Visit votes in (proposal, cycle, masternode) order, starting at or
    /// after `start`. Pass the last key seen to resume a previous scan.
    pub fn for_each_vote<F>(&self, start: Option<&VoteKey>, mut f: F) -> Result<(), GovernanceError>
    where
        F: FnMut(&VoteKey, VoteChoice) -> bool,
    {
        let lower = match start {
            Some(s) => keys::vote_key(&s.proposal_id, s.cycle, &s.masternode_id),
            None => keys::votes_prefix(),
        };
        let upper = prefix_upper_bound(&keys::votes_prefix());
        for item in self.kv.range(&lower, upper.as_deref()) {
            let (key, value) = item?;
            let (proposal_id, cycle, masternode_id) =
                keys::parse_vote_key(&key).ok_or_else(|| corrupt_key("Votes", &key))?;
            let vote_key = VoteKey {
                proposal_id,
                cycle,
                masternode_id,
            };
            if !f(&vote_key, decode_vote(&value)?) {
                break;
            }
        }
        Ok(())
    }

    /// Visit exactly the proposals whose current window closes at `height`.
    /// Cost is proportional to the number due, not the total proposal count.
    pub fn for_each_due_proposal<F>(
        &self,
        height: BlockHeight,
        mut f: F,
    ) -> Result<(), GovernanceError>
    where
        F: FnMut(&ProposalId, &ProposalRecord) -> bool,
    {
        let prefix = keys::due_prefix(height);
        let upper = prefix_upper_bound(&prefix);
        for item in self.kv.range(&prefix, upper.as_deref()) {
            let (key, _) = item?;
            let (_, id) =
                keys::parse_due_key(&key).ok_or_else(|| corrupt_key("ByDueHeight", &key))?;
            let record = self.require_record(&id)?;
            if !f(&id, &record) {
                break;
            }
        }
        Ok(())
    }

    // ── Config ──────────────────────────────────────────────────────────

    /// Set the governance voting period (blocks per voting window).
    pub fn set_voting_period(&mut self, period: u32) -> Result<(), GovernanceError> {
        if period == 0 {
            return Err(GovernanceError::InvalidArgument(
                "voting period must be non-zero",
            ));
        }
        self.kv.put(&keys::config_key(), &period.to_be_bytes())?;
        Ok(())
    }

    /// The stored voting period, or the protocol default if never set.
    pub fn voting_period(&self) -> Result<u32, GovernanceError> {
        match self.kv.get(&keys::config_key())? {
            None => Ok(DEFAULT_VOTING_PERIOD),
            Some(bytes) => {
                let arr: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Corruption("voting period has unexpected byte length".to_string())
                })?;
                Ok(u32::from_be_bytes(arr))
            }
        }
    }

    // ── Internal ────────────────────────────────────────────────────────

    fn put_record(&mut self, id: &ProposalId, record: &ProposalRecord) -> Result<(), GovernanceError> {
        let bytes = bincode::serialize(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.put(&keys::proposal_key(id), &bytes)?;
        Ok(())
    }

    /// Fetch a record an index entry points at; a dangling entry means the
    /// tables have diverged.
    fn require_record(&self, id: &ProposalId) -> Result<ProposalRecord, GovernanceError> {
        self.get_proposal(id)?.ok_or_else(|| {
            GovernanceError::Store(StoreError::Corruption(format!(
                "index entry for unknown proposal {id}"
            )))
        })
    }
}

fn decode_record(bytes: &[u8]) -> Result<ProposalRecord, GovernanceError> {
    bincode::deserialize(bytes)
        .map_err(|e| GovernanceError::Store(StoreError::Corruption(e.to_string())))
}

fn decode_vote(bytes: &[u8]) -> Result<VoteChoice, GovernanceError> {
    match bytes {
        [tag] => VoteChoice::from_tag(*tag).ok_or_else(|| {
            GovernanceError::Store(StoreError::Corruption(format!(
                "unknown vote tag {tag:#04x}"
            )))
        }),
        _ => Err(GovernanceError::Store(StoreError::Corruption(
            "vote value has unexpected byte length".to_string(),
        ))),
    }
}

fn corrupt_key(table: &str, key: &[u8]) -> GovernanceError {
    GovernanceError::Store(StoreError::Corruption(format!(
        "malformed {table} key of length {}",
        key.len()
    )))
}
