//! Composite index keys.
//!
//! Five logical tables share one ordered keyspace, separated by a leading
//! prefix byte. Composite keys encode their fields fixed-width, heights
//! big-endian, so lexicographic byte order equals the logical order each
//! index is scanned in.

use crate::proposal::ProposalStatus;
use tally_types::{BlockHeight, MasternodeId, ProposalId};

/// Table prefix bytes. Part of the persisted layout; never renumber.
pub const PROPOSALS: u8 = 0x2B;
pub const VOTES: u8 = 0x2D;
pub const BY_STATUS: u8 = 0x2E;
pub const BY_DUE_HEIGHT: u8 = 0x2F;
pub const CONFIG: u8 = 0x30;

/// Proposals table: prefix ++ proposal_id.
pub fn proposal_key(id: &ProposalId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 32);
    key.push(PROPOSALS);
    key.extend_from_slice(id.as_bytes());
    key
}

pub fn proposals_prefix() -> Vec<u8> {
    vec![PROPOSALS]
}

pub fn parse_proposal_key(key: &[u8]) -> Option<ProposalId> {
    let rest = key.strip_prefix(&[PROPOSALS])?;
    let bytes: [u8; 32] = rest.try_into().ok()?;
    Some(ProposalId::new(bytes))
}

/// Votes table: prefix ++ proposal_id ++ cycle ++ masternode_id.
pub fn vote_key(id: &ProposalId, cycle: u8, masternode: &MasternodeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 32 + 1 + 32);
    key.push(VOTES);
    key.extend_from_slice(id.as_bytes());
    key.push(cycle);
    key.extend_from_slice(masternode.as_bytes());
    key
}

pub fn votes_prefix() -> Vec<u8> {
    vec![VOTES]
}

/// All votes of one (proposal, cycle) pair, for tallying.
pub fn votes_cycle_prefix(id: &ProposalId, cycle: u8) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 32 + 1);
    key.push(VOTES);
    key.extend_from_slice(id.as_bytes());
    key.push(cycle);
    key
}

pub fn parse_vote_key(key: &[u8]) -> Option<(ProposalId, u8, MasternodeId)> {
    let rest = key.strip_prefix(&[VOTES])?;
    if rest.len() != 32 + 1 + 32 {
        return None;
    }
    let id: [u8; 32] = rest[..32].try_into().ok()?;
    let cycle = rest[32];
    let masternode: [u8; 32] = rest[33..].try_into().ok()?;
    Some((ProposalId::new(id), cycle, MasternodeId::new(masternode)))
}

/// ByStatus index: prefix ++ status_tag ++ proposal_id. Value is empty;
/// the entry points back into the Proposals table.
pub fn status_key(status: ProposalStatus, id: &ProposalId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 1 + 32);
    key.push(BY_STATUS);
    key.push(status.tag());
    key.extend_from_slice(id.as_bytes());
    key
}

pub fn status_prefix(status: ProposalStatus) -> Vec<u8> {
    vec![BY_STATUS, status.tag()]
}

pub fn parse_status_key(key: &[u8]) -> Option<(ProposalStatus, ProposalId)> {
    let rest = key.strip_prefix(&[BY_STATUS])?;
    if rest.len() != 1 + 32 {
        return None;
    }
    let status = ProposalStatus::from_tag(rest[0])?;
    let id: [u8; 32] = rest[1..].try_into().ok()?;
    Some((status, ProposalId::new(id)))
}

/// ByDueHeight index: prefix ++ height (big-endian) ++ proposal_id.
/// Big-endian heights make the byte order the numeric height order.
pub fn due_key(height: BlockHeight, id: &ProposalId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 4 + 32);
    key.push(BY_DUE_HEIGHT);
    key.extend_from_slice(&height.to_be_bytes());
    key.extend_from_slice(id.as_bytes());
    key
}

pub fn due_prefix(height: BlockHeight) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 4);
    key.push(BY_DUE_HEIGHT);
    key.extend_from_slice(&height.to_be_bytes());
    key
}

pub fn parse_due_key(key: &[u8]) -> Option<(BlockHeight, ProposalId)> {
    let rest = key.strip_prefix(&[BY_DUE_HEIGHT])?;
    if rest.len() != 4 + 32 {
        return None;
    }
    let height = u32::from_be_bytes(rest[..4].try_into().ok()?);
    let id: [u8; 32] = rest[4..].try_into().ok()?;
    Some((height, ProposalId::new(id)))
}

/// Config table holds a single entry: the voting period.
pub fn config_key() -> Vec<u8> {
    vec![CONFIG]
}
