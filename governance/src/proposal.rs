//! Proposal and vote model.
//!
//! All persisted enums carry an explicit u8 wire tag; unknown tags are
//! rejected at decode time. The tag mapping is consensus-fixed and must
//! never be renumbered.

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_types::{Amount, BlockHeight, MasternodeId, PayoutScript, ProposalId};

/// Upper bound on the cycle count a proposal may request.
pub const MAX_CYCLES: u8 = 3;

/// Mandatory cycle count for votes of confidence.
pub const VOC_CYCLES: u8 = 2;

/// Blocks per voting window when the governance parameter was never set.
pub const DEFAULT_VOTING_PERIOD: u32 = 70_000;

/// Maximum byte length of a proposal title.
pub const MAX_TITLE_LEN: usize = 128;

/// What kind of governance item a proposal is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalType {
    /// Request a payout from the community fund.
    CommunityFund,
    /// Reallocate part of the block reward.
    BlockRewardReallocation,
    /// Non-monetary vote of confidence.
    VoteOfConfidence,
}

impl ProposalType {
    pub fn tag(&self) -> u8 {
        match self {
            Self::CommunityFund => 0x01,
            Self::BlockRewardReallocation => 0x02,
            Self::VoteOfConfidence => 0x03,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::CommunityFund),
            0x02 => Some(Self::BlockRewardReallocation),
            0x03 => Some(Self::VoteOfConfidence),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommunityFund => "CommunityFundProposal",
            Self::BlockRewardReallocation => "BlockRewardReallocation",
            Self::VoteOfConfidence => "VoteOfConfidence",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a proposal. `Voting` is the only non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    Voting,
    Rejected,
    Completed,
}

impl ProposalStatus {
    pub fn tag(&self) -> u8 {
        match self {
            Self::Voting => 0x01,
            Self::Rejected => 0x02,
            Self::Completed => 0x03,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::Voting),
            0x02 => Some(Self::Rejected),
            0x03 => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voting => "Voting",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Voting)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A masternode's vote on one proposal cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
    Neutral,
}

impl VoteChoice {
    pub fn tag(&self) -> u8 {
        match self {
            Self::Yes => 0x01,
            Self::No => 0x02,
            Self::Neutral => 0x03,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::Yes),
            0x02 => Some(Self::No),
            0x03 => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
            Self::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create-proposal message, consumed from the transaction layer after
/// upstream authorization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProposal {
    pub proposal_type: ProposalType,
    /// Payout destination; meaningful for fund and reallocation proposals.
    pub payout: PayoutScript,
    /// Requested payout; meaningful for community-fund proposals.
    pub amount: Amount,
    /// Voting cycles requested, 1..=MAX_CYCLES (exactly VOC_CYCLES for
    /// votes of confidence).
    pub cycles: u8,
    pub title: String,
}

/// Cast-vote message, consumed from the transaction layer. Masternode
/// eligibility is validated upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalVote {
    pub proposal_id: ProposalId,
    pub masternode_id: MasternodeId,
    pub vote: VoteChoice,
}

/// The stored proposal record: the create fields plus lifecycle state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub proposal_type: ProposalType,
    pub payout: PayoutScript,
    pub amount: Amount,
    pub requested_cycles: u8,
    pub title: String,
    /// Current cycle, starting at 1, never exceeding `requested_cycles`.
    pub cycle: u8,
    pub creation_height: BlockHeight,
    /// Height at which the current voting window closes; once the status
    /// turns terminal this becomes the finalization height.
    pub final_height: BlockHeight,
    pub status: ProposalStatus,
}

/// Identifies one vote: the (proposal, cycle, masternode) triple.
/// Also serves as the resume cursor for vote scans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteKey {
    pub proposal_id: ProposalId,
    pub cycle: u8,
    pub masternode_id: MasternodeId,
}

/// Vote counts for one (proposal, cycle) pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub yes: u32,
    pub no: u32,
    pub neutral: u32,
}

impl VoteTally {
    pub fn record(&mut self, choice: VoteChoice) {
        match choice {
            VoteChoice::Yes => self.yes += 1,
            VoteChoice::No => self.no += 1,
            VoteChoice::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.yes + self.no + self.neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_are_stable() {
        assert_eq!(ProposalType::CommunityFund.tag(), 0x01);
        assert_eq!(ProposalType::BlockRewardReallocation.tag(), 0x02);
        assert_eq!(ProposalType::VoteOfConfidence.tag(), 0x03);
        assert_eq!(ProposalStatus::Voting.tag(), 0x01);
        assert_eq!(ProposalStatus::Rejected.tag(), 0x02);
        assert_eq!(ProposalStatus::Completed.tag(), 0x03);
        assert_eq!(VoteChoice::Yes.tag(), 0x01);
        assert_eq!(VoteChoice::No.tag(), 0x02);
        assert_eq!(VoteChoice::Neutral.tag(), 0x03);
    }

    #[test]
    fn test_tag_roundtrip() {
        for tag in 0x01..=0x03u8 {
            assert_eq!(ProposalType::from_tag(tag).map(|t| t.tag()), Some(tag));
            assert_eq!(ProposalStatus::from_tag(tag).map(|s| s.tag()), Some(tag));
            assert_eq!(VoteChoice::from_tag(tag).map(|v| v.tag()), Some(tag));
        }
    }

    #[test]
    fn test_unknown_tags_rejected() {
        for tag in [0x00u8, 0x04, 0x7F, 0xFF] {
            assert_eq!(ProposalType::from_tag(tag), None);
            assert_eq!(ProposalStatus::from_tag(tag), None);
            assert_eq!(VoteChoice::from_tag(tag), None);
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ProposalStatus::Voting.is_terminal());
        assert!(ProposalStatus::Rejected.is_terminal());
        assert!(ProposalStatus::Completed.is_terminal());
    }

    #[test]
    fn test_tally_record_and_total() {
        let mut tally = VoteTally::default();
        tally.record(VoteChoice::Yes);
        tally.record(VoteChoice::Yes);
        tally.record(VoteChoice::No);
        tally.record(VoteChoice::Neutral);
        assert_eq!(tally.yes, 2);
        assert_eq!(tally.no, 1);
        assert_eq!(tally.neutral, 1);
        assert_eq!(tally.total(), 4);
    }
}
