//! On-chain governance for the Tally protocol.
//!
//! Masternodes vote on community-fund proposals, block-reward
//! reallocations, and votes of confidence. Each proposal runs through up to
//! [`MAX_CYCLES`](proposal::MAX_CYCLES) height-bounded voting cycles until
//! it completes or is rejected. The module is consensus-critical: every
//! node must derive identical proposal state from identical chain history,
//! so all state lives in five deterministic, byte-ordered tables and every
//! transition is driven by block height.

pub mod error;
pub mod keys;
pub mod lifecycle;
pub mod proposal;
pub mod view;

pub use error::GovernanceError;
pub use lifecycle::{end_of_cycle, CycleOutcome, Outcome, OutcomeRule, SimpleMajority};
pub use proposal::{
    CreateProposal, ProposalRecord, ProposalStatus, ProposalType, ProposalVote, VoteChoice,
    VoteKey, VoteTally, DEFAULT_VOTING_PERIOD, MAX_CYCLES, MAX_TITLE_LEN, VOC_CYCLES,
};
pub use view::ProposalView;
