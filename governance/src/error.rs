use tally_store::StoreError;
use tally_types::ProposalId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} already exists")]
    DuplicateProposal(ProposalId),

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("invalid cycle count {requested} for {proposal_type}")]
    InvalidCycles {
        proposal_type: &'static str,
        requested: u8,
    },

    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
