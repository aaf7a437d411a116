//! Height-driven proposal lifecycle.
//!
//! Once per connected block the node calls [`end_of_cycle`] with the new
//! height. Proposals whose voting window closes at that height either
//! finalize to a terminal status or reopen for their next cycle. How a
//! tally is classified belongs to the consensus engine and is plugged in
//! through [`OutcomeRule`]; this module only drives the state machine.

use tally_store::OrderedKv;
use tally_types::{BlockHeight, ProposalId};

use crate::error::GovernanceError;
use crate::proposal::{ProposalRecord, ProposalStatus, VoteTally};
use crate::view::ProposalView;

/// Classification of one finished voting cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Approved,
    Rejected,
    Undecided,
}

/// The majority/quorum rule. Implemented by the consensus engine against
/// the active masternode set; implementations only classify tallies and
/// cannot override what happens when a proposal runs out of cycles.
pub trait OutcomeRule {
    fn classify(&self, record: &ProposalRecord, tally: &VoteTally) -> Outcome;
}

/// Plain yes-versus-no majority with no quorum: more yes than no approves,
/// more no than yes rejects, ties and empty tallies stay undecided. Used
/// by tests; real nodes plug in the engine's rule.
pub struct SimpleMajority;

impl OutcomeRule for SimpleMajority {
    fn classify(&self, _record: &ProposalRecord, tally: &VoteTally) -> Outcome {
        if tally.yes > tally.no {
            Outcome::Approved
        } else if tally.no > tally.yes {
            Outcome::Rejected
        } else {
            Outcome::Undecided
        }
    }
}

/// Transition applied to one due proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Reopened for the given cycle with a fresh voting window.
    Advanced(u8),
    Completed,
    Rejected,
}

/// Drive every proposal due at `height` through one lifecycle step and
/// return the transitions applied, in proposal-id order.
///
/// Undecided proposals advance while cycles remain; a proposal that
/// exhausts its cycles without a decision is rejected at `height`.
pub fn end_of_cycle<S, R>(
    view: &mut ProposalView<S>,
    height: BlockHeight,
    rule: &R,
) -> Result<Vec<(ProposalId, CycleOutcome)>, GovernanceError>
where
    S: OrderedKv,
    R: OutcomeRule,
{
    // Snapshot the due set first; transitions rewrite the index under scan.
    let mut due = Vec::new();
    view.for_each_due_proposal(height, |id, record| {
        due.push((*id, record.clone()));
        true
    })?;

    let mut transitions = Vec::with_capacity(due.len());
    for (id, record) in due {
        let tally = view.count_votes(&id, record.cycle)?;
        let outcome = match rule.classify(&record, &tally) {
            Outcome::Approved => {
                view.update_proposal_status(&id, height, ProposalStatus::Completed)?;
                CycleOutcome::Completed
            }
            Outcome::Rejected => {
                view.update_proposal_status(&id, height, ProposalStatus::Rejected)?;
                CycleOutcome::Rejected
            }
            Outcome::Undecided if record.cycle < record.requested_cycles => {
                let next = record.cycle + 1;
                view.update_proposal_cycle(&id, next)?;
                CycleOutcome::Advanced(next)
            }
            Outcome::Undecided => {
                tracing::warn!(
                    proposal = %id,
                    cycles = record.requested_cycles,
                    "cycles exhausted without a decision, rejecting"
                );
                view.update_proposal_status(&id, height, ProposalStatus::Rejected)?;
                CycleOutcome::Rejected
            }
        };
        tracing::info!(proposal = %id, height, outcome = ?outcome, "voting window closed");
        transitions.push((id, outcome));
    }
    Ok(transitions)
}
