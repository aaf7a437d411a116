//! End-to-end proposal lifecycle against both storage backends, including
//! overlay rollback as used by block disconnect.

use tally_governance::{
    end_of_cycle, CreateProposal, CycleOutcome, ProposalStatus, ProposalType, ProposalView,
    SimpleMajority, VoteChoice,
};
use tally_store::{MemoryKv, Overlay};
use tally_store_lmdb::LmdbKv;
use tally_types::{Amount, MasternodeId, PayoutScript, ProposalId};

fn pid(seed: u8) -> ProposalId {
    ProposalId::new([seed; 32])
}

fn mn(seed: u8) -> MasternodeId {
    MasternodeId::new([seed; 32])
}

fn fund_proposal(cycles: u8) -> CreateProposal {
    CreateProposal {
        proposal_type: ProposalType::CommunityFund,
        payout: PayoutScript::new(vec![0x76, 0xA9, 0x14]),
        amount: Amount::from_coins(1_000).unwrap(),
        cycles,
        title: "build the bridge".to_string(),
    }
}

/// Create at height 100 with two cycles and a 50-block window, advance at
/// 150, complete at 200.
#[test]
fn community_fund_two_cycle_flow() {
    let mut view = ProposalView::new(MemoryKv::new());
    view.set_voting_period(50).unwrap();

    view.create_proposal(&pid(1), 100, &fund_proposal(2)).unwrap();
    let record = view.get_proposal(&pid(1)).unwrap().unwrap();
    assert_eq!((record.cycle, record.final_height), (1, 150));
    assert_eq!(record.status, ProposalStatus::Voting);

    view.add_vote(&pid(1), &mn(1), VoteChoice::Yes).unwrap();
    view.add_vote(&pid(1), &mn(2), VoteChoice::Yes).unwrap();
    view.update_proposal_cycle(&pid(1), 2).unwrap();
    let record = view.get_proposal(&pid(1)).unwrap().unwrap();
    assert_eq!((record.cycle, record.final_height), (2, 200));
    assert_eq!(record.status, ProposalStatus::Voting);

    view.update_proposal_status(&pid(1), 200, ProposalStatus::Completed)
        .unwrap();
    let record = view.get_proposal(&pid(1)).unwrap().unwrap();
    assert_eq!(record.status, ProposalStatus::Completed);
    assert_eq!(record.final_height, 200);
    assert_eq!(record.cycle, 2);
}

/// Discarding the overlay a transition ran in must restore every table:
/// record, votes, ByStatus, and ByDueHeight.
#[test]
fn overlay_discard_restores_all_tables() {
    let mut base = MemoryKv::new();
    let mut view = ProposalView::new(&mut base);
    view.set_voting_period(50).unwrap();
    view.create_proposal(&pid(1), 100, &fund_proposal(1)).unwrap();

    // Speculative block at height 150: a vote plus the cycle-end transition.
    let mut spec = ProposalView::new(Overlay::new(&mut base));
    spec.add_vote(&pid(1), &mn(1), VoteChoice::Yes).unwrap();
    let transitions = end_of_cycle(&mut spec, 150, &SimpleMajority).unwrap();
    assert_eq!(transitions, vec![(pid(1), CycleOutcome::Completed)]);
    spec.into_inner().discard();

    // The base still shows the pre-block state.
    let view = ProposalView::new(&mut base);
    let record = view.get_proposal(&pid(1)).unwrap().unwrap();
    assert_eq!(record.status, ProposalStatus::Voting);
    assert_eq!(record.final_height, 150);
    assert_eq!(view.get_vote(&pid(1), 1, &mn(1)).unwrap(), None);

    let mut due = Vec::new();
    view.for_each_due_proposal(150, |id, _| {
        due.push(*id);
        true
    })
    .unwrap();
    assert_eq!(due, vec![pid(1)]);

    let mut voting = Vec::new();
    view.for_each_proposal(Some(ProposalStatus::Voting), |id, _| {
        voting.push(*id);
        true
    })
    .unwrap();
    assert_eq!(voting, vec![pid(1)]);
}

/// Committing the overlay applies the transition to the base for good.
#[test]
fn overlay_commit_applies_transition() {
    let mut base = MemoryKv::new();
    let mut view = ProposalView::new(&mut base);
    view.set_voting_period(50).unwrap();
    view.create_proposal(&pid(1), 100, &fund_proposal(1)).unwrap();

    let mut spec = ProposalView::new(Overlay::new(&mut base));
    spec.add_vote(&pid(1), &mn(1), VoteChoice::Yes).unwrap();
    end_of_cycle(&mut spec, 150, &SimpleMajority).unwrap();
    spec.into_inner().commit().unwrap();

    let view = ProposalView::new(&mut base);
    let record = view.get_proposal(&pid(1)).unwrap().unwrap();
    assert_eq!(record.status, ProposalStatus::Completed);

    // The due index entry is gone and the status index moved.
    let mut due = Vec::new();
    view.for_each_due_proposal(150, |id, _| {
        due.push(*id);
        true
    })
    .unwrap();
    assert!(due.is_empty());

    let mut completed = Vec::new();
    view.for_each_proposal(Some(ProposalStatus::Completed), |id, _| {
        completed.push(*id);
        true
    })
    .unwrap();
    assert_eq!(completed, vec![pid(1)]);
}

/// The same lifecycle runs unchanged on the LMDB backend and survives a
/// reopen of the environment.
#[test]
fn lmdb_backed_lifecycle_persists() {
    let dir = tempfile::tempdir().unwrap();
    let map_size = 16 * 1024 * 1024;

    {
        let kv = LmdbKv::open(dir.path(), map_size).unwrap();
        let mut view = ProposalView::new(kv);
        view.set_voting_period(50).unwrap();
        view.create_proposal(&pid(1), 100, &fund_proposal(2)).unwrap();

        // Cycle 1 undecided, cycle 2 approved.
        let transitions = end_of_cycle(&mut view, 150, &SimpleMajority).unwrap();
        assert_eq!(transitions, vec![(pid(1), CycleOutcome::Advanced(2))]);
        view.add_vote(&pid(1), &mn(1), VoteChoice::Yes).unwrap();
        let transitions = end_of_cycle(&mut view, 200, &SimpleMajority).unwrap();
        assert_eq!(transitions, vec![(pid(1), CycleOutcome::Completed)]);
    }

    let kv = LmdbKv::open(dir.path(), map_size).unwrap();
    let view = ProposalView::new(kv);
    let record = view.get_proposal(&pid(1)).unwrap().unwrap();
    assert_eq!(record.status, ProposalStatus::Completed);
    assert_eq!(record.cycle, 2);
    assert_eq!(record.final_height, 200);
    assert_eq!(
        view.get_vote(&pid(1), 2, &mn(1)).unwrap(),
        Some(VoteChoice::Yes)
    );
}
