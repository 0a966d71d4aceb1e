mod common;

use std::sync::Arc;

use serde_json::json;

use common::*;
use governance_indexer::config::IndexerConfig;
use governance_indexer::domain::models::{
    BountyStatus, CouncilMotionStatus, ProposalStatus, ReferendumStatus, TipProposalStatus,
};
use governance_indexer::infrastructure::persistence::InMemoryStore;

fn setup(head: u64) -> (Arc<FakeChainClient>, Arc<InMemoryStore>) {
    (Arc::new(FakeChainClient::new(head)), Arc::new(InMemoryStore::new()))
}

fn close_motion(client: &FakeChainClient, height: u64, outcome: &str) {
    let index = client.push_extrinsic(
        height,
        signed("closer", "council", "close", json!({ "proposal_hash": "0xmotion", "index": "12" })),
    );
    client.push_event(height, event(apply(index), "council", outcome, json!(["0xmotion"])));
    client.push_event(height, success(index));
}

#[tokio::test]
async fn test_walk_is_backward_and_inclusive() {
    let (client, store) = setup(10);

    let summary = walk(&client, &store, Some(8), 5).await.unwrap();

    assert_eq!(summary.indexed, 4);
    assert_eq!(client.fetched(), vec![8, 7, 6, 5]);
    let mut numbers: Vec<i64> = store.blocks().iter().map(|b| b.number).collect();
    numbers.sort();
    assert_eq!(numbers, vec![5, 6, 7, 8]);
}

#[tokio::test]
async fn test_walk_starts_at_head_and_stops_at_genesis() {
    let (client, store) = setup(3);

    let summary = walk(&client, &store, None, 0).await.unwrap();

    assert_eq!(summary.indexed, 4);
    assert_eq!(client.fetched(), vec![3, 2, 1, 0]);
}

#[tokio::test]
async fn test_start_beyond_head_stops_the_walk() {
    let (client, store) = setup(3);

    assert!(walk(&client, &store, Some(9), 0).await.is_err());
    assert!(store.blocks().is_empty());
}

#[tokio::test]
async fn test_reindexing_is_idempotent() {
    let (client, store) = setup(5);
    let index = client.push_extrinsic(
        4,
        signed("voter", "council", "vote", json!({ "proposal": "0xmotion", "index": 1, "approve": true })),
    );
    client.push_event(4, success(index));

    walk(&client, &store, Some(5), 3).await.unwrap();
    let rows = store.governance_row_count();
    let blocks = store.blocks().len();

    let summary = walk(&client, &store, Some(5), 3).await.unwrap();

    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.indexed, 0);
    assert_eq!(store.governance_row_count(), rows);
    assert_eq!(store.blocks().len(), blocks);
    assert_eq!(store.council_motion_votes().len(), 1);
}

#[tokio::test]
async fn test_failed_extrinsic_changes_nothing() {
    let (client, store) = setup(2);
    let index = client.push_extrinsic(
        2,
        signed("A", "bounties", "proposeBounty", json!({ "description": "road", "value": "1,000" })),
    );
    client.push_event(2, event(apply(index), "bounties", "BountyProposed", json!(["7"])));
    client.push_event(2, failure(index));

    walk(&client, &store, Some(2), 2).await.unwrap();

    assert_eq!(store.governance_row_count(), 0);
    assert!(store.accounts().is_empty());
    assert!(!store.blocks()[0].error);
}

#[tokio::test]
async fn test_proposed_bounty_is_recorded() {
    let (client, store) = setup(2);
    let index = client.push_extrinsic(
        2,
        signed("A", "bounties", "proposeBounty", json!({ "value": "1,000", "description": "road" })),
    );
    client.push_event(2, event(apply(index), "bounties", "BountyProposed", json!(["7"])));
    client.push_event(2, success(index));

    walk(&client, &store, Some(2), 2).await.unwrap();

    let bounties = store.bounties();
    assert_eq!(bounties.len(), 1);
    let bounty = &bounties[0];
    assert_eq!(bounty.bounty_id, 7);
    assert_eq!(bounty.description.as_deref(), Some("road"));
    assert_eq!(bounty.value, Some(1000.0));
    assert_eq!(bounty.status, Some(BountyStatus::Proposed));
    assert_eq!(store.address_of(bounty.proposed_by.unwrap()).as_deref(), Some("A"));
}

#[tokio::test]
async fn test_batch_calls_share_signer_and_block() {
    let (client, store) = setup(1);
    let index = client.push_extrinsic(
        1,
        signed(
            "batcher",
            "utility",
            "batch",
            json!({
                "calls": [
                    call("council", "vote", json!({ "proposal": "0xa", "index": 1, "approve": true })),
                    call("tips", "tip", json!({ "hash": "0xtip", "tip_value": "12,5" })),
                    call("bounties", "proposeBounty", json!({ "description": "bridge", "value": "2,500" }))
                ]
            }),
        ),
    );
    client.push_event(1, event(apply(index), "bounties", "BountyProposed", json!(["3"])));
    client.push_event(1, event(apply(index), "utility", "BatchCompleted", json!([])));
    client.push_event(1, success(index));

    walk(&client, &store, Some(1), 1).await.unwrap();

    let block_id = store.blocks()[0].id;
    let votes = store.council_motion_votes();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].block, block_id);
    assert_eq!(store.address_of(votes[0].account_id).as_deref(), Some("batcher"));

    let tips = store.tips();
    assert_eq!(tips.len(), 1);
    assert_eq!(tips[0].value, 12.5);
    assert_eq!(tips[0].tipped_at, block_id);

    let bounty = &store.bounties()[0];
    assert_eq!(bounty.value, Some(2500.0));
    assert_eq!(bounty.proposed_at, Some(block_id));
}

#[tokio::test]
async fn test_proxied_council_vote_counts_for_signer() {
    let (client, store) = setup(1);
    let index = client.push_extrinsic(
        1,
        signed(
            "proxy-signer",
            "proxy",
            "proxy",
            json!({
                "real": { "Id": "owner" },
                "force_proxy_type": null,
                "call": call("council", "vote", json!({ "proposal": "0xmotion", "index": 4, "approve": false }))
            }),
        ),
    );
    client.push_event(1, event(apply(index), "proxy", "ProxyExecuted", json!([{ "Ok": null }])));
    client.push_event(1, success(index));

    walk(&client, &store, Some(1), 1).await.unwrap();

    let motions = store.council_motions();
    assert_eq!(motions.len(), 1);
    assert_eq!(motions[0].motion_hash, "0xmotion");
    let votes = store.council_motion_votes();
    assert_eq!(votes.len(), 1);
    assert!(!votes[0].approved);
    assert_eq!(store.address_of(votes[0].account_id).as_deref(), Some("proxy-signer"));
}

#[tokio::test]
async fn test_higher_block_close_wins_when_walking_backward() {
    let (client, store) = setup(100);
    close_motion(&client, 100, "Approved");
    close_motion(&client, 90, "Rejected");

    walk(&client, &store, Some(100), 90).await.unwrap();

    let motion = &store.council_motions()[0];
    assert_eq!(motion.status, Some(CouncilMotionStatus::Approved));
    assert_eq!(motion.proposal_index, Some(12));
}

#[tokio::test]
async fn test_higher_block_close_wins_when_walking_forward() {
    let (client, store) = setup(100);
    close_motion(&client, 100, "Approved");
    close_motion(&client, 90, "Rejected");

    walk(&client, &store, Some(90), 90).await.unwrap();
    assert_eq!(store.council_motions()[0].status, Some(CouncilMotionStatus::Rejected));

    walk(&client, &store, Some(100), 100).await.unwrap();
    assert_eq!(store.council_motions()[0].status, Some(CouncilMotionStatus::Approved));
}

#[tokio::test]
async fn test_block_error_is_recorded_and_walk_continues() {
    let (client, store) = setup(3);
    client.push_event(3, json!({ "phase": "Sometime", "event": { "section": "system", "method": "Remarked", "data": [] } }));
    let index = client.push_extrinsic(
        2,
        signed("finder", "tips", "reportAwesome", json!({ "reason": "0x6b", "who": { "Id": "helper" } })),
    );
    client.push_event(2, event(apply(index), "tips", "NewTip", json!(["0xtip"])));
    client.push_event(2, success(index));

    let summary = walk(&client, &store, Some(3), 2).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.indexed, 1);
    let blocks = store.blocks();
    let broken = blocks.iter().find(|b| b.number == 3).unwrap();
    assert!(broken.error);
    assert!(broken.error_message.as_deref().unwrap().contains("phase"));
    let healthy = blocks.iter().find(|b| b.number == 2).unwrap();
    assert!(!healthy.error);
    assert_eq!(store.tip_proposals()[0].status, Some(TipProposalStatus::Proposed));
}

fn propose_road_bounty(client: &FakeChainClient, height: u64) {
    let index = client.push_extrinsic(
        height,
        signed("A", "bounties", "proposeBounty", json!({ "value": "1,000", "description": "road" })),
    );
    client.push_event(height, event(apply(index), "bounties", "BountyProposed", json!(["7"])));
    client.push_event(height, success(index));
}

#[tokio::test]
async fn test_event_fetch_is_retried() {
    let (client, store) = setup(2);
    propose_road_bounty(&client, 2);
    client.fail_events(2, 1);
    let config = IndexerConfig {
        fetch_retries: 2,
        ..walk_config(Some(2), 2)
    };

    let summary = walk_with(&client, &store, &config).await.unwrap();

    assert_eq!(summary.indexed, 1);
    assert!(!store.blocks()[0].error);
    assert_eq!(store.bounties()[0].bounty_id, 7);
}

#[tokio::test]
async fn test_event_fetch_failure_leaves_block_for_next_run() {
    let (client, store) = setup(2);
    propose_road_bounty(&client, 2);
    client.fail_events(2, 1);

    let first = walk(&client, &store, Some(2), 2).await.unwrap();
    assert_eq!(first.failed, 1);
    assert!(store.blocks().is_empty());
    assert!(store.bounties().is_empty());

    let second = walk(&client, &store, Some(2), 2).await.unwrap();
    assert_eq!(second.indexed, 1);
    assert_eq!(second.skipped, 0);
    let bounty = &store.bounties()[0];
    assert_eq!(bounty.bounty_id, 7);
    assert_eq!(bounty.status, Some(BountyStatus::Proposed));
    assert!(!store.blocks()[0].error);
}

#[tokio::test]
async fn test_initialization_events_are_applied_once_per_block() {
    let (client, store) = setup(1);
    client.push_event(1, event(initialization(), "democracy", "Started", json!(["5", "SimpleMajority"])));
    client.push_event(1, event(initialization(), "democracy", "Tabled", json!(["2", "1,000,000", [{ "Id": "backer" }]])));
    client.push_event(
        1,
        event(initialization(), "phragmenElection", "NewTerm", json!([[["m1", "100"], ["m2", "200"]]])),
    );
    client.push_event(1, success(0));

    walk(&client, &store, Some(1), 1).await.unwrap();

    let proposal = &store.proposals()[0];
    assert_eq!(proposal.proposal_index, Some(2));
    assert_eq!(proposal.status, Some(ProposalStatus::Tabled));
    let referendum = &store.referenda()[0];
    assert_eq!(referendum.referendum_index, 5);
    assert_eq!(referendum.status, Some(ReferendumStatus::Started));
    assert_eq!(referendum.proposal_id, Some(proposal.id));
    assert_eq!(store.councilterms().len(), 1);
    assert_eq!(store.councilors().len(), 2);
}

#[tokio::test]
async fn test_democracy_vote_uses_standard_vote_details() {
    let (client, store) = setup(1);
    let index = client.push_extrinsic(1, signed("voter", "democracy", "vote", json!({ "ref_index": "5" })));
    client.push_event(
        1,
        event(
            apply(index),
            "democracy",
            "Voted",
            json!([
                { "Id": "voter" },
                "5",
                { "Standard": { "vote": { "vote": "Aye", "conviction": "None" }, "balance": "2,000" } }
            ]),
        ),
    );
    client.push_event(1, success(index));

    walk(&client, &store, Some(1), 1).await.unwrap();

    let votes = store.referendum_votes();
    assert_eq!(votes.len(), 1);
    assert!(votes[0].vote);
    assert_eq!(votes[0].conviction, 0.1);
    assert_eq!(votes[0].locked_value, 2000.0);
    assert_eq!(store.address_of(votes[0].voter).as_deref(), Some("voter"));
}
