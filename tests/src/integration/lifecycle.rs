//! # Epoch Lifecycle
//!
//! ```text
//! leader produces blocks 0..2 ──→ quorum votes, AFPs stored
//!          │                      block 2 records FIRST_BLOCK_ASSUMPTION
//!          ▼
//! epoch window elapses ──→ EpochRotation resolves block 0 ──→ epoch 1
//!                                                             hash = blake3(hash(block 0))
//! ```
//!
//! Proofs pooled by the collector and the leader-finalization surface ride
//! in the next block the leader produces.

#[cfg(test)]
mod tests {
    use crate::harness::Cluster;
    use ac_01_block_model::Block;
    use ac_02_quorum_selection::derive_assignment;
    use ac_05_finalization::{FinalizationError, FinalizationRequest};
    use ac_07_leader_finalization::{AcceptLeaderFinalizationRequest, LeaderFinalizationService};
    use ac_08_epoch_rotation::TickOutcome;
    use shared_crypto::blake3_hex;
    use shared_types::{
        keys, BlockId, FirstBlockAssumption, JsonStoreExt, LeaderFinalizationProof, Namespace,
        SignatureMap, ValidatorId, VotingStat,
    };
    use std::collections::BTreeMap;

    /// First instant after the genesis epoch window (start 1 000, 60 000 ms).
    const EXPIRED: u64 = 61_000;

    fn stored_block(cluster: &Cluster, holder: &ValidatorId, id: &BlockId) -> Option<Block> {
        cluster
            .node(holder)
            .store
            .get_json(Namespace::Blocks, &id.to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn test_epoch_rotates_onto_first_block_of_leader() {
        let cluster = Cluster::new(4, 3);
        let genesis_epoch = cluster.epoch();
        let leader = cluster.leader();
        let proposer = cluster.proposer(&leader);

        for time in 0..3 {
            proposer
                .produce(BTreeMap::new(), None, 10 + time)
                .await
                .unwrap()
                .expect("quorum reachable");
        }

        let first = stored_block(&cluster, &leader, &BlockId::new(0, leader.clone(), 0))
            .expect("leader keeps its own blocks");
        let expected_hash = blake3_hex(&first.hash(&cluster.network_id()));

        let holders: Vec<ValidatorId> = cluster
            .nodes
            .iter()
            .filter(|n| {
                n.store
                    .get_json::<FirstBlockAssumption>(
                        Namespace::EpochData,
                        &keys::first_block_assumption(0),
                    )
                    .unwrap()
                    .is_some()
            })
            .map(|n| n.id.clone())
            .collect();
        assert!(!holders.is_empty());

        for holder in &holders {
            let rotation = cluster.epoch_rotation(holder);
            let outcome = rotation.tick(EXPIRED).await.unwrap();
            assert!(matches!(outcome, TickOutcome::Rotated { from: 0, to: 1, .. }));

            let node = cluster.node(holder);
            let epoch = node.state.current_epoch();
            assert_eq!(epoch.hash, expected_hash);
            assert_eq!(epoch.start_timestamp, EXPIRED);
            assert_eq!(epoch.current_leader_index, 0);
            assert!(node.state.is_epoch_finished(0).unwrap());

            let assignment = derive_assignment(
                &genesis_epoch.validators_registry,
                &expected_hash,
                genesis_epoch.quorum.len(),
            );
            assert_eq!(epoch.quorum, assignment.quorum);
            assert_eq!(epoch.leaders_sequence, assignment.leaders_sequence);
        }
    }

    #[test]
    fn test_finished_epoch_refuses_further_votes() {
        let cluster = Cluster::new(4, 3);
        let leader = cluster.leader();
        let voter = cluster.quorum_except(&leader)[0].clone();
        let node = cluster.node(&voter);
        node.state.mark_epoch_finished(0).unwrap();

        let blocks = cluster.chain(&leader, 1);
        let result = node
            .finalization
            .handle_request(&FinalizationRequest {
                block: blocks[0].clone(),
                previous_block_afp: None,
            });
        assert!(matches!(
            result,
            Err(FinalizationError::EpochFinished(0))
        ));
    }

    #[tokio::test]
    async fn test_collected_rotation_proof_rides_in_next_block() {
        let cluster = Cluster::new(4, 3);
        let epoch = cluster.epoch();
        let leader = cluster.leader();
        let creator = epoch
            .validators_registry
            .iter()
            .find(|v| **v != leader)
            .cloned()
            .unwrap();

        let hash = blake3_hex("creator-block-3");
        let block_id = BlockId::new(0, creator.clone(), 3).to_string();
        let quorum = cluster.network.quorum_identities(&epoch);
        let afp = cluster
            .network
            .sign_afp(&quorum[..2], "prev", &block_id, &hash, &epoch.full_id());
        let stat = VotingStat {
            index: 3,
            hash,
            afp,
        };
        for node in &cluster.nodes {
            node.state.store_voting_stat(0, &creator, &stat).unwrap();
        }
        let leader_node = cluster.node(&leader);
        leader_node.state.disable_finalization(0, &creator).unwrap();

        let proofs = cluster.collector(&leader).collect_once().await;
        assert_eq!(proofs.len(), 1);
        assert_eq!(leader_node.pools.rotation.len(), 1);

        cluster
            .proposer(&leader)
            .produce(BTreeMap::new(), None, 10)
            .await
            .unwrap()
            .expect("quorum reachable");

        let block = stored_block(&cluster, &leader, &BlockId::new(0, leader.clone(), 0)).unwrap();
        assert_eq!(block.extra_data.rotation_proofs(), proofs.as_slice());
        assert!(leader_node.pools.rotation.is_empty());
    }

    #[tokio::test]
    async fn test_accepted_leader_finalization_rides_in_next_block() {
        let cluster = Cluster::new(4, 3);
        let leader = cluster.leader();
        let leader_node = cluster.node(&leader);
        let service = LeaderFinalizationService::new(
            leader_node.state.clone(),
            leader_node.pools.leader_finalization.clone(),
        );

        let mut signatures = SignatureMap::new();
        signatures.insert(leader.clone(), "sig".into());
        let proof = LeaderFinalizationProof {
            epoch_index: 0,
            leader: leader.clone(),
            voting_stat: VotingStat {
                index: 4,
                hash: "h".into(),
                ..VotingStat::template()
            },
            signatures,
        };
        let accepted = service
            .accept_leader_finalizations(AcceptLeaderFinalizationRequest {
                leader_finalizations: vec![proof.clone()],
            })
            .await
            .unwrap();
        assert_eq!(accepted, 1);

        cluster
            .proposer(&leader)
            .produce(BTreeMap::new(), None, 10)
            .await
            .unwrap()
            .expect("quorum reachable");

        let block = stored_block(&cluster, &leader, &BlockId::new(0, leader.clone(), 0)).unwrap();
        assert_eq!(block.extra_data.leader_finalization_proofs(), &[proof]);
        assert!(service.mempool().is_empty());
    }
}
