//! # End-to-End Scenarios
//!
//! 1. **Certification threshold**: 4 validators, quorum 3, majority 2. Block 0
//!    with two valid quorum signatures is certified, with one it is not.
//! 2. **Rotation proof**: a creator disabled in epoch 5 gets a rotation proof
//!    over its last voting stat `(7, H)`, persisted and broadcast under
//!    `(5, X, 7)`.
//! 3. **First block assumption**: block 2 with a valid AFP for block 1 records
//!    which leader-sequence position produced block 0; a second record for
//!    the same epoch is a no-op.

#[cfg(test)]
mod tests {
    use crate::harness::Cluster;
    use ac_02_quorum_selection::{
        count_verified_signatures, finalization_message, majority, verify_afp, QuorumError,
    };
    use ac_04_proof_mempool::AggregatedProof;
    use ac_05_finalization::FinalizationRequest;
    use ac_06_anchor_rotation::rotation_message;
    use shared_crypto::{blake3_hex, verify_hex};
    use shared_types::{
        keys, AnchorRotationProof, BlockId, FirstBlockAssumption, JsonStoreExt, KeyValueStore,
        Namespace, ValidatorId, VotingStat,
    };
    use std::collections::BTreeMap;

    // =========================================================================
    // SCENARIO 1: CERTIFICATION THRESHOLD
    // =========================================================================

    #[test]
    fn test_two_of_three_certifies_block_zero() {
        let cluster = Cluster::new(4, 3);
        let epoch = cluster.epoch();
        assert_eq!(epoch.quorum.len(), 3);
        assert_eq!(majority(epoch.quorum.len()), 2);

        let block = cluster.chain(&cluster.leader(), 1).remove(0);
        let certified = cluster.certify_with(&block, &[0, 1]);
        assert!(verify_afp(&certified, &epoch.full_id(), &epoch.quorum).is_ok());

        let single = cluster.certify_with(&block, &[2]);
        assert_eq!(
            verify_afp(&single, &epoch.full_id(), &epoch.quorum),
            Err(QuorumError::InsufficientAttestations { have: 1, need: 2 })
        );
    }

    #[tokio::test]
    async fn test_leader_collects_afp_for_block_zero() {
        let cluster = Cluster::new(4, 3);
        let epoch = cluster.epoch();
        let leader = cluster.leader();
        let proposer = cluster.proposer(&leader);

        let afp = proposer
            .produce(BTreeMap::new(), None, 10)
            .await
            .unwrap()
            .expect("majority reachable");

        let block_id = BlockId::new(epoch.id, leader.clone(), 0).to_string();
        assert_eq!(afp.block_id, block_id);
        assert_eq!(afp.proofs.len(), 2);
        assert!(verify_afp(&afp, &epoch.full_id(), &epoch.quorum).is_ok());

        let stored = cluster.node(&leader).finalization.get_afp(&block_id).unwrap();
        assert_eq!(stored, Some(afp));
    }

    #[tokio::test]
    async fn test_single_reachable_vote_does_not_certify() {
        let cluster = Cluster::new(4, 3);
        let epoch = cluster.epoch();
        let leader = cluster.leader();

        // Leave exactly one voter: the leader itself when it sits in the
        // quorum, one peer otherwise.
        let keep = usize::from(!epoch.in_quorum(&leader));
        for member in cluster.quorum_except(&leader).iter().skip(keep) {
            cluster.take_offline(member);
        }

        let proposer = cluster.proposer(&leader);
        assert!(proposer.produce(BTreeMap::new(), None, 10).await.unwrap().is_none());

        let block_id = BlockId::new(epoch.id, leader.clone(), 0).to_string();
        assert!(cluster
            .node(&leader)
            .finalization
            .get_afp(&block_id)
            .unwrap()
            .is_none());
    }

    // =========================================================================
    // SCENARIO 2: ROTATION PROOF FOR A DISABLED CREATOR
    // =========================================================================

    struct RotationSetup {
        cluster: Cluster,
        collector: ValidatorId,
        creator: ValidatorId,
        stat: VotingStat,
    }

    fn stat_at(cluster: &Cluster, creator: &ValidatorId, index: i64) -> VotingStat {
        let epoch = cluster.epoch();
        let hash = blake3_hex(&format!("{creator}:{index}"));
        let block_id = BlockId::new(epoch.id, creator.clone(), index as u64).to_string();
        let quorum = cluster.network.quorum_identities(&epoch);
        let afp = cluster
            .network
            .sign_afp(&quorum[..2], "prev", &block_id, &hash, &epoch.full_id());
        VotingStat { index, hash, afp }
    }

    /// Epoch 5, the outsider flagged disabled on the first quorum member, all
    /// quorum members agreeing on its stat at index 7.
    fn rotation_setup() -> RotationSetup {
        let cluster = Cluster::at_epoch(4, 3, 5);
        let epoch = cluster.epoch();
        let collector = epoch.quorum[0].clone();
        let creator = epoch
            .validators_registry
            .iter()
            .find(|v| !epoch.in_quorum(v))
            .cloned()
            .expect("one validator outside the quorum");

        let stat = stat_at(&cluster, &creator, 7);
        for member in &epoch.quorum {
            let node = cluster.node(member);
            node.state.store_voting_stat(5, &creator, &stat).unwrap();
        }
        cluster
            .node(&collector)
            .state
            .disable_finalization(5, &creator)
            .unwrap();

        RotationSetup {
            cluster,
            collector,
            creator,
            stat,
        }
    }

    #[tokio::test]
    async fn test_collector_persists_and_broadcasts_rotation_proof() {
        let RotationSetup {
            cluster,
            collector,
            creator,
            stat,
        } = rotation_setup();
        let epoch = cluster.epoch();
        assert_eq!(epoch.id, 5);

        let proofs = cluster.collector(&collector).collect_once().await;
        assert_eq!(proofs.len(), 1);
        let proof = &proofs[0];
        assert_eq!(proof.epoch_index, 5);
        assert_eq!(proof.creator, creator);
        assert_eq!(proof.voting_stat, stat);
        assert_eq!(proof.mempool_key(), format!("5:{creator}:7"));
        assert_eq!(proof.signatures.len(), 2);
        assert!(!proof.signatures.contains_key(&collector));

        let message = rotation_message(5, &creator, &stat, &epoch.full_id());
        assert_eq!(
            count_verified_signatures(&message, &proof.signatures, &epoch.quorum),
            2
        );

        let key = keys::anchor_rotation_proof(5, &creator);
        let local = cluster.node(&collector);
        let persisted: Option<AnchorRotationProof> = local
            .store
            .get_json(Namespace::FinalizationVotingStats, &key)
            .unwrap();
        assert_eq!(persisted.as_ref(), Some(proof));
        assert_eq!(local.pools.rotation.len(), 1);

        for member in cluster.quorum_except(&collector) {
            let peer = cluster.node(&member);
            let received: Option<AnchorRotationProof> = peer
                .store
                .get_json(Namespace::FinalizationVotingStats, &key)
                .unwrap();
            assert_eq!(received.as_ref(), Some(proof));
            assert_eq!(peer.pools.rotation.len(), 1);
            assert!(peer.state.is_finalization_disabled(5, &creator).unwrap());
        }
    }

    #[tokio::test]
    async fn test_existing_rotation_proof_is_not_collected_again() {
        let setup = rotation_setup();
        let collector = setup.cluster.collector(&setup.collector);

        assert_eq!(collector.collect_once().await.len(), 1);
        assert!(collector.collect_once().await.is_empty());
    }

    #[tokio::test]
    async fn test_fresher_peer_stat_is_adopted_instead_of_signed() {
        let setup = rotation_setup();
        let cluster = &setup.cluster;
        let fresher = stat_at(cluster, &setup.creator, 8);
        let informed = cluster.quorum_except(&setup.collector)[0].clone();
        cluster
            .node(&informed)
            .state
            .store_voting_stat(5, &setup.creator, &fresher)
            .unwrap();

        let proofs = cluster.collector(&setup.collector).collect_once().await;
        assert!(proofs.is_empty());

        let local = cluster
            .node(&setup.collector)
            .state
            .voting_stat(5, &setup.creator)
            .unwrap();
        assert_eq!(local, fresher);
    }

    #[tokio::test]
    async fn test_unreachable_quorum_leaves_no_proof() {
        let setup = rotation_setup();
        let cluster = &setup.cluster;
        for member in cluster.quorum_except(&setup.collector) {
            cluster.take_offline(&member);
        }

        assert!(cluster
            .collector(&setup.collector)
            .collect_once()
            .await
            .is_empty());
        let key = keys::anchor_rotation_proof(5, &setup.creator);
        assert!(!cluster
            .node(&setup.collector)
            .store
            .exists(Namespace::FinalizationVotingStats, &key)
            .unwrap());
    }

    // =========================================================================
    // SCENARIO 3: FIRST BLOCK ASSUMPTION
    // =========================================================================

    fn assumption(cluster: &Cluster, voter: &ValidatorId) -> Option<FirstBlockAssumption> {
        cluster
            .node(voter)
            .store
            .get_json(Namespace::EpochData, &keys::first_block_assumption(0))
            .unwrap()
    }

    #[test]
    fn test_third_block_records_first_block_assumption_once() {
        let cluster = Cluster::new(4, 3);
        let epoch = cluster.epoch();
        let creator = cluster.leader();
        assert_eq!(epoch.leader_position(&creator), Some(0));

        let blocks = cluster.chain(&creator, 3);
        let network_id = cluster.network_id();
        let first_hash = blocks[0].hash(&network_id);
        let afp_for_second = cluster.certify_with(&blocks[1], &[0, 1]);
        assert_eq!(afp_for_second.prev_block_hash, first_hash);

        let voter = cluster.quorum_except(&creator)[0].clone();
        let service = &cluster.node(&voter).finalization;
        assert!(assumption(&cluster, &voter).is_none());

        let vote = service
            .handle_request(&FinalizationRequest {
                block: blocks[2].clone(),
                previous_block_afp: Some(afp_for_second.clone()),
            })
            .unwrap();
        let message = finalization_message(
            &blocks[1].hash(&network_id),
            &BlockId::new(0, creator.clone(), 2).to_string(),
            &blocks[2].hash(&network_id),
            &epoch.full_id(),
        );
        assert!(verify_hex(&message, voter.as_str(), &vote.finalization_proof));

        let recorded = assumption(&cluster, &voter).expect("assumption recorded");
        assert_eq!(recorded.index_of_first_block_creator, 0);
        assert_eq!(recorded.afp_for_second_block, afp_for_second);

        // Same block, differently signed but equally valid AFP.
        let other_afp = cluster.certify_with(&blocks[1], &[1, 2]);
        assert_ne!(other_afp, afp_for_second);
        service
            .handle_request(&FinalizationRequest {
                block: blocks[2].clone(),
                previous_block_afp: Some(other_afp),
            })
            .unwrap();
        assert_eq!(assumption(&cluster, &voter), Some(recorded));
    }

    #[test]
    fn test_second_block_records_no_assumption() {
        let cluster = Cluster::new(4, 3);
        let creator = cluster.leader();
        let blocks = cluster.chain(&creator, 2);
        let voter = cluster.quorum_except(&creator)[0].clone();

        cluster
            .node(&voter)
            .finalization
            .handle_request(&FinalizationRequest {
                block: blocks[1].clone(),
                previous_block_afp: Some(cluster.certify(&blocks[0])),
            })
            .unwrap();
        assert!(assumption(&cluster, &voter).is_none());
    }
}
