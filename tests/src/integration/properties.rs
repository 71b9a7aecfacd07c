//! # Consensus Properties
//!
//! Invariants that must hold whichever node evaluates them:
//!
//! - a block or attestation altered after signing no longer verifies
//! - a creator's accepted indices only move forward
//! - each quorum member counts once toward a majority; outsiders never count
//! - a mempool slot holds the latest proof for its key and drains exactly once
//! - independent nodes rotate to the same next epoch, once

#[cfg(test)]
mod tests {
    use crate::harness::Cluster;
    use ac_02_quorum_selection::{
        count_verified_signatures, finalization_message, select_quorum, verify_afp, QuorumError,
    };
    use ac_04_proof_mempool::{AggregatedProof, ProofMempool};
    use ac_05_finalization::{FinalizationError, FinalizationRequest};
    use ac_08_epoch_rotation::TickOutcome;
    use shared_crypto::blake3_hex;
    use shared_types::{AnchorRotationProof, SignatureMap, ValidatorId, VotingStat};

    const EXPIRED: u64 = 61_000;

    // =========================================================================
    // SIGNATURES
    // =========================================================================

    #[test]
    fn test_altered_block_fails_signature_check() {
        let cluster = Cluster::new(4, 3);
        let network_id = cluster.network_id();
        let block = cluster.chain(&cluster.leader(), 1).remove(0);
        assert!(block.verify_signature(&network_id));

        let mut later = block.clone();
        later.time += 1;
        assert!(!later.verify_signature(&network_id));

        let mut reindexed = block.clone();
        reindexed.index = 7;
        assert!(!reindexed.verify_signature(&network_id));

        let mut foreign = block.clone();
        foreign.creator = cluster.quorum_except(&block.creator)[0].clone();
        assert!(!foreign.verify_signature(&network_id));

        assert!(!block.verify_signature("another-network"));
    }

    #[test]
    fn test_attestation_over_other_block_is_rejected() {
        let cluster = Cluster::new(4, 3);
        let epoch = cluster.epoch();
        let blocks = cluster.chain(&cluster.leader(), 2);

        let mut afp = cluster.certify_with(&blocks[0], &[0, 1]);
        let foreign = cluster.certify_with(&blocks[1], &[0, 1]);
        let (signer, signature) = foreign.proofs.iter().next().unwrap();
        afp.proofs.insert(signer.clone(), signature.clone());

        assert_eq!(
            verify_afp(&afp, &epoch.full_id(), &epoch.quorum),
            Err(QuorumError::InsufficientAttestations { have: 1, need: 2 })
        );
    }

    // =========================================================================
    // MAJORITY COUNTING
    // =========================================================================

    #[test]
    fn test_outsider_and_borrowed_signatures_do_not_count() {
        let cluster = Cluster::new(4, 3);
        let epoch = cluster.epoch();
        let block = cluster.chain(&cluster.leader(), 1).remove(0);
        let mut afp = cluster.certify_with(&block, &[0]);
        let message = finalization_message(
            &afp.prev_block_hash,
            &afp.block_id,
            &afp.block_hash,
            &epoch.full_id(),
        );

        let outsider = cluster.network.outsiders(&epoch)[0];
        afp.proofs.insert(
            ValidatorId::from(outsider.public_key()),
            outsider.sign(&message),
        );
        assert_eq!(count_verified_signatures(&message, &afp.proofs, &epoch.quorum), 1);
        assert!(verify_afp(&afp, &epoch.full_id(), &epoch.quorum).is_err());

        // One member's signature filed under a second member's key.
        let genuine = afp.proofs[&epoch.quorum[0]].clone();
        let mut borrowed = SignatureMap::new();
        borrowed.insert(epoch.quorum[0].clone(), genuine.clone());
        borrowed.insert(epoch.quorum[1].clone(), genuine);
        assert_eq!(count_verified_signatures(&message, &borrowed, &epoch.quorum), 1);
    }

    // =========================================================================
    // INDEX MONOTONICITY
    // =========================================================================

    #[test]
    fn test_voter_only_moves_forward() {
        let cluster = Cluster::new(4, 3);
        let creator = cluster.leader();
        let blocks = cluster.chain(&creator, 3);
        let voter = cluster.quorum_except(&creator)[0].clone();
        let service = &cluster.node(&voter).finalization;

        let request = |i: usize| FinalizationRequest {
            block: blocks[i].clone(),
            previous_block_afp: i.checked_sub(1).map(|p| cluster.certify(&blocks[p])),
        };
        for i in 0..3 {
            service.handle_request(&request(i)).unwrap();
        }

        let stat = cluster.node(&voter).state.voting_stat(0, &creator).unwrap();
        assert_eq!(stat.index, 1);

        assert!(matches!(
            service.handle_request(&request(0)),
            Err(FinalizationError::StaleIndex {
                local: 1,
                offered: 0
            })
        ));

        // Same index as the recorded stat but a different block.
        let mut rival = blocks[1].clone();
        rival.time += 100;
        rival.sign(cluster.network.identity(&creator), &cluster.network_id());
        let rival_request = FinalizationRequest {
            block: rival,
            previous_block_afp: Some(cluster.certify(&blocks[0])),
        };
        assert!(matches!(
            service.handle_request(&rival_request),
            Err(FinalizationError::StaleIndex { .. })
        ));

        // Re-sending the recorded block is answered again.
        assert!(service.handle_request(&request(1)).is_ok());
    }

    #[test]
    fn test_conflicting_block_at_unseen_index_is_equivocation() {
        let cluster = Cluster::new(4, 3);
        let creator = cluster.leader();
        let blocks = cluster.chain(&creator, 1);
        let voter = cluster.quorum_except(&creator)[0].clone();
        let service = &cluster.node(&voter).finalization;

        service
            .handle_request(&FinalizationRequest {
                block: blocks[0].clone(),
                previous_block_afp: None,
            })
            .unwrap();

        let mut rival = blocks[0].clone();
        rival.time += 1;
        rival.sign(cluster.network.identity(&creator), &cluster.network_id());
        let result = service.handle_request(&FinalizationRequest {
            block: rival,
            previous_block_afp: None,
        });
        assert!(matches!(result, Err(FinalizationError::Equivocation { .. })));
    }

    // =========================================================================
    // MEMPOOL
    // =========================================================================

    fn rotation_proof(creator: &str, index: i64, signer: &str) -> AnchorRotationProof {
        let mut signatures = SignatureMap::new();
        signatures.insert(ValidatorId::from(signer), "sig".into());
        AnchorRotationProof {
            epoch_index: 2,
            creator: ValidatorId::from(creator),
            voting_stat: VotingStat {
                index,
                hash: "h".into(),
                ..VotingStat::template()
            },
            signatures,
        }
    }

    #[test]
    fn test_mempool_keeps_latest_per_key_and_drains_once() {
        let mempool = ProofMempool::new();
        mempool.add(rotation_proof("a", 3, "first"));
        mempool.add(rotation_proof("a", 3, "second"));
        mempool.add(rotation_proof("a", 4, "first"));
        mempool.add(rotation_proof("b", 3, "first"));
        assert_eq!(mempool.len(), 3);

        let mut drained = mempool.drain();
        drained.sort_by_key(|p| p.mempool_key());
        let keys: Vec<String> = drained.iter().map(|p| p.mempool_key()).collect();
        assert_eq!(keys, vec!["2:a:3", "2:a:4", "2:b:3"]);
        assert!(drained[0]
            .signatures
            .contains_key(&ValidatorId::from("second")));

        assert!(mempool.is_empty());
        assert!(mempool.drain().is_empty());
    }

    // =========================================================================
    // ROTATION
    // =========================================================================

    #[tokio::test]
    async fn test_independent_nodes_rotate_identically_and_once() {
        let cluster = Cluster::new(4, 3);
        let genesis_hash = cluster.epoch().hash;

        for node in &cluster.nodes {
            let rotation = cluster.epoch_rotation(&node.id);
            assert!(matches!(
                rotation.tick(EXPIRED).await.unwrap(),
                TickOutcome::Rotated { from: 0, to: 1, .. }
            ));
            assert_eq!(rotation.tick(EXPIRED).await.unwrap(), TickOutcome::Fresh);
        }

        let epochs: Vec<_> = cluster
            .nodes
            .iter()
            .map(|n| n.state.current_epoch())
            .collect();
        assert_eq!(epochs[0].id, 1);
        assert_eq!(epochs[0].hash, blake3_hex(&genesis_hash));
        assert!(epochs.iter().all(|e| *e == epochs[0]));
    }

    #[test]
    fn test_quorum_selection_is_a_pure_function() {
        let cluster = Cluster::new(6, 4);
        let registry = cluster.epoch().validators_registry;
        let hash = blake3_hex("epoch");

        let quorum = select_quorum(&registry, &hash, 4);
        assert_eq!(quorum.len(), 4);
        assert_eq!(select_quorum(&registry, &hash, 4), quorum);

        let mut shuffled: Vec<ValidatorId> = registry.iter().rev().cloned().collect();
        shuffled.push(registry[0].clone());
        assert_eq!(select_quorum(&shuffled, &hash, 4), quorum);

        assert_eq!(select_quorum(&registry, &hash, 10).len(), registry.len());
    }
}
