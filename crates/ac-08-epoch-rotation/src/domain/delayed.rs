//! # Delayed Transactions
//!
//! The first block of an epoch may carry a batch of delayed operations
//! signed by the quorum. The batch is executed once, at rotation, and only
//! if it is newer than the last executed one.

use ac_02_quorum_selection::{count_verified_signatures, majority};
use shared_types::{DelayedTransaction, DelayedTransactionsBatch, EpochDataHandler};

/// Type tag of governance votes.
pub const VOTING_ACCEPT: &str = "votingAccept";

const TYPE_FIELD: &str = "type";

/// Outcome of checking a delayed batch against the epoch being closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchVerdict {
    /// Majority-signed and not applied yet.
    Apply,
    /// A batch for this epoch or a later one was already applied.
    AlreadyApplied { latest: u64 },
    /// Batch is bound to another epoch.
    WrongEpoch { batch_epoch: u64 },
    /// Not enough quorum signatures verify.
    Insufficient { verified: usize, required: usize },
}

/// Check `batch` for execution at the end of `epoch`.
pub fn verify_delayed_batch(
    batch: &DelayedTransactionsBatch,
    epoch: &EpochDataHandler,
    latest_applied: Option<u64>,
) -> BatchVerdict {
    if batch.epoch_index != epoch.id {
        return BatchVerdict::WrongEpoch {
            batch_epoch: batch.epoch_index,
        };
    }
    if let Some(latest) = latest_applied.filter(|latest| *latest >= epoch.id) {
        return BatchVerdict::AlreadyApplied { latest };
    }

    let required = majority(epoch.quorum.len());
    let verified =
        count_verified_signatures(&batch.signing_message(), &batch.proofs, &epoch.quorum);
    if verified < required {
        return BatchVerdict::Insufficient { verified, required };
    }
    BatchVerdict::Apply
}

/// Executed operations split by type tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DelayedPartition {
    pub voting_accept: Vec<DelayedTransaction>,
    pub other: Vec<DelayedTransaction>,
}

impl DelayedPartition {
    pub fn len(&self) -> usize {
        self.voting_accept.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split operations into governance votes and the rest. Untyped entries
/// are dropped.
pub fn partition_delayed_transactions(transactions: &[DelayedTransaction]) -> DelayedPartition {
    let mut partition = DelayedPartition::default();
    for tx in transactions {
        match tx.get(TYPE_FIELD).map(String::as_str) {
            Some(VOTING_ACCEPT) => partition.voting_accept.push(tx.clone()),
            Some(_) => partition.other.push(tx.clone()),
            None => {}
        }
    }
    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::NodeIdentity;
    use shared_types::{SignatureMap, ValidatorId};

    fn tx(kind: Option<&str>, n: &str) -> DelayedTransaction {
        let mut tx = DelayedTransaction::new();
        if let Some(kind) = kind {
            tx.insert("type".to_string(), kind.to_string());
        }
        tx.insert("n".to_string(), n.to_string());
        tx
    }

    fn quorum(n: u8) -> Vec<NodeIdentity> {
        (1..=n).map(|i| NodeIdentity::from_seed([i; 32])).collect()
    }

    fn epoch(id: u64, signers: &[NodeIdentity]) -> EpochDataHandler {
        EpochDataHandler {
            id,
            quorum: signers
                .iter()
                .map(|s| ValidatorId::from(s.public_key()))
                .collect(),
            ..Default::default()
        }
    }

    fn signed_batch(epoch_index: u64, signers: &[NodeIdentity]) -> DelayedTransactionsBatch {
        let mut batch = DelayedTransactionsBatch {
            epoch_index,
            delayed_transactions: vec![tx(Some("votingAccept"), "1")],
            proofs: SignatureMap::new(),
        };
        let message = batch.signing_message();
        batch.proofs = signers
            .iter()
            .map(|s| (ValidatorId::from(s.public_key()), s.sign(&message)))
            .collect();
        batch
    }

    #[test]
    fn test_majority_signed_batch_applies() {
        let members = quorum(3);
        let epoch = epoch(4, &members);
        let batch = signed_batch(4, &members[..2]);
        assert_eq!(verify_delayed_batch(&batch, &epoch, None), BatchVerdict::Apply);
        assert_eq!(verify_delayed_batch(&batch, &epoch, Some(3)), BatchVerdict::Apply);
    }

    #[test]
    fn test_batch_applies_once() {
        let members = quorum(3);
        let epoch = epoch(4, &members);
        let batch = signed_batch(4, &members);
        assert_eq!(
            verify_delayed_batch(&batch, &epoch, Some(4)),
            BatchVerdict::AlreadyApplied { latest: 4 }
        );
    }

    #[test]
    fn test_minority_rejected() {
        let members = quorum(3);
        let epoch = epoch(4, &members);
        let batch = signed_batch(4, &members[..1]);
        assert_eq!(
            verify_delayed_batch(&batch, &epoch, None),
            BatchVerdict::Insufficient {
                verified: 1,
                required: 2
            }
        );
    }

    #[test]
    fn test_tampered_payload_loses_signatures() {
        let members = quorum(3);
        let epoch = epoch(4, &members);
        let mut batch = signed_batch(4, &members);
        batch.delayed_transactions.push(tx(Some("other"), "2"));
        assert!(matches!(
            verify_delayed_batch(&batch, &epoch, None),
            BatchVerdict::Insufficient { verified: 0, .. }
        ));
    }

    #[test]
    fn test_batch_for_other_epoch() {
        let members = quorum(3);
        let batch = signed_batch(3, &members);
        assert_eq!(
            verify_delayed_batch(&batch, &epoch(4, &members), None),
            BatchVerdict::WrongEpoch { batch_epoch: 3 }
        );
    }

    #[test]
    fn test_partition_by_type() {
        let txs = vec![
            tx(Some("votingAccept"), "1"),
            tx(Some("addValidator"), "2"),
            tx(None, "3"),
            tx(Some("votingAccept"), "4"),
        ];
        let partition = partition_delayed_transactions(&txs);
        assert_eq!(partition.voting_accept.len(), 2);
        assert_eq!(partition.other, vec![tx(Some("addValidator"), "2")]);
        assert_eq!(partition.len(), 3);
        assert!(partition_delayed_transactions(&[]).is_empty());
    }
}
