//! # Identifiers
//!
//! - `ValidatorId`: hex-encoded Ed25519 public key of an anchor.
//! - `BlockId`: composite `epoch:creator:index`, the block store key and the
//!   `blockId` field of every finalization proof.

use crate::errors::IdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validator identifier (hex Ed25519 public key).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatorId(String);

impl ValidatorId {
    /// Wrap an encoded public key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if no key is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ValidatorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ValidatorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ValidatorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Composite block identifier `epoch:creator:index`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub epoch: u64,
    pub creator: ValidatorId,
    pub index: u64,
}

impl BlockId {
    pub fn new(epoch: u64, creator: ValidatorId, index: u64) -> Self {
        Self {
            epoch,
            creator,
            index,
        }
    }

    /// Id of the block at `index - 1` in the same segment.
    pub fn previous(&self) -> Option<BlockId> {
        let index = self.index.checked_sub(1)?;
        Some(Self::new(self.epoch, self.creator.clone(), index))
    }

    /// Id of the block at `index + 1` in the same segment.
    pub fn next(&self) -> BlockId {
        Self::new(self.epoch, self.creator.clone(), self.index + 1)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.epoch, self.creator, self.index)
    }
}

impl FromStr for BlockId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(epoch), Some(creator), Some(index), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(IdError::MalformedBlockId(s.to_string()));
        };
        if creator.is_empty() {
            return Err(IdError::MalformedBlockId(s.to_string()));
        }
        let epoch = epoch
            .parse()
            .map_err(|_| IdError::MalformedBlockId(s.to_string()))?;
        let index = index
            .parse()
            .map_err(|_| IdError::MalformedBlockId(s.to_string()))?;
        Ok(Self::new(epoch, ValidatorId::new(creator), index))
    }
}
