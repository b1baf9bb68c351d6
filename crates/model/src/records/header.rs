use crate::core::hash::BlockHash;
use serde::{Deserialize, Serialize};

/// Upper bound on `extra_data`, matching the usual header rule.
pub const MAX_EXTRA_DATA: usize = 32;

const GENESIS_TIMESTAMP: u64 = 1_438_269_973;
const GENESIS_GAS_LIMIT: u64 = 5_000;
const GENESIS_DIFFICULTY: u64 = 1 << 34;
const GENESIS_NONCE: u64 = 0x42;

/// One position of the header chain, decoded from an archive record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub number: u64,
    pub parent_hash: BlockHash,
    pub timestamp: u64,
    pub difficulty: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub extra_data: Vec<u8>,
    pub mix_digest: BlockHash,
    pub nonce: u64,
}

impl Header {
    /// The fixed record every chain is seeded from.
    pub fn genesis() -> Self {
        Header {
            number: 0,
            parent_hash: BlockHash::ZERO,
            timestamp: GENESIS_TIMESTAMP,
            difficulty: GENESIS_DIFFICULTY,
            gas_limit: GENESIS_GAS_LIMIT,
            gas_used: 0,
            extra_data: b"headerimport genesis".to_vec(),
            mix_digest: BlockHash::ZERO,
            nonce: GENESIS_NONCE,
        }
    }

    /// Identity of the header over every field, seal included.
    pub fn hash(&self) -> BlockHash {
        BlockHash::digest(&[
            &self.seal_hash().0,
            &self.mix_digest.0,
            &self.nonce.to_le_bytes(),
        ])
    }

    /// Digest of every field the proof of work commits to.
    pub fn seal_hash(&self) -> BlockHash {
        BlockHash::digest(&[
            &self.number.to_le_bytes(),
            &self.parent_hash.0,
            &self.timestamp.to_le_bytes(),
            &self.difficulty.to_le_bytes(),
            &self.gas_limit.to_le_bytes(),
            &self.gas_used.to_le_bytes(),
            &(self.extra_data.len() as u64).to_le_bytes(),
            &self.extra_data,
        ])
    }

    /// Proof-of-work digest for the current nonce.
    pub fn work(&self) -> BlockHash {
        BlockHash::digest(&[&self.seal_hash().0, &self.nonce.to_le_bytes()])
    }

    pub fn target(&self) -> Option<u64> {
        (self.difficulty > 0).then(|| u64::MAX / self.difficulty)
    }

    /// `mix_digest` must equal the work digest, and the work must meet the
    /// difficulty target.
    pub fn seal_is_valid(&self) -> bool {
        let Some(target) = self.target() else {
            return false;
        };
        let work = self.work();
        work == self.mix_digest && work.leading_u64() <= target
    }
}
