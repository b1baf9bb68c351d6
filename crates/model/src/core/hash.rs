use serde::{Deserialize, Serialize};
use std::fmt;

pub const HASH_LEN: usize = 32;

/// 32-byte blake3 digest identifying a header or a proof-of-work result.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub [u8; HASH_LEN]);

impl BlockHash {
    pub const ZERO: BlockHash = BlockHash([0u8; HASH_LEN]);

    pub fn digest(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        BlockHash(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Big-endian value of the leading 8 bytes, used for target comparison.
    pub fn leading_u64(&self) -> u64 {
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(prefix)
    }
}

impl From<[u8; HASH_LEN]> for BlockHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Abbreviated form keeps batch logs readable
        write!(f, "BlockHash(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_lowercase_hex() {
        let mut bytes = [0u8; HASH_LEN];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let rendered = BlockHash(bytes).to_string();
        assert!(rendered.starts_with("0xab00"));
        assert!(rendered.ends_with("01"));
        assert_eq!(rendered.len(), 2 + HASH_LEN * 2);
    }

    #[test]
    fn digest_depends_on_part_order() {
        let a = BlockHash::digest(&[b"left", b"right"]);
        let b = BlockHash::digest(&[b"right", b"left"]);
        assert_ne!(a, b);
        assert_ne!(a, BlockHash::ZERO);
    }

    #[test]
    fn leading_u64_reads_big_endian() {
        let mut bytes = [0u8; HASH_LEN];
        bytes[7] = 0x02;
        assert_eq!(BlockHash(bytes).leading_u64(), 2);
    }
}
