use crate::{
    core::hash::BlockHash,
    records::header::{Header, MAX_EXTRA_DATA},
};

const BLOCK_INTERVAL_SECS: u64 = 13;
const MAX_DIFFICULTY: u64 = 4;

/// Deterministic generator of a valid header chain on top of a parent.
///
/// Difficulty stays tiny so mining a nonce costs a handful of hashes, which
/// keeps fixture archives with thousands of headers cheap to build.
#[derive(Debug, Clone)]
pub struct SyntheticChain {
    head: Header,
}

impl SyntheticChain {
    pub fn from_genesis() -> Self {
        Self::on_top_of(Header::genesis())
    }

    pub fn on_top_of(parent: Header) -> Self {
        Self { head: parent }
    }

    pub fn head(&self) -> &Header {
        &self.head
    }

    /// Builds and seals the child of the current head.
    pub fn next_header(&mut self) -> Header {
        let parent = &self.head;
        let number = parent.number + 1;
        let mut extra = format!("synthetic-{number}").into_bytes();
        extra.truncate(MAX_EXTRA_DATA);

        let header = seal(Header {
            number,
            parent_hash: parent.hash(),
            timestamp: parent.timestamp + BLOCK_INTERVAL_SECS,
            difficulty: 1 + number % MAX_DIFFICULTY,
            gas_limit: parent.gas_limit,
            gas_used: number % (parent.gas_limit + 1),
            extra_data: extra,
            mix_digest: BlockHash::ZERO,
            nonce: 0,
        });
        self.head = header.clone();
        header
    }

    pub fn generate(&mut self, count: usize) -> Vec<Header> {
        (0..count).map(|_| self.next_header()).collect()
    }
}

impl Iterator for SyntheticChain {
    type Item = Header;

    fn next(&mut self) -> Option<Header> {
        Some(self.next_header())
    }
}

/// Searches nonces until the header meets its own difficulty target.
pub fn seal(mut header: Header) -> Header {
    loop {
        let work = header.work();
        if header.target().is_some_and(|t| work.leading_u64() <= t) {
            header.mix_digest = work;
            return header;
        }
        header.nonce = header.nonce.wrapping_add(1);
    }
}
