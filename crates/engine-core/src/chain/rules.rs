use crate::error::{ChainError, ValidationFailure};
use model::{
    core::hash::BlockHash,
    records::header::{Header, MAX_EXTRA_DATA},
};
use rayon::prelude::*;
use std::num::NonZeroUsize;

const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;

/// Structural and proof-of-work checks applied to each header against its
/// parent.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRules {
    /// The proof is verified on every n-th header of a batch and always on the
    /// last one.
    pub seal_check_interval: NonZeroUsize,
}

impl Default for HeaderRules {
    fn default() -> Self {
        Self {
            seal_check_interval: NonZeroUsize::MIN,
        }
    }
}

impl HeaderRules {
    pub fn new(seal_check_interval: NonZeroUsize) -> Self {
        Self {
            seal_check_interval,
        }
    }

    pub fn checks_seal(&self, position: usize, len: usize) -> bool {
        position + 1 == len || (position + 1) % self.seal_check_interval.get() == 0
    }

    pub fn check_structure(
        &self,
        parent: &Header,
        parent_hash: &BlockHash,
        header: &Header,
    ) -> Result<(), ValidationFailure> {
        let expected = parent.number.checked_add(1);
        if expected != Some(header.number) {
            return Err(ValidationFailure::NumberGap {
                expected: expected.unwrap_or(u64::MAX),
                actual: header.number,
            });
        }
        if header.parent_hash != *parent_hash {
            return Err(ValidationFailure::ParentMismatch {
                expected: *parent_hash,
                actual: header.parent_hash,
            });
        }
        if header.timestamp <= parent.timestamp {
            return Err(ValidationFailure::TimestampNotIncreasing {
                parent: parent.timestamp,
                timestamp: header.timestamp,
            });
        }
        if header.gas_used > header.gas_limit {
            return Err(ValidationFailure::GasUsedExceedsLimit {
                used: header.gas_used,
                limit: header.gas_limit,
            });
        }
        let drift = header.gas_limit.abs_diff(parent.gas_limit);
        if drift > 0 && drift >= parent.gas_limit / GAS_LIMIT_BOUND_DIVISOR {
            return Err(ValidationFailure::GasLimitDrift {
                parent: parent.gas_limit,
                limit: header.gas_limit,
            });
        }
        if header.extra_data.len() > MAX_EXTRA_DATA {
            return Err(ValidationFailure::ExtraDataTooLong {
                len: header.extra_data.len(),
                max: MAX_EXTRA_DATA,
            });
        }
        if header.difficulty == 0 {
            return Err(ValidationFailure::ZeroDifficulty);
        }
        Ok(())
    }

    pub fn check_seal(&self, header: &Header) -> Result<(), ValidationFailure> {
        if header.seal_is_valid() {
            Ok(())
        } else {
            Err(ValidationFailure::InvalidSeal)
        }
    }

    /// Validates `headers` as a continuation of `parent` on the current rayon
    /// pool. Reports the lowest-numbered failing header.
    pub fn validate_chain(&self, parent: &Header, headers: &[Header]) -> Result<(), ChainError> {
        let parent_hash = parent.hash();
        let hashes: Vec<BlockHash> = headers.par_iter().map(Header::hash).collect();
        let len = headers.len();

        let failure = (0..len).into_par_iter().find_map_first(|i| {
            let (prev, prev_hash) = match i {
                0 => (parent, &parent_hash),
                _ => (&headers[i - 1], &hashes[i - 1]),
            };
            let header = &headers[i];
            self.check_structure(prev, prev_hash, header)
                .and_then(|_| {
                    if self.checks_seal(i, len) {
                        self.check_seal(header)
                    } else {
                        Ok(())
                    }
                })
                .err()
                .map(|failure| (header.number, failure))
        });

        match failure {
            Some((number, failure)) => Err(ChainError::Invalid { number, failure }),
            None => Ok(()),
        }
    }
}
