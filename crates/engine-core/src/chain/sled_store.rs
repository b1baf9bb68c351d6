use crate::{
    chain::{ChainStore, rules::HeaderRules},
    error::ChainError,
};
use async_trait::async_trait;
use model::{
    core::hash::BlockHash,
    records::{batch::HeaderBatch, header::Header},
};
use std::{num::NonZeroUsize, path::Path, sync::Arc};
use tracing::{debug, info};

const HEADER_PREFIX: &[u8] = b"h:";
const HASH_PREFIX: &[u8] = b"n:";
const HEAD_KEY: &[u8] = b"head";

/// How the store validates incoming batches.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorConfig {
    /// Worker threads used to check the headers of one batch.
    pub concurrency: NonZeroUsize,
    pub rules: HeaderRules,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
            rules: HeaderRules::default(),
        }
    }
}

/// Header chain persisted in sled.
///
/// Layout: `h:<number BE>` → header, `n:<hash>` → number, `head` → number
/// of the highest committed header.
pub struct SledChainStore {
    db: sled::Db,
    rules: HeaderRules,
    pool: Arc<rayon::ThreadPool>,
}

impl SledChainStore {
    pub fn open(path: impl AsRef<Path>, config: ValidatorConfig) -> Result<Self, ChainError> {
        let db = sled::open(path.as_ref())?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.concurrency.get())
            .thread_name(|i| format!("header-validate-{i}"))
            .build()
            .map_err(|e| ChainError::WorkerPool(e.to_string()))?;

        info!(
            path = %path.as_ref().display(),
            workers = config.concurrency.get(),
            "Opened chain store"
        );

        Ok(Self {
            db,
            rules: config.rules,
            pool: Arc::new(pool),
        })
    }

    #[inline]
    fn header_key(number: u64) -> Vec<u8> {
        [HEADER_PREFIX, &number.to_be_bytes()].concat()
    }

    #[inline]
    fn hash_key(hash: &BlockHash) -> Vec<u8> {
        [HASH_PREFIX, hash.as_bytes()].concat()
    }

    fn decode_number(bytes: &[u8]) -> Result<u64, ChainError> {
        let raw: [u8; 8] = bytes.try_into().map_err(|_| {
            ChainError::Encoding(Box::new(bincode::ErrorKind::Custom(format!(
                "expected 8-byte block number, found {} bytes",
                bytes.len()
            ))))
        })?;
        Ok(u64::from_be_bytes(raw))
    }

    fn head_number(&self) -> Result<Option<u64>, ChainError> {
        self.db
            .get(HEAD_KEY)?
            .map(|bytes| Self::decode_number(&bytes))
            .transpose()
    }

    fn read_header(&self, number: u64) -> Result<Option<Header>, ChainError> {
        match self.db.get(Self::header_key(number))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn stage(batch: &mut sled::Batch, header: &Header) -> Result<(), ChainError> {
        batch.insert(Self::header_key(header.number), bincode::serialize(header)?);
        batch.insert(
            Self::hash_key(&header.hash()),
            header.number.to_be_bytes().to_vec(),
        );
        Ok(())
    }

    pub fn number_by_hash(&self, hash: &BlockHash) -> Result<Option<u64>, ChainError> {
        self.db
            .get(Self::hash_key(hash))?
            .map(|bytes| Self::decode_number(&bytes))
            .transpose()
    }
}

#[async_trait]
impl ChainStore for SledChainStore {
    async fn init_genesis(&self, genesis: &Header) -> Result<(), ChainError> {
        if let Some(stored) = self.read_header(0)? {
            if stored.hash() != genesis.hash() {
                return Err(ChainError::GenesisMismatch {
                    stored: stored.hash(),
                    expected: genesis.hash(),
                });
            }
            debug!(hash = %stored.hash(), "Genesis already present");
            return Ok(());
        }

        let mut batch = sled::Batch::default();
        Self::stage(&mut batch, genesis)?;
        batch.insert(HEAD_KEY, genesis.number.to_be_bytes().to_vec());
        self.db.apply_batch(batch)?;
        self.db.flush_async().await?;

        info!(hash = %genesis.hash(), "Wrote genesis header");
        Ok(())
    }

    async fn head(&self) -> Result<Option<Header>, ChainError> {
        match self.head_number()? {
            Some(number) => self.read_header(number),
            None => Ok(None),
        }
    }

    async fn header_by_number(&self, number: u64) -> Result<Option<Header>, ChainError> {
        self.read_header(number)
    }

    async fn validate_batch(&self, batch: &HeaderBatch) -> Result<(), ChainError> {
        if batch.is_empty() {
            return Ok(());
        }
        let parent = self.head().await?.ok_or(ChainError::MissingGenesis)?;

        let headers = batch.headers.clone();
        let pool = self.pool.clone();
        let rules = self.rules;

        tokio::task::spawn_blocking(move || pool.install(|| rules.validate_chain(&parent, &headers)))
            .await
            .map_err(|e| ChainError::WorkerPool(e.to_string()))?
    }

    async fn insert_batch(&self, batch: &HeaderBatch) -> Result<u64, ChainError> {
        let head = self.head().await?.ok_or(ChainError::MissingGenesis)?;
        let (Some(first), Some(last)) = (batch.first_header(), batch.last_header()) else {
            return Ok(head.number);
        };

        if head.number.checked_add(1) != Some(first.number) || first.parent_hash != head.hash() {
            return Err(ChainError::NotContiguous {
                head: head.number,
                first: first.number,
            });
        }

        let mut tx = sled::Batch::default();
        for header in batch.headers.iter() {
            Self::stage(&mut tx, header)?;
        }
        tx.insert(HEAD_KEY, last.number.to_be_bytes().to_vec());
        self.db.apply_batch(tx)?;

        Ok(last.number)
    }

    async fn flush(&self) -> Result<(), ChainError> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::records::synthetic::SyntheticChain;
    use tempfile::tempdir;

    fn open(dir: &Path) -> SledChainStore {
        let config = ValidatorConfig {
            concurrency: NonZeroUsize::new(2).unwrap(),
            rules: HeaderRules::default(),
        };
        SledChainStore::open(dir, config).unwrap()
    }

    #[tokio::test]
    async fn genesis_initialisation_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());

        assert!(store.head().await.unwrap().is_none());
        store.init_genesis(&Header::genesis()).await.unwrap();
        store.init_genesis(&Header::genesis()).await.unwrap();

        let head = store.head().await.unwrap().unwrap();
        assert_eq!(head, Header::genesis());
        assert_eq!(store.number_by_hash(&head.hash()).unwrap(), Some(0));
    }

    #[tokio::test]
    async fn rejects_a_different_genesis() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        store.init_genesis(&Header::genesis()).await.unwrap();

        let other = Header {
            extra_data: b"another network".to_vec(),
            ..Header::genesis()
        };
        let err = store.init_genesis(&other).await.unwrap_err();
        assert!(matches!(err, ChainError::GenesisMismatch { .. }));
    }

    #[tokio::test]
    async fn validate_and_insert_consecutive_batches() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        store.init_genesis(&Header::genesis()).await.unwrap();

        let headers = SyntheticChain::from_genesis().generate(20);
        let first = HeaderBatch::new(1, headers[..12].to_vec());
        let second = HeaderBatch::new(13, headers[12..].to_vec());

        store.validate_batch(&first).await.unwrap();
        assert_eq!(store.insert_batch(&first).await.unwrap(), 12);
        store.validate_batch(&second).await.unwrap();
        assert_eq!(store.insert_batch(&second).await.unwrap(), 20);

        assert_eq!(store.head().await.unwrap().unwrap(), headers[19]);
        assert_eq!(store.header_by_number(7).await.unwrap().unwrap(), headers[6]);
        assert_eq!(store.number_by_hash(&headers[10].hash()).unwrap(), Some(11));
    }

    #[tokio::test]
    async fn validation_does_not_write() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        store.init_genesis(&Header::genesis()).await.unwrap();

        let batch = HeaderBatch::new(1, SyntheticChain::from_genesis().generate(5));
        store.validate_batch(&batch).await.unwrap();

        assert_eq!(store.head().await.unwrap().unwrap().number, 0);
        assert!(store.header_by_number(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn validation_requires_genesis() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        let batch = HeaderBatch::new(1, SyntheticChain::from_genesis().generate(1));
        let err = store.validate_batch(&batch).await.unwrap_err();
        assert!(matches!(err, ChainError::MissingGenesis));
    }

    #[tokio::test]
    async fn insert_refuses_a_gap() {
        let dir = tempdir().unwrap();
        let store = open(dir.path());
        store.init_genesis(&Header::genesis()).await.unwrap();

        let headers = SyntheticChain::from_genesis().generate(10);
        let skipped = HeaderBatch::new(6, headers[5..].to_vec());
        let err = store.insert_batch(&skipped).await.unwrap_err();
        assert!(matches!(err, ChainError::NotContiguous { head: 0, first: 6 }));
        assert!(store.header_by_number(6).await.unwrap().is_none());
    }
}
