use crate::{archive::Retriever, error::ArchiveError};
use async_trait::async_trait;
use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt},
    sync::Mutex,
};
use tracing::info;

const INDEX_ENTRY_LEN: u64 = 8;
const INDEX_EXT: &str = "ridx";
const DATA_EXT: &str = "rdat";

fn table_paths(dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{name}.{INDEX_EXT}")),
        dir.join(format!("{name}.{DATA_EXT}")),
    )
}

/// Append-only table of variable-length items.
///
/// The index file holds one little-endian `u64` per item: the end offset of
/// that item in the data file. Item `i` spans `[end(i - 1), end(i))`, with
/// `end(-1) = 0`.
pub struct FreezerTable {
    name: String,
    index: Mutex<File>,
    data: Mutex<File>,
    items: u64,
    data_len: u64,
}

impl FreezerTable {
    pub async fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, ArchiveError> {
        let (index_path, data_path) = table_paths(dir.as_ref(), name);

        let index = File::open(&index_path)
            .await
            .map_err(|source| ArchiveError::Open {
                path: index_path.clone(),
                source,
            })?;
        let data = File::open(&data_path)
            .await
            .map_err(|source| ArchiveError::Open {
                path: data_path.clone(),
                source,
            })?;
        let data_len = data
            .metadata()
            .await
            .map_err(|source| ArchiveError::Open {
                path: data_path,
                source,
            })?
            .len();

        let index_len = index
            .metadata()
            .await
            .map_err(|source| ArchiveError::Open {
                path: index_path,
                source,
            })?
            .len();
        if index_len % INDEX_ENTRY_LEN != 0 {
            return Err(ArchiveError::CorruptIndex {
                table: name.to_string(),
                reason: format!("index length {index_len} is not a multiple of {INDEX_ENTRY_LEN}"),
            });
        }

        let items = index_len / INDEX_ENTRY_LEN;
        info!(table = name, items, bytes = data_len, "Opened freezer table");

        Ok(Self {
            name: name.to_string(),
            index: Mutex::new(index),
            data: Mutex::new(data),
            items,
            data_len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> u64 {
        self.items
    }

    fn read_error(&self, index: u64) -> impl FnOnce(std::io::Error) -> ArchiveError + '_ {
        move |source| ArchiveError::Read {
            table: self.name.clone(),
            index,
            source,
        }
    }

    /// Byte span of `index` in the data file.
    async fn span(&self, index: u64) -> Result<(u64, u64), ArchiveError> {
        let mut file = self.index.lock().await;

        let (start, end) = if index == 0 {
            file.seek(std::io::SeekFrom::Start(0))
                .await
                .map_err(self.read_error(index))?;
            (0, file.read_u64_le().await.map_err(self.read_error(index))?)
        } else {
            file.seek(std::io::SeekFrom::Start((index - 1) * INDEX_ENTRY_LEN))
                .await
                .map_err(self.read_error(index))?;
            let start = file.read_u64_le().await.map_err(self.read_error(index))?;
            let end = file.read_u64_le().await.map_err(self.read_error(index))?;
            (start, end)
        };

        if end < start {
            return Err(ArchiveError::CorruptIndex {
                table: self.name.clone(),
                reason: format!("item {index} ends at {end} before it starts at {start}"),
            });
        }
        if end > self.data_len {
            return Err(ArchiveError::CorruptIndex {
                table: self.name.clone(),
                reason: format!(
                    "item {index} ends at {end} past the data file length {}",
                    self.data_len
                ),
            });
        }
        Ok((start, end))
    }
}

#[async_trait]
impl Retriever for FreezerTable {
    async fn retrieve(&self, index: u64) -> Result<Vec<u8>, ArchiveError> {
        if index >= self.items {
            return Err(ArchiveError::OutOfBounds {
                table: self.name.clone(),
                index,
                items: self.items,
            });
        }

        let (start, end) = self.span(index).await?;
        let mut buf = vec![0u8; (end - start) as usize];

        let mut data = self.data.lock().await;
        data.seek(std::io::SeekFrom::Start(start))
            .await
            .map_err(self.read_error(index))?;
        data.read_exact(&mut buf)
            .await
            .map_err(self.read_error(index))?;

        Ok(buf)
    }
}

/// Builds a new freezer table, truncating any existing one.
pub struct FreezerWriter {
    name: String,
    index: BufWriter<fs::File>,
    data: BufWriter<fs::File>,
    offset: u64,
    items: u64,
}

impl FreezerWriter {
    pub fn create(dir: impl AsRef<Path>, name: &str) -> Result<Self, ArchiveError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ArchiveError::Open {
            path: dir.to_path_buf(),
            source,
        })?;

        let (index_path, data_path) = table_paths(dir, name);
        let index = fs::File::create(&index_path).map_err(|source| ArchiveError::Open {
            path: index_path,
            source,
        })?;
        let data = fs::File::create(&data_path).map_err(|source| ArchiveError::Open {
            path: data_path,
            source,
        })?;

        Ok(Self {
            name: name.to_string(),
            index: BufWriter::new(index),
            data: BufWriter::new(data),
            offset: 0,
            items: 0,
        })
    }

    /// Appends one item and returns its index.
    pub fn append(&mut self, item: &[u8]) -> Result<u64, ArchiveError> {
        self.data.write_all(item).map_err(|e| self.write_error(e))?;
        self.offset += item.len() as u64;
        self.index
            .write_all(&self.offset.to_le_bytes())
            .map_err(|e| self.write_error(e))?;

        self.items += 1;
        Ok(self.items - 1)
    }

    pub fn items(&self) -> u64 {
        self.items
    }

    /// Flushes and syncs both files.
    pub fn finish(mut self) -> Result<u64, ArchiveError> {
        self.data.flush().map_err(|e| self.write_error(e))?;
        self.index.flush().map_err(|e| self.write_error(e))?;
        self.data
            .get_ref()
            .sync_all()
            .map_err(|e| self.write_error(e))?;
        self.index
            .get_ref()
            .sync_all()
            .map_err(|e| self.write_error(e))?;
        Ok(self.items)
    }

    fn write_error(&self, source: std::io::Error) -> ArchiveError {
        ArchiveError::Write {
            table: self.name.clone(),
            source,
        }
    }
}
