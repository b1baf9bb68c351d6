use crate::records::header::Header;
use std::sync::Arc;

/// Ordered run of consecutive headers handed from the reader to the writer.
///
/// The slice is immutable once built, so the writer may share it with its
/// validation workers without copying.
#[derive(Debug, Clone)]
pub struct HeaderBatch {
    /// Archive index of the first header.
    pub first: u64,
    pub headers: Arc<[Header]>,
}

impl HeaderBatch {
    pub fn new(first: u64, headers: Vec<Header>) -> Self {
        Self {
            first,
            headers: headers.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Archive index one past the last header.
    pub fn end(&self) -> u64 {
        self.first + self.headers.len() as u64
    }

    pub fn first_header(&self) -> Option<&Header> {
        self.headers.first()
    }

    pub fn last_header(&self) -> Option<&Header> {
        self.headers.last()
    }
}
