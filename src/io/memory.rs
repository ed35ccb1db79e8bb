use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;

use super::ReadAt;

/// An uploaded file held entirely in memory.
///
/// Cloning is cheap: the bytes are reference counted, so entry streams can
/// hold slices of the upload without copying it.
#[derive(Debug, Clone)]
pub struct UploadBuffer {
    data: Bytes,
}

impl UploadBuffer {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    /// Borrow `len` bytes starting at `offset` without copying.
    pub fn slice(&self, offset: u64, len: u64) -> Result<Bytes> {
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= self.size());
        match end {
            Some(end) => Ok(self.data.slice(offset as usize..end as usize)),
            None => bail!(
                "Range {}+{} lies outside the {} byte upload",
                offset,
                len,
                self.data.len()
            ),
        }
    }
}

#[async_trait]
impl ReadAt for UploadBuffer {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if offset >= self.size() {
            return Ok(0);
        }

        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
