use std::sync::Arc;

use anyhow::{Result, bail};

use crate::io::UploadBuffer;

use super::parser::ZipParser;
use super::stream::EntryStream;
use super::structures::{CompressionMethod, ZipFileEntry};

/// A zip archive held in an upload buffer.
///
/// Opening the archive parses its central directory once; entry data is only
/// touched when an entry is opened.
pub struct ZipArchive {
    parser: ZipParser<UploadBuffer>,
    entries: Vec<ZipFileEntry>,
}

impl ZipArchive {
    /// Parse the central directory of an uploaded archive.
    ///
    /// # Arguments
    ///
    /// * `upload` - The buffered upload; the archive takes ownership
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is not a readable ZIP archive.
    pub async fn open(upload: UploadBuffer) -> Result<Self> {
        let parser = ZipParser::new(Arc::new(upload));
        let entries = parser.list_files().await?;
        Ok(Self { parser, entries })
    }

    /// All central directory records, directories included, in directory order
    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    /// Entries that carry file data, in directory order
    pub fn files(&self) -> impl Iterator<Item = &ZipFileEntry> {
        self.entries.iter().filter(|e| !e.is_directory)
    }

    /// Open one entry for reading.
    ///
    /// Reads the entry's Local File Header to locate its data and wraps that
    /// data in a decompressing, checksum-verifying stream.
    ///
    /// # Arguments
    ///
    /// * `entry` - A record from [`entries()`](Self::entries)
    ///
    /// # Returns
    ///
    /// An [`EntryStream`] borrowing a slice of the upload, not a copy.
    ///
    /// # Errors
    ///
    /// Returns an error for directories, encrypted entries, unsupported
    /// compression methods, and headers or data outside the upload.
    pub async fn open_entry(&self, entry: &ZipFileEntry) -> Result<EntryStream> {
        if entry.is_directory {
            bail!("zip: {} is a directory", entry.file_name);
        }
        if entry.is_encrypted() {
            bail!("zip: encrypted entries are not supported");
        }

        // Locate the data through the Local File Header, then slice it out
        let data_offset = self.parser.get_data_offset(entry).await?;
        let data = self
            .parser
            .reader()
            .slice(data_offset, entry.compressed_size)?;

        match entry.compression_method {
            CompressionMethod::Stored => Ok(EntryStream::stored(
                data,
                entry.crc32,
                entry.uncompressed_size,
            )),
            CompressionMethod::Deflate => Ok(EntryStream::deflate(
                data,
                entry.crc32,
                entry.uncompressed_size,
            )),
            CompressionMethod::Unknown(method) => {
                bail!("zip: unsupported compression algorithm {}", method)
            }
        }
    }
}
