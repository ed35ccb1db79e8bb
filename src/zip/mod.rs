//! ZIP archive parsing for uploaded replay bundles.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from any [`ReadAt`](crate::io::ReadAt) source
//! - [`archive`]: An archive over an in-memory upload, handing out entry streams
//! - [`stream`]: Decompressing, checksum-verifying reader for one entry
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The EOCD is read first, then the Central Directory. Listing an archive
//! never reads entry data.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions
//! - STORED and DEFLATE entries, CRC-32 verified
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod archive;
mod parser;
mod stream;
mod structures;

#[cfg(test)]
pub(crate) mod testing;

pub use archive::ZipArchive;
pub use parser::ZipParser;
pub use stream::EntryStream;
pub use structures::*;
