use std::io::{self, Read};

use bytes::Buf;
use bytes::Bytes;
use bytes::buf::Reader;
use flate2::Crc;
use flate2::read::DeflateDecoder;

enum Body {
    Stored(Reader<Bytes>),
    Deflate(DeflateDecoder<Reader<Bytes>>),
}

/// Readable contents of one archive entry.
///
/// Decompresses on the fly and checks the uncompressed size and CRC-32
/// recorded in the central directory once the data is exhausted; a mismatch
/// surfaces as an `InvalidData` read error.
pub struct EntryStream {
    body: Body,
    crc: Crc,
    expected_crc: u32,
    expected_size: u64,
}

impl EntryStream {
    pub(crate) fn stored(data: Bytes, expected_crc: u32, expected_size: u64) -> Self {
        Self::with_body(Body::Stored(data.reader()), expected_crc, expected_size)
    }

    pub(crate) fn deflate(data: Bytes, expected_crc: u32, expected_size: u64) -> Self {
        Self::with_body(
            Body::Deflate(DeflateDecoder::new(data.reader())),
            expected_crc,
            expected_size,
        )
    }

    fn with_body(body: Body, expected_crc: u32, expected_size: u64) -> Self {
        Self {
            body,
            crc: Crc::new(),
            expected_crc,
            expected_size,
        }
    }

    fn verify(&self) -> io::Result<()> {
        if self.crc.amount() as u64 != self.expected_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "zip: entry size mismatch (expected {} bytes, got {})",
                    self.expected_size,
                    self.crc.amount()
                ),
            ));
        }
        if self.crc.sum() != self.expected_crc {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "zip: checksum error"));
        }
        Ok(())
    }
}

impl Read for EntryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &mut self.body {
            Body::Stored(reader) => reader.read(buf)?,
            Body::Deflate(reader) => reader.read(buf)?,
        };

        if n == 0 && !buf.is_empty() {
            self.verify()?;
        } else {
            self.crc.update(&buf[..n]);
        }
        Ok(n)
    }
}
