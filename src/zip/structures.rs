use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use anyhow::{Result, bail};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    /// Map the method field of a file header to a known method
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }
}

/// Host system recorded in the upper byte of "version made by".
///
/// Only the hosts whose external attributes we know how to read get a
/// variant of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSystem {
    MsDos,
    Unix,
    Ntfs,
    Vfat,
    MacOsX,
    Other(u8),
}

impl HostSystem {
    /// Decode the host from the "version made by" field.
    ///
    /// # Arguments
    ///
    /// * `version_made_by` - Raw field; the upper byte names the host, the
    ///   lower byte the APPNOTE version
    pub fn from_version_made_by(version_made_by: u16) -> Self {
        match (version_made_by >> 8) as u8 {
            0 => HostSystem::MsDos,
            3 => HostSystem::Unix,
            10 => HostSystem::Ntfs,
            14 => HostSystem::Vfat,
            19 => HostSystem::MacOsX,
            other => HostSystem::Other(other),
        }
    }
}

/// MS-DOS directory attribute bit.
const DOS_DIRECTORY: u32 = 0x10;
/// `S_IFMT` / `S_IFDIR` from the Unix mode kept in the high attribute word.
const UNIX_FILE_TYPE_MASK: u32 = 0o170000;
const UNIX_DIRECTORY: u32 = 0o040000;

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Parse an EOCD record from raw bytes.
    ///
    /// # Arguments
    ///
    /// * `data` - Bytes starting at the record signature
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is too short or the signature is wrong.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("zip: not a valid zip file");
        }

        // Fixed-size fields follow the 4-byte signature
        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// Whether any field is saturated, hinting at ZIP64 values elsewhere.
    ///
    /// A hint only: the ZIP64 locator has to be present as well.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
pub struct Zip64EOCDLocator {
    pub disk_with_eocd64: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64EOCDLocator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    /// Parse a ZIP64 EOCD locator from raw bytes.
    ///
    /// # Arguments
    ///
    /// * `data` - Bytes starting at the record signature
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is too short or the signature is wrong.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("zip: invalid zip64 end of central directory locator");
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_with_eocd64: cursor.read_u32::<LittleEndian>()?,
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
            total_disks: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
pub struct Zip64EOCD {
    pub eocd64_size: u64,
    pub version_made_by: u16,
    pub version_needed: u16,
    pub disk_number: u32,
    pub disk_with_cd: u32,
    pub disk_entries: u64,
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EOCD {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    /// Parse a ZIP64 EOCD record from raw bytes.
    ///
    /// # Arguments
    ///
    /// * `data` - Bytes starting at the record signature
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is too short or the signature is wrong.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("zip: invalid zip64 end of central directory");
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            eocd64_size: cursor.read_u64::<LittleEndian>()?,
            version_made_by: cursor.read_u16::<LittleEndian>()?,
            version_needed: cursor.read_u16::<LittleEndian>()?,
            disk_number: cursor.read_u32::<LittleEndian>()?,
            disk_with_cd: cursor.read_u32::<LittleEndian>()?,
            disk_entries: cursor.read_u64::<LittleEndian>()?,
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// General purpose flag bit marking an encrypted entry
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// One record of the central directory.
///
/// Entries are views: they describe where an entry lives in the upload but
/// hold none of its data.
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub lfh_offset: u64,
    pub flags: u16,
    pub host_system: HostSystem,
    pub external_attrs: u32,
    pub is_directory: bool,
}

impl ZipFileEntry {
    /// Whether general purpose bit 0 marks the entry as encrypted
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

/// Decide whether a central directory record describes a directory.
///
/// The host's attribute word is authoritative when we understand it; the
/// trailing `/` that APPNOTE requires of directory names covers the rest.
///
/// # Arguments
///
/// * `host` - Host system that wrote the record
/// * `external_attrs` - The record's external file attributes
/// * `file_name` - The record's name
///
/// # Returns
///
/// `true` if either the attributes or the name mark a directory.
pub fn is_directory_record(host: HostSystem, external_attrs: u32, file_name: &str) -> bool {
    let from_attrs = match host {
        HostSystem::Unix | HostSystem::MacOsX => {
            (external_attrs >> 16) & UNIX_FILE_TYPE_MASK == UNIX_DIRECTORY
        }
        HostSystem::MsDos | HostSystem::Ntfs | HostSystem::Vfat => {
            external_attrs & DOS_DIRECTORY != 0
        }
        HostSystem::Other(_) => false,
    };

    from_attrs || file_name.ends_with('/')
}
