//! File and entry headers of the dump container
//!
//! Layout (all multi-byte fields little-endian):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00   | 4    | Magic `DDMP` |
//! | 0x04   | 1    | Format version |
//! | 0x05   | 1    | Flags |
//! | 0x06   | 2    | Reserved |
//!
//! Each entry record then starts with a 28-byte header:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00   | 2    | Magic `EN` |
//! | 0x02   | 2    | Key length |
//! | 0x04   | 4    | Stored (compressed) payload length |
//! | 0x08   | 4    | Raw payload length |
//! | 0x0C   | 16   | MD5 of the stored payload |
//!
//! followed by the key bytes and the stored payload.

use crate::container::error::{ContainerError, ContainerResult};
use binrw::{BinRead, BinWrite};

/// Container file magic
pub const FILE_MAGIC: [u8; 4] = *b"DDMP";

/// Entry record magic
pub const ENTRY_MAGIC: [u8; 2] = *b"EN";

/// Current container format version
pub const FORMAT_VERSION: u8 = 1;

/// Size of the file header in bytes
pub const FILE_HEADER_SIZE: u64 = 8;

/// Size of an entry header in bytes
pub const ENTRY_HEADER_SIZE: u64 = 28;

/// Container file header
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct FileHeader {
    /// Magic signature, always "DDMP"
    pub magic: [u8; 4],
    /// Format version
    pub version: u8,
    /// Reserved flags, zero
    pub flags: u8,
    /// Reserved, zero
    pub reserved: u16,
}

impl FileHeader {
    /// Header for a new container
    pub fn new() -> Self {
        Self {
            magic: FILE_MAGIC,
            version: FORMAT_VERSION,
            flags: 0,
            reserved: 0,
        }
    }

    /// Validate magic and version
    pub fn validate(&self) -> ContainerResult<()> {
        if self.magic != FILE_MAGIC {
            return Err(ContainerError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(ContainerError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Header preceding each entry record
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct EntryHeader {
    /// Magic signature, always "EN"
    pub magic: [u8; 2],
    /// Length of the UTF-8 key in bytes
    pub key_len: u16,
    /// Length of the stored payload
    pub stored_len: u32,
    /// Length of the payload before compression
    pub raw_len: u32,
    /// MD5 of the stored payload
    pub checksum: [u8; 16],
}

impl EntryHeader {
    /// Create an entry header
    pub fn new(key_len: u16, stored_len: u32, raw_len: u32, checksum: [u8; 16]) -> Self {
        Self {
            magic: ENTRY_MAGIC,
            key_len,
            stored_len,
            raw_len,
            checksum,
        }
    }

    /// Validate the magic; `offset` is only used for the error
    pub fn validate(&self, offset: u64) -> ContainerResult<()> {
        if self.magic != ENTRY_MAGIC {
            return Err(ContainerError::InvalidEntryMagic {
                offset,
                found: self.magic,
            });
        }
        Ok(())
    }

    /// Bytes following this header: key plus payload
    pub fn body_len(&self) -> u64 {
        u64::from(self.key_len) + u64::from(self.stored_len)
    }
}
