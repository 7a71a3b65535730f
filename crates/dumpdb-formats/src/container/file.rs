//! Open container handle with an in-memory key directory

use crate::container::error::{ContainerError, ContainerResult};
use crate::container::header::{ENTRY_HEADER_SIZE, EntryHeader, FILE_HEADER_SIZE, FileHeader};
use crate::container::payload::{compress, decode_table, decompress, encode_table};
use crate::table::Table;
use binrw::{BinReaderExt, BinWriterExt};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Default zlib level for new entries
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// How a container file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Read-only. The file must exist.
    Read,
    /// Read and append. The file is created if absent.
    Append,
}

impl AccessMode {
    /// Check if this mode allows writes
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Append)
    }
}

/// Location of one entry's payload inside the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLocation {
    /// Offset of the stored payload
    pub offset: u64,
    /// Stored (compressed) payload length
    pub stored_len: u32,
    /// Raw payload length
    pub raw_len: u32,
    /// MD5 of the stored payload
    pub checksum: [u8; 16],
}

/// An open dump container
///
/// Opening reads the file header and every entry header, skipping the
/// payloads, so listing keys never touches row data. When the same key
/// appears more than once the later record wins.
///
/// The file handle is released when the value is dropped.
#[derive(Debug)]
pub struct DumpFile {
    path: PathBuf,
    file: File,
    mode: AccessMode,
    entries: BTreeMap<String, EntryLocation>,
    end: u64,
    compression_level: u32,
    sync_writes: bool,
}

impl DumpFile {
    /// Open a container
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> ContainerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match mode {
            AccessMode::Read => File::open(&path)?,
            AccessMode::Append => OpenOptions::new()
                .read(true)
                .append(true)
                .create(true)
                .open(&path)?,
        };

        let mut container = Self {
            path,
            file,
            mode,
            entries: BTreeMap::new(),
            end: 0,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            sync_writes: true,
        };

        let len = container.file.metadata()?.len();
        if len == 0 && mode.can_write() {
            let mut header = Cursor::new(Vec::new());
            header.write_le(&FileHeader::new())?;
            container.file.write_all(header.get_ref())?;
            container.end = FILE_HEADER_SIZE;
        } else {
            container.scan(len)?;
        }

        Ok(container)
    }

    fn scan(&mut self, len: u64) -> ContainerResult<()> {
        if len < FILE_HEADER_SIZE {
            return Err(ContainerError::Truncated { offset: 0 });
        }

        let mut reader = BufReader::new(&self.file);
        reader.seek(SeekFrom::Start(0))?;
        let header: FileHeader = reader.read_le()?;
        header.validate()?;

        let mut pos = FILE_HEADER_SIZE;
        while pos < len {
            if len - pos < ENTRY_HEADER_SIZE {
                return Err(ContainerError::Truncated { offset: pos });
            }
            let entry: EntryHeader = reader.read_le()?;
            entry.validate(pos)?;

            if len - pos - ENTRY_HEADER_SIZE < entry.body_len() {
                return Err(ContainerError::Truncated { offset: pos });
            }

            let mut key = vec![0u8; usize::from(entry.key_len)];
            reader.read_exact(&mut key)?;
            let key = String::from_utf8(key)
                .map_err(|e| ContainerError::InvalidKey(format!("at offset {pos}: {e}")))?;
            reader.seek_relative(i64::from(entry.stored_len))?;

            let offset = pos + ENTRY_HEADER_SIZE + u64::from(entry.key_len);
            self.entries.insert(
                key,
                EntryLocation {
                    offset,
                    stored_len: entry.stored_len,
                    raw_len: entry.raw_len,
                    checksum: entry.checksum,
                },
            );
            pos = offset + u64::from(entry.stored_len);
        }

        self.end = pos;
        Ok(())
    }

    /// Set the zlib level (0-9) used by later writes
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = level.min(9);
    }

    /// Choose whether each write is synced to disk
    pub fn set_sync_writes(&mut self, sync: bool) {
        self.sync_writes = sync;
    }

    /// Store a table under `key`, replacing any earlier entry with that key
    pub fn put(&mut self, key: &str, table: &Table) -> ContainerResult<()> {
        if !self.mode.can_write() {
            return Err(ContainerError::ReadOnly);
        }
        if key.is_empty() {
            return Err(ContainerError::InvalidKey("empty key".to_string()));
        }
        let key_len = u16::try_from(key.len())
            .map_err(|_| ContainerError::InvalidKey(format!("{} bytes", key.len())))?;

        let raw = encode_table(table)?;
        let stored = compress(&raw, self.compression_level)?;
        let too_large = |size| ContainerError::EntryTooLarge {
            key: key.to_string(),
            size,
        };
        let raw_len = u32::try_from(raw.len()).map_err(|_| too_large(raw.len()))?;
        let stored_len = u32::try_from(stored.len()).map_err(|_| too_large(stored.len()))?;
        let checksum = md5::compute(&stored).0;

        let mut record = Cursor::new(Vec::with_capacity(
            ENTRY_HEADER_SIZE as usize + key.len() + stored.len(),
        ));
        record.write_le(&EntryHeader::new(key_len, stored_len, raw_len, checksum))?;
        record.write_all(key.as_bytes())?;
        record.write_all(&stored)?;
        let record = record.into_inner();

        self.file.write_all(&record)?;
        if self.sync_writes {
            self.file.sync_data()?;
        }

        let offset = self.end + ENTRY_HEADER_SIZE + u64::from(key_len);
        self.entries.insert(
            key.to_string(),
            EntryLocation {
                offset,
                stored_len,
                raw_len,
                checksum,
            },
        );
        self.end += record.len() as u64;
        Ok(())
    }

    /// Load the table stored under `key`
    pub fn get(&self, key: &str) -> ContainerResult<Table> {
        let location = self
            .entries
            .get(key)
            .ok_or_else(|| ContainerError::KeyNotFound(key.to_string()))?;

        let mut stored = vec![0u8; location.stored_len as usize];
        let mut file = &self.file;
        file.seek(SeekFrom::Start(location.offset))?;
        file.read_exact(&mut stored)?;

        let actual = md5::compute(&stored).0;
        if actual != location.checksum {
            return Err(ContainerError::ChecksumMismatch {
                key: key.to_string(),
                expected: hex::encode(location.checksum),
                actual: hex::encode(actual),
            });
        }

        let raw = decompress(&stored, location.raw_len as usize)?;
        decode_table(&raw)
    }

    /// Stored keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Greatest stored key
    pub fn last_key(&self) -> Option<&str> {
        self.entries.keys().next_back().map(String::as_str)
    }

    /// Location of an entry, if stored
    pub fn location(&self, key: &str) -> Option<&EntryLocation> {
        self.entries.get(key)
    }

    /// Check if an entry exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the container holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the container in bytes
    pub fn size(&self) -> u64 {
        self.end
    }

    /// Path the container was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the container was opened with
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Flush and release the file
    pub fn close(self) -> ContainerResult<()> {
        if self.mode.can_write() {
            self.file.sync_all()?;
        }
        Ok(())
    }
}
