use crate::dostime::unix_to_dos;
use crate::error::{ArchiveError, Result};
use crate::platform::modified_secs;
use crate::zip::records::zip_format::{
    CENTRAL_DIR_HEADER_SIZE, END_OF_CENTRAL_DIR_SIZE, LOCAL_DIR_HEADER_SIZE, MAX_ENTRIES, MAX_NAME_LEN,
};
use crate::zip::records::{write_end_of_central_directory, ZipRecord};
use std::fs;
use std::path::Path;

/// In-memory builder for stored (uncompressed) ZIP archives.
///
/// Entries are appended to a single data section; the local header offset of
/// each entry is the length of that section at the moment it was added. The
/// central directory is rendered from the recorded entries on [`file`].
///
/// [`file`]: ZipBuilder::file
#[derive(Debug, Default, Clone)]
pub struct ZipBuilder {
    data: Vec<u8>,
    records: Vec<ZipRecord>,
    central_dir_size: usize,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `data` under `name` with a Unix `timestamp`.
    ///
    /// Backslashes in `name` become forward slashes. Timestamps before 1980
    /// are stored as 1980-01-01 00:00:00.
    ///
    /// Fails with [`ArchiveError::ZipLimit`] when the entry would not fit the
    /// 16/32-bit ZIP fields (no ZIP64): more than 65535 entries, a name over
    /// 65535 bytes, or sizes and offsets past 4 GiB. The builder is left
    /// unchanged in that case.
    pub fn add_file(&mut self, data: &[u8], name: &str, timestamp: i64) -> Result<&mut Self> {
        let name = name.replace('\\', "/");
        let (size, local_header_offset) = self.check_limits(&name, data.len())?;

        let record = ZipRecord {
            crc32: crc32fast::hash(data),
            size,
            dos_datetime: unix_to_dos(timestamp),
            local_header_offset,
            name,
        };

        record.write_local_header(&mut self.data);
        self.data.extend_from_slice(data);
        self.central_dir_size += record.central_record_len();

        log::debug!(
            "zip: added '{}' ({} bytes) at offset {}",
            record.name,
            record.size,
            record.local_header_offset
        );

        self.records.push(record);
        Ok(self)
    }

    /// Stored size and local header offset of a new entry, or the limit it
    /// would break.
    fn check_limits(&self, name: &str, data_len: usize) -> Result<(u32, u32)> {
        let exceeded = |limit| ArchiveError::ZipLimit {
            name: name.to_string(),
            limit,
        };

        if self.records.len() >= MAX_ENTRIES {
            return Err(exceeded("65535 entry"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(exceeded("65535 byte name"));
        }
        let size = u32::try_from(data_len).map_err(|_| exceeded("4 GiB entry size"))?;
        let offset = u32::try_from(self.data.len()).map_err(|_| exceeded("4 GiB archive size"))?;

        // 数据段结尾即中央目录偏移，两者都必须能放进 u32
        let data_end = self.data.len() as u64 + (LOCAL_DIR_HEADER_SIZE + name.len()) as u64 + size as u64;
        let central_end = (self.central_dir_size + CENTRAL_DIR_HEADER_SIZE + name.len()) as u64;
        if data_end > u32::MAX as u64 || central_end > u32::MAX as u64 {
            return Err(exceeded("4 GiB archive size"));
        }

        Ok((size, offset))
    }

    /// Read `path` from disk and add it as `name` (or its file name when
    /// `name` is `None`), keeping the file's modification time.
    pub fn add_path(&mut self, path: impl AsRef<Path>, name: Option<&str>) -> Result<&mut Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(if path.exists() {
                ArchiveError::NotAFile { path: path.to_path_buf() }
            } else {
                ArchiveError::NotFound { path: path.to_path_buf() }
            });
        }

        let data = fs::read(path).map_err(|e| ArchiveError::file_read(path, e))?;
        let mtime = modified_secs(path).map_err(|e| ArchiveError::file_read(path, e))?;

        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
        };

        self.add_file(&data, &name, mtime)
    }

    /// Serialize the archive: data section, central directory, EOCD.
    ///
    /// Does not consume or modify the builder.
    pub fn file(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() + self.central_dir_size + END_OF_CENTRAL_DIR_SIZE);
        out.extend_from_slice(&self.data);
        for record in &self.records {
            record.write_central_record(&mut out);
        }

        // add_file 保证三者都在范围内
        write_end_of_central_directory(
            &mut out,
            u16::try_from(self.records.len()).unwrap_or(u16::MAX),
            u32::try_from(self.central_dir_size).unwrap_or(u32::MAX),
            u32::try_from(self.data.len()).unwrap_or(u32::MAX),
        );

        out
    }

    /// Write the serialized archive to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.file()).map_err(|e| ArchiveError::file_write(path, e))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Entries added so far, in insertion order.
    pub fn records(&self) -> &[ZipRecord] {
        &self.records
    }

    /// Current length of the data section, i.e. the offset the next entry
    /// will be written at.
    pub fn offset(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::records::zip_format::*;

    #[test]
    fn test_empty_archive_is_bare_eocd() {
        let out = ZipBuilder::new().file();
        assert_eq!(out.len(), END_OF_CENTRAL_DIR_SIZE);
        assert_eq!(&out[0..4], b"PK\x05\x06");
        assert!(out[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_offsets_accumulate() {
        let mut zip = ZipBuilder::new();
        zip.add_file(b"one", "a", 0).unwrap().add_file(b"three", "bb", 0).unwrap();

        let records = zip.records();
        assert_eq!(records[0].local_header_offset, 0);
        assert_eq!(records[1].local_header_offset as usize, LOCAL_DIR_HEADER_SIZE + 1 + 3);
        assert_eq!(zip.offset(), 2 * LOCAL_DIR_HEADER_SIZE + 1 + 3 + 2 + 5);
    }

    #[test]
    fn test_backslashes_normalized() {
        let mut zip = ZipBuilder::new();
        zip.add_file(b"x", "a\\b\\c.txt", 0).unwrap();
        assert_eq!(zip.records()[0].name, "a/b/c.txt");
    }

    #[test]
    fn test_crc_recorded() {
        let mut zip = ZipBuilder::new();
        zip.add_file(b"hello world", "h.txt", 0).unwrap();
        assert_eq!(zip.records()[0].crc32, 0x0d4a1185);
    }

    #[test]
    fn test_file_is_idempotent() {
        let mut zip = ZipBuilder::new();
        zip.add_file(b"abc", "f", 1_000_000_000).unwrap();
        let first = zip.file();
        let second = zip.file();
        assert_eq!(first, second);
        assert_eq!(zip.len(), 1);
    }

    #[test]
    fn test_zero_length_entry() {
        let mut zip = ZipBuilder::new();
        zip.add_file(b"", "empty", 0).unwrap();
        let out = zip.file();

        assert_eq!(zip.records()[0].size, 0);
        assert_eq!(zip.records()[0].crc32, 0);
        assert_eq!(
            out.len(),
            LOCAL_DIR_HEADER_SIZE + 5 + CENTRAL_DIR_HEADER_SIZE + 5 + END_OF_CENTRAL_DIR_SIZE
        );
    }

    #[test]
    fn test_name_length_limit() {
        let mut zip = ZipBuilder::new();
        zip.add_file(b"", &"n".repeat(MAX_NAME_LEN), 0).unwrap();

        let err = zip.add_file(b"x", &"n".repeat(MAX_NAME_LEN + 1), 0).unwrap_err();
        assert!(matches!(err, ArchiveError::ZipLimit { limit: "65535 byte name", .. }));
        assert_eq!(zip.len(), 1);

        let out = zip.file();
        assert_eq!(&out[26..28], &[0xff, 0xff]);
        assert_eq!(out.len(), zip.offset() + CENTRAL_DIR_HEADER_SIZE + MAX_NAME_LEN + END_OF_CENTRAL_DIR_SIZE);
    }
}
