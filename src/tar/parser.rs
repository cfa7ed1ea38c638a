//! TAR 流解析
//!
//! 以 512 字节为单位遍历缓冲区。遇到全 0 头部或缓冲区耗尽时停止；
//! 任何读取都不会越过缓冲区末尾。

use crate::error::{ArchiveError, Result};
use crate::tar::header::{compute_unsigned_checksum, is_zero_block, padded_len, TarHeader, BLOCK_SIZE};

/// One header and the content that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry<'a> {
    pub header: TarHeader,
    /// Content bytes; empty for directories. Shorter than `header.size`
    /// only when the archive was truncated.
    pub data: &'a [u8],
}

impl ParsedEntry<'_> {
    pub fn is_dir(&self) -> bool {
        self.header.is_dir()
    }
}

/// Iterator over the entries of an uncompressed TAR buffer.
pub struct TarParser<'a> {
    buffer: &'a [u8],
    offset: usize,
    verify_checksums: bool,
    done: bool,
}

impl<'a> TarParser<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        TarParser {
            buffer,
            offset: 0,
            verify_checksums: true,
            done: false,
        }
    }

    /// Reject headers whose checksum does not match (default `true`).
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Byte offset of the next header to read.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn next_impl(&mut self) -> Result<Option<ParsedEntry<'a>>> {
        if self.done {
            return Ok(None);
        }

        let block = match self.buffer.get(self.offset..self.offset + BLOCK_SIZE) {
            Some(block) => block,
            None => {
                if self.offset < self.buffer.len() {
                    log::warn!(
                        "tar: {} trailing bytes at offset {} ignored",
                        self.buffer.len() - self.offset,
                        self.offset
                    );
                }
                self.done = true;
                return Ok(None);
            }
        };

        if is_zero_block(block) {
            log::trace!("tar: end-of-archive marker at offset {}", self.offset);
            self.done = true;
            return Ok(None);
        }

        let header = TarHeader::from_bytes(block);
        log::trace!(
            "tar: header '{}' type {:?} size {} at offset {}",
            header.name,
            header.typeflag,
            header.size,
            self.offset
        );

        if self.verify_checksums {
            let actual = compute_unsigned_checksum(block);
            if actual != header.checksum {
                self.done = true;
                return Err(ArchiveError::ChecksumMismatch {
                    name: header.name,
                    expected: header.checksum,
                    actual,
                });
            }
        }

        let data_start = self.offset + BLOCK_SIZE;
        let available = self.buffer.len() - data_start;

        if header.is_dir() {
            self.offset = data_start;
            return Ok(Some(ParsedEntry { header, data: &[] }));
        }

        let size = usize::try_from(header.size).unwrap_or(usize::MAX);
        if size > available {
            log::warn!(
                "tar: entry '{}' declares {} bytes but only {} remain, truncated",
                header.name,
                size,
                available
            );
            self.done = true;
            let data = &self.buffer[data_start..];
            return Ok(Some(ParsedEntry { header, data }));
        }

        let data = &self.buffer[data_start..data_start + size];
        self.offset = data_start.saturating_add(padded_len(size));
        Ok(Some(ParsedEntry { header, data }))
    }
}

impl<'a> Iterator for TarParser<'a> {
    type Item = Result<ParsedEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_impl().transpose()
    }
}

/// Parse every entry of `buffer`, stopping at the first error.
pub fn entries_from_tar(buffer: &[u8]) -> Result<Vec<ParsedEntry<'_>>> {
    TarParser::new(buffer).collect()
}
