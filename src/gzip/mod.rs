//! GZIP 压缩/解压过滤器
//!
//! TAR 序列化完成后整体压缩为单个 gzip member；读取时通过魔数
//! (0x1f 0x8b) 判断是否需要先解压。

use crate::error::{ArchiveError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::borrow::Cow;
use std::io::{Read, Write};

/// gzip magic bytes
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Default compression level (matches zlib's default).
pub const DEFAULT_LEVEL: u32 = 6;

/// Compress a buffer at the default level.
pub fn deflate(buffer: &[u8]) -> Result<Vec<u8>> {
    deflate_with_level(buffer, DEFAULT_LEVEL)
}

/// Compress a buffer into a single gzip member. Levels above 9 are capped.
pub fn deflate_with_level(buffer: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(buffer.len() / 2 + 32), Compression::new(level.min(9)));
    encoder.write_all(buffer).map_err(ArchiveError::Gzip)?;
    encoder.finish().map_err(ArchiveError::Gzip)
}

/// Decompress a gzip stream.
pub fn inflate(buffer: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(buffer);
    let mut output = Vec::with_capacity(buffer.len().saturating_mul(2));
    decoder.read_to_end(&mut output).map_err(ArchiveError::Gzip)?;
    Ok(output)
}

/// Whether the buffer starts with the gzip magic bytes.
pub fn is_gzip(buffer: &[u8]) -> bool {
    buffer.starts_with(&GZIP_MAGIC)
}

/// Decompress if gzip-framed, otherwise borrow the input unchanged.
pub fn unpack(buffer: &[u8]) -> Result<Cow<'_, [u8]>> {
    if is_gzip(buffer) {
        log::debug!("gzip framing detected, inflating {} bytes", buffer.len());
        Ok(Cow::Owned(inflate(buffer)?))
    } else {
        Ok(Cow::Borrowed(buffer))
    }
}
