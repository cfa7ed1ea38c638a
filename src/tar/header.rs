//! TAR 头部编解码
//!
//! 512 字节头部，字段偏移（ustar 基线）：
//!
//! | 字段      | 偏移       | 编码                     |
//! |-----------|------------|--------------------------|
//! | name      | 0..100     | NUL 填充                 |
//! | mode      | 100..108   | 7 位八进制 + NUL         |
//! | uid       | 108..116   | 7 位八进制 + NUL         |
//! | gid       | 116..124   | 7 位八进制 + NUL         |
//! | size      | 124..136   | 11 位八进制 + NUL        |
//! | mtime     | 136..148   | 11 位八进制 + NUL        |
//! | checksum  | 148..156   | 6 位八进制 + NUL + 空格  |
//! | typeflag  | 156        | '0' / NUL 文件，'5' 目录 |
//! | linkname  | 157..257   | 全 0                     |
//! | magic     | 257..265   | "ustar  \0"              |
//! | uname     | 265..297   | NUL 填充                 |
//! | gname     | 297..329   | NUL 填充                 |
//! | 其余      | 329..512   | 全 0                     |

use std::ops::Range;

/// Size of a header block and of the padding unit for content.
pub const BLOCK_SIZE: usize = 512;

const NAME: Range<usize> = 0..100;
const MODE: Range<usize> = 100..108;
const UID: Range<usize> = 108..116;
const GID: Range<usize> = 116..124;
const SIZE: Range<usize> = 124..136;
const MTIME: Range<usize> = 136..148;
const CHECKSUM: Range<usize> = 148..156;
const TYPEFLAG: usize = 156;
const MAGIC: Range<usize> = 257..265;
const UNAME: Range<usize> = 265..297;
const GNAME: Range<usize> = 297..329;

const GNU_MAGIC: &[u8; 8] = b"ustar  \0";

/// Entry type stored at offset 156
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFlag {
    /// '0'
    Regular,
    /// NUL, written by pre-POSIX tars for plain files
    OldRegular,
    Directory,
    Other(u8),
}

impl TypeFlag {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'0' => TypeFlag::Regular,
            0 => TypeFlag::OldRegular,
            b'5' => TypeFlag::Directory,
            other => TypeFlag::Other(other),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            TypeFlag::Regular => b'0',
            TypeFlag::OldRegular => 0,
            TypeFlag::Directory => b'5',
            TypeFlag::Other(b) => *b,
        }
    }
}

/// Decoded TAR header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarHeader {
    pub name: String,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub mtime: u64,
    /// Checksum as read from a header. `to_bytes` ignores it and computes
    /// a fresh one.
    pub checksum: u32,
    pub typeflag: TypeFlag,
    pub user_name: String,
    pub group_name: String,
}

impl TarHeader {
    pub fn file(name: impl Into<String>, size: u64, mtime: u64) -> Self {
        TarHeader {
            name: name.into(),
            mode: 0o644,
            uid: 0,
            gid: 0,
            size,
            mtime,
            checksum: 0,
            typeflag: TypeFlag::Regular,
            user_name: String::new(),
            group_name: String::new(),
        }
    }

    pub fn directory(name: impl Into<String>, mtime: u64) -> Self {
        TarHeader {
            mode: 0o755,
            typeflag: TypeFlag::Directory,
            ..TarHeader::file(name, 0, mtime)
        }
    }

    /// Typeflag '5', or an old-style (NUL) entry named with a trailing '/'.
    /// A '0' entry is always a file, whatever its name.
    pub fn is_dir(&self) -> bool {
        self.typeflag == TypeFlag::Directory
            || (self.typeflag == TypeFlag::OldRegular && self.size == 0 && self.name.ends_with('/'))
    }

    /// Encode into a 512-byte block with a valid checksum.
    pub fn to_bytes(&self) -> [u8; BLOCK_SIZE] {
        let mut block = [0u8; BLOCK_SIZE];

        let name = self.name.as_bytes();
        if name.len() > NAME.len() {
            log::warn!("tar: name '{}' longer than {} bytes, truncated", self.name, NAME.len());
        }
        write_padded(&mut block[NAME], name);
        write_octal(&mut block[MODE], self.mode as u64);
        write_octal(&mut block[UID], self.uid as u64);
        write_octal(&mut block[GID], self.gid as u64);
        write_octal(&mut block[SIZE], self.size);
        write_octal(&mut block[MTIME], self.mtime);
        block[TYPEFLAG] = self.typeflag.as_byte();
        block[MAGIC].copy_from_slice(GNU_MAGIC);
        // 保留最后一个 NUL
        write_padded(&mut block[UNAME.start..UNAME.end - 1], self.user_name.as_bytes());
        write_padded(&mut block[GNAME.start..GNAME.end - 1], self.group_name.as_bytes());

        let checksum = compute_unsigned_checksum(&block);
        write_checksum(&mut block, checksum);
        block
    }

    /// Decode a header block. The caller guarantees `block.len() >= 512`.
    pub fn from_bytes(block: &[u8]) -> Self {
        TarHeader {
            name: parse_null_padded_string(&block[NAME]),
            mode: parse_octal(&block[MODE]) as u32,
            uid: parse_octal(&block[UID]) as u32,
            gid: parse_octal(&block[GID]) as u32,
            size: parse_octal(&block[SIZE]),
            mtime: parse_octal(&block[MTIME]),
            checksum: parse_octal(&block[CHECKSUM]) as u32,
            typeflag: TypeFlag::from_byte(block[TYPEFLAG]),
            user_name: parse_null_padded_string(&block[UNAME]),
            group_name: parse_null_padded_string(&block[GNAME]),
        }
    }
}

/// Sum of the unsigned bytes of a header block, counting the checksum field
/// (offsets 148..156) as eight ASCII spaces.
///
/// Blocks shorter than 512 bytes are summed as if zero-padded.
pub fn compute_unsigned_checksum(block: &[u8]) -> u32 {
    block
        .iter()
        .take(BLOCK_SIZE)
        .enumerate()
        .map(|(i, &b)| if CHECKSUM.contains(&i) { b' ' as u32 } else { b as u32 })
        .sum::<u32>()
        + CHECKSUM.filter(|&i| i >= block.len()).count() as u32 * b' ' as u32
}

/// Whether the stored checksum of `block` matches its contents.
pub fn verify_checksum(block: &[u8]) -> bool {
    block.len() >= BLOCK_SIZE
        && parse_octal(&block[CHECKSUM]) as u32 == compute_unsigned_checksum(block)
}

fn write_checksum(block: &mut [u8; BLOCK_SIZE], checksum: u32) {
    let digits = format!("{:06o}", checksum);
    block[CHECKSUM.start..CHECKSUM.start + 6].copy_from_slice(&digits.as_bytes()[digits.len() - 6..]);
    block[CHECKSUM.start + 6] = 0;
    block[CHECKSUM.start + 7] = b' ';
}

/// Text up to the first NUL byte, or the whole field when there is none.
pub fn parse_null_padded_string(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Leading octal digits of a numeric field. Leading spaces are skipped;
/// the first non-octal byte ends the number. An empty field is 0.
pub fn parse_octal(field: &[u8]) -> u64 {
    let digits = field
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|&&b| (b'0'..=b'7').contains(&b));

    let mut value: u64 = 0;
    for &b in digits {
        value = match value.checked_mul(8).and_then(|v| v.checked_add((b - b'0') as u64)) {
            Some(v) => v,
            None => {
                log::warn!("tar: octal field overflows, saturating");
                return u64::MAX;
            }
        };
    }
    value
}

/// Zero-padded octal occupying `field.len() - 1` digits plus a NUL terminator.
/// Values too large for the field saturate to all sevens.
pub fn write_octal(field: &mut [u8], value: u64) {
    let width = field.len() - 1;
    let mut digits = format!("{:0width$o}", value, width = width);
    if digits.len() > width {
        log::warn!("tar: value {} does not fit in {} octal digits", value, width);
        digits = "7".repeat(width);
    }
    field[..width].copy_from_slice(digits.as_bytes());
    field[width] = 0;
}

fn write_padded(field: &mut [u8], value: &[u8]) {
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value[..len]);
}

/// Whether every byte of the block is NUL (end-of-archive marker).
pub fn is_zero_block(block: &[u8]) -> bool {
    block.iter().all(|&b| b == 0)
}

/// `len` rounded up to a whole number of blocks.
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}
