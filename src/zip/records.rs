//! ZIP 记录格式
//!
//! 本地文件头 / 中央目录记录 / 中央目录结束记录 (EOCD)，
//! 所有多字节字段均为小端序。

/// ZIP 文件格式常量
pub mod zip_format {
    // 签名
    pub const LOCAL_DIR_HEADER_SIG: u32 = 0x04034b50;
    pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014b50;
    pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054b50;

    // 头大小
    pub const LOCAL_DIR_HEADER_SIZE: usize = 30;
    pub const CENTRAL_DIR_HEADER_SIZE: usize = 46;
    pub const END_OF_CENTRAL_DIR_SIZE: usize = 22;

    // 版本
    pub const VERSION_NEEDED: u16 = 20; // 2.0
    pub const VERSION_MADE_BY: u16 = 0; // MS-DOS

    // 压缩方法：只支持存储
    pub const METHOD_STORE: u16 = 0;

    // DOS 属性
    pub const DOS_DIR_ATTR: u32 = 0x10;
    pub const DOS_ARCHIVE_ATTR: u32 = 0x20;

    // 16 位字段上限（不支持 ZIP64）
    pub const MAX_ENTRIES: usize = u16::MAX as usize;
    pub const MAX_NAME_LEN: usize = u16::MAX as usize;
}

use zip_format::*;

/// One stored entry, enough to emit both its local header and its
/// central directory record.
///
/// `name` must be at most [`zip_format::MAX_NAME_LEN`] bytes;
/// [`ZipBuilder::add_file`](crate::ZipBuilder::add_file) enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipRecord {
    pub name: String,
    pub crc32: u32,
    /// Stored size (compressed == uncompressed)
    pub size: u32,
    /// Packed DOS date/time, date in the high 16 bits
    pub dos_datetime: u32,
    /// Offset of the local header within the data section
    pub local_header_offset: u32,
}

impl ZipRecord {
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    fn external_attr(&self) -> u32 {
        if self.is_dir() {
            DOS_DIR_ATTR
        } else {
            DOS_ARCHIVE_ATTR
        }
    }

    fn name_len(&self) -> u16 {
        u16::try_from(self.name.len()).unwrap_or(u16::MAX)
    }

    /// Local file header followed by the file name.
    pub fn write_local_header(&self, out: &mut Vec<u8>) {
        let mut header = [0u8; LOCAL_DIR_HEADER_SIZE];

        header[0..4].copy_from_slice(&LOCAL_DIR_HEADER_SIG.to_le_bytes());
        header[4..6].copy_from_slice(&VERSION_NEEDED.to_le_bytes());
        // 6..8 位标志 = 0
        header[8..10].copy_from_slice(&METHOD_STORE.to_le_bytes());
        // 时间在前，日期在后
        header[10..14].copy_from_slice(&self.dos_datetime.to_le_bytes());
        header[14..18].copy_from_slice(&self.crc32.to_le_bytes());
        header[18..22].copy_from_slice(&self.size.to_le_bytes());
        header[22..26].copy_from_slice(&self.size.to_le_bytes());
        header[26..28].copy_from_slice(&self.name_len().to_le_bytes());
        // 28..30 extra field 长度 = 0

        out.extend_from_slice(&header);
        out.extend_from_slice(self.name.as_bytes());
    }

    /// Central directory record followed by the file name.
    pub fn write_central_record(&self, out: &mut Vec<u8>) {
        let mut header = [0u8; CENTRAL_DIR_HEADER_SIZE];

        header[0..4].copy_from_slice(&CENTRAL_DIR_HEADER_SIG.to_le_bytes());
        header[4..6].copy_from_slice(&VERSION_MADE_BY.to_le_bytes());
        header[6..8].copy_from_slice(&VERSION_NEEDED.to_le_bytes());
        // 8..10 位标志 = 0
        header[10..12].copy_from_slice(&METHOD_STORE.to_le_bytes());
        header[12..16].copy_from_slice(&self.dos_datetime.to_le_bytes());
        header[16..20].copy_from_slice(&self.crc32.to_le_bytes());
        header[20..24].copy_from_slice(&self.size.to_le_bytes());
        header[24..28].copy_from_slice(&self.size.to_le_bytes());
        header[28..30].copy_from_slice(&self.name_len().to_le_bytes());
        // 30..32 extra, 32..34 comment, 34..36 disk, 36..38 internal attr 均为 0
        header[38..42].copy_from_slice(&self.external_attr().to_le_bytes());
        header[42..46].copy_from_slice(&self.local_header_offset.to_le_bytes());

        out.extend_from_slice(&header);
        out.extend_from_slice(self.name.as_bytes());
    }

    /// Bytes the central record occupies.
    pub fn central_record_len(&self) -> usize {
        CENTRAL_DIR_HEADER_SIZE + self.name.len()
    }
}

/// EOCD (End of Central Directory)
pub fn write_end_of_central_directory(
    out: &mut Vec<u8>,
    num_entries: u16,
    central_dir_size: u32,
    central_dir_offset: u32,
) {
    let mut eocd = [0u8; END_OF_CENTRAL_DIR_SIZE];

    eocd[0..4].copy_from_slice(&END_OF_CENTRAL_DIR_SIG.to_le_bytes());
    // 4..6 disk number, 6..8 central dir disk = 0
    eocd[8..10].copy_from_slice(&num_entries.to_le_bytes());
    eocd[10..12].copy_from_slice(&num_entries.to_le_bytes());
    eocd[12..16].copy_from_slice(&central_dir_size.to_le_bytes());
    eocd[16..20].copy_from_slice(&central_dir_offset.to_le_bytes());
    // 20..22 comment length = 0

    out.extend_from_slice(&eocd);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ZipRecord {
        ZipRecord {
            name: name.to_string(),
            crc32: 0xDEADBEEF,
            size: 3,
            dos_datetime: 0x0021_0000,
            local_header_offset: 77,
        }
    }

    #[test]
    fn test_local_header_layout() {
        let mut out = Vec::new();
        record("a.txt").write_local_header(&mut out);

        assert_eq!(out.len(), LOCAL_DIR_HEADER_SIZE + 5);
        assert_eq!(&out[0..4], b"PK\x03\x04");
        assert_eq!(&out[8..10], &[0, 0]);
        assert_eq!(&out[10..12], &[0, 0]);
        assert_eq!(&out[12..14], &[0x21, 0x00]);
        assert_eq!(&out[14..18], &0xDEADBEEFu32.to_le_bytes());
        assert_eq!(&out[26..28], &[5, 0]);
        assert_eq!(&out[30..], b"a.txt");
    }

    #[test]
    fn test_central_record_layout() {
        let rec = record("dir/");
        let mut out = Vec::new();
        rec.write_central_record(&mut out);

        assert_eq!(out.len(), rec.central_record_len());
        assert_eq!(&out[0..4], b"PK\x01\x02");
        assert_eq!(&out[38..42], &DOS_DIR_ATTR.to_le_bytes());
        assert_eq!(&out[42..46], &77u32.to_le_bytes());
        assert_eq!(&out[46..], b"dir/");
    }

    #[test]
    fn test_eocd_layout() {
        let mut out = Vec::new();
        write_end_of_central_directory(&mut out, 2, 100, 200);

        assert_eq!(out.len(), END_OF_CENTRAL_DIR_SIZE);
        assert_eq!(&out[0..4], b"PK\x05\x06");
        assert_eq!(&out[8..10], &[2, 0]);
        assert_eq!(&out[10..12], &[2, 0]);
        assert_eq!(&out[12..16], &100u32.to_le_bytes());
        assert_eq!(&out[16..20], &200u32.to_le_bytes());
        assert_eq!(&out[20..22], &[0, 0]);
    }
}
