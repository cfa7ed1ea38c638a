// 公共测试辅助函数
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 创建临时测试目录
pub fn test_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// 在 `root` 下创建文件（自动创建父目录），返回各文件的完整路径
pub fn write_files(root: &Path, files: &[(&str, &[u8])]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, data)| {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, data).unwrap();
            path
        })
        .collect()
}

/// 中央目录中的一条记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipListing {
    pub name: String,
    pub method: u16,
    pub dos_datetime: u32,
    pub crc32: u32,
    pub size: u32,
    pub offset: u32,
}

fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// 通过 EOCD 定位中央目录并列出所有记录
pub fn list_zip(zip: &[u8]) -> Vec<ZipListing> {
    let eocd = &zip[zip.len() - 22..];
    assert_eq!(&eocd[0..4], b"PK\x05\x06", "missing EOCD signature");

    let count = u16_at(eocd, 10) as usize;
    let cd_size = u32_at(eocd, 12) as usize;
    let cd_offset = u32_at(eocd, 16) as usize;
    assert_eq!(cd_offset + cd_size, zip.len() - 22);

    let mut entries = Vec::with_capacity(count);
    let mut at = cd_offset;
    for _ in 0..count {
        let rec = &zip[at..];
        assert_eq!(&rec[0..4], b"PK\x01\x02");
        let name_len = u16_at(rec, 28) as usize;
        entries.push(ZipListing {
            method: u16_at(rec, 10),
            dos_datetime: u32_at(rec, 12),
            crc32: u32_at(rec, 16),
            size: u32_at(rec, 20),
            offset: u32_at(rec, 42),
            name: String::from_utf8_lossy(&rec[46..46 + name_len]).into_owned(),
        });
        at += 46 + name_len;
    }
    entries
}

/// 按中央目录记录读出存储的数据
pub fn zip_entry_data<'a>(zip: &'a [u8], entry: &ZipListing) -> &'a [u8] {
    let local = &zip[entry.offset as usize..];
    assert_eq!(&local[0..4], b"PK\x03\x04");
    let name_len = u16_at(local, 26) as usize;
    let extra_len = u16_at(local, 28) as usize;
    let start = 30 + name_len + extra_len;
    &local[start..start + entry.size as usize]
}

/// 标准化临时路径，用于快照测试
pub fn normalize_temp_paths(output: String) -> String {
    let mut output = output.replace('\\', "/");
    let tmp = std::env::temp_dir();
    let tmp = tmp.to_string_lossy().replace('\\', "/");
    let tmp = tmp.trim_end_matches('/');
    if !tmp.is_empty() {
        output = output.replace(tmp, "<tempdir>");
    }

    // tempfile crate 创建的目录 (.tmpXXXXXX)
    let re = regex::Regex::new(r"\.tmp[a-zA-Z0-9]+").unwrap();
    re.replace_all(&output, ".tmpXXXXXX").to_string()
}
