//! archive-rs - TAR / ZIP 归档库
//!
//! 两个互相独立的归档引擎：
//!
//! - ZIP 构建器：只存储（不压缩），在内存中累积条目，一次性输出字节流
//! - TAR 构建器/解析器：从文件、目录或内存数据生成 TAR（可选 gzip），
//!   并能把已有的 TAR 流解析回条目
//!
//! ## 示例
//!
//! ```no_run
//! use archive_rs::{TarBuilder, ZipBuilder};
//!
//! let mut zip = ZipBuilder::new();
//! zip.add_file(b"hello", "docs\\hello.txt", 0).unwrap();
//! let bytes = zip.file();
//!
//! let mut tar = TarBuilder::new();
//! tar.add_file_data("hello.txt", b"hello world".to_vec(), 0).unwrap();
//! let tgz = tar.to_tar_output(true).unwrap();
//!
//! let mut parsed = TarBuilder::new();
//! parsed.parse_tar(&tgz).unwrap();
//! assert_eq!(parsed.num_files(), 1);
//! ```

pub mod dostime;
pub mod error;
pub mod gzip;
pub mod platform;
pub mod tar;
pub mod zip;

// 重导出常用类型
pub use dostime::{dos_to_unix, unix_to_dos, DosDateTime};
pub use error::{ArchiveError, EntryKind, Result};
pub use tar::{TarBuilder, TarBuilderOptions, TarDirectoryEntry, TarFileEntry};
pub use zip::ZipBuilder;

use std::path::Path;

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 创建 TAR 文件（便捷函数）
///
/// 目录只作为目录条目写入，不递归。
///
/// # 示例
///
/// ```no_run
/// archive_rs::create_tar("backup.tar.gz", &["notes.txt", "docs"], true).unwrap();
/// ```
pub fn create_tar(archive: impl AsRef<Path>, files: &[impl AsRef<Path>], gzip: bool) -> Result<()> {
    let mut tar = TarBuilder::new();
    for file in files {
        let file = file.as_ref();
        if file.is_dir() {
            tar.add_directory(file)?;
        } else {
            tar.add_file(file)?;
        }
    }
    tar.to_tar(archive, gzip)
}

/// 创建 ZIP 文件（便捷函数）
///
/// 条目名为各文件的文件名。
pub fn create_zip(archive: impl AsRef<Path>, files: &[impl AsRef<Path>]) -> Result<()> {
    let mut zip = ZipBuilder::new();
    for file in files {
        zip.add_path(file, None)?;
    }
    zip.write_to(archive)
}

/// 列出 TAR 内容（便捷函数），支持 gzip
///
/// 目录在前，文件在后，各自保持归档中的顺序。
pub fn list_tar(archive: impl AsRef<Path>) -> Result<Vec<String>> {
    let tar = TarBuilder::open(archive)?;
    Ok(tar
        .directories()
        .iter()
        .map(|d| d.name.clone())
        .chain(tar.files().iter().map(|f| f.name.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
