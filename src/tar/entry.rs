use crate::error::{ArchiveError, Result};
use crate::platform::FileInfo;
use crate::tar::header::TarHeader;
use crate::tar::parser::ParsedEntry;
use std::fs;
use std::path::{Path, PathBuf};

/// File entry held by a [`TarBuilder`](crate::tar::TarBuilder).
///
/// Entries added from disk keep their source path and load their content
/// when the archive is generated. Parsed and in-memory entries carry their
/// content from the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarFileEntry {
    /// Name inside the archive; also the lookup key
    pub name: String,
    pub source: Option<PathBuf>,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub mtime: u64,
    /// Header checksum, known once the entry was generated or parsed
    pub checksum: u32,
    pub user_name: String,
    pub group_name: String,
    pub is_binary: bool,
    content: Option<Vec<u8>>,
}

impl TarFileEntry {
    pub(crate) fn from_disk(name: String, path: &Path, info: &FileInfo, is_binary: bool) -> Self {
        TarFileEntry {
            name,
            source: Some(path.to_path_buf()),
            mode: info.mode,
            uid: info.uid,
            gid: info.gid,
            size: info.size,
            mtime: info.mtime.max(0) as u64,
            checksum: 0,
            user_name: info.user_name.clone(),
            group_name: info.group_name.clone(),
            is_binary,
            content: None,
        }
    }

    pub(crate) fn from_data(name: String, data: Vec<u8>, mtime: u64, mode: u32) -> Self {
        TarFileEntry {
            name,
            source: None,
            mode,
            uid: 0,
            gid: 0,
            size: data.len() as u64,
            mtime,
            checksum: 0,
            user_name: String::new(),
            group_name: String::new(),
            is_binary: true,
            content: Some(data),
        }
    }

    pub(crate) fn from_parsed(entry: &ParsedEntry<'_>) -> Self {
        let header = &entry.header;
        TarFileEntry {
            name: header.name.clone(),
            source: None,
            mode: header.mode,
            uid: header.uid,
            gid: header.gid,
            size: entry.data.len() as u64,
            mtime: header.mtime,
            checksum: header.checksum,
            user_name: header.user_name.clone(),
            group_name: header.group_name.clone(),
            is_binary: true,
            content: Some(entry.data.to_vec()),
        }
    }

    /// Content, if it has been loaded.
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Read the content from the source path unless already in memory.
    pub fn load(&mut self) -> Result<&[u8]> {
        if self.content.is_none() {
            let path = self.source.as_deref().ok_or_else(|| ArchiveError::NotFound {
                path: PathBuf::from(&self.name),
            })?;
            let data = fs::read(path).map_err(|e| ArchiveError::file_read(path, e))?;
            log::debug!("tar: loaded {} bytes from '{}'", data.len(), path.display());
            self.size = data.len() as u64;
            self.content = Some(data);
        }
        Ok(self.content.as_deref().unwrap_or_default())
    }

    /// Header describing this entry; size comes from the loaded content
    /// when there is one.
    pub fn header(&self) -> TarHeader {
        TarHeader {
            mode: self.mode,
            uid: self.uid,
            gid: self.gid,
            user_name: self.user_name.clone(),
            group_name: self.group_name.clone(),
            ..TarHeader::file(
                self.name.clone(),
                self.content.as_ref().map_or(self.size, |c| c.len() as u64),
                self.mtime,
            )
        }
    }
}

/// Directory entry held by a [`TarBuilder`](crate::tar::TarBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarDirectoryEntry {
    pub name: String,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub mtime: u64,
    pub checksum: u32,
    pub user_name: String,
    pub group_name: String,
}

impl TarDirectoryEntry {
    pub(crate) fn from_disk(name: String, info: &FileInfo) -> Self {
        TarDirectoryEntry {
            name,
            mode: info.mode,
            uid: info.uid,
            gid: info.gid,
            mtime: info.mtime.max(0) as u64,
            checksum: 0,
            user_name: info.user_name.clone(),
            group_name: info.group_name.clone(),
        }
    }

    pub(crate) fn from_parsed(entry: &ParsedEntry<'_>) -> Self {
        let header = &entry.header;
        TarDirectoryEntry {
            name: header.name.clone(),
            mode: header.mode,
            uid: header.uid,
            gid: header.gid,
            mtime: header.mtime,
            checksum: header.checksum,
            user_name: header.user_name.clone(),
            group_name: header.group_name.clone(),
        }
    }

    pub fn header(&self) -> TarHeader {
        TarHeader {
            mode: self.mode,
            uid: self.uid,
            gid: self.gid,
            user_name: self.user_name.clone(),
            group_name: self.group_name.clone(),
            ..TarHeader::directory(self.name.clone(), self.mtime)
        }
    }
}
