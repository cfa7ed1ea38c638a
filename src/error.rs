//! Error types for archive-rs
//!
//! This module defines all error types that can occur while building or
//! parsing TAR and ZIP archives.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of entry held by an archive builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for archive-rs
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Path does not exist
    #[error("path '{}' does not exist", path.display())]
    NotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("'{}' is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory
    #[error("'{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Entry was already added to the builder
    #[error("{kind} '{name}' is already in the archive")]
    DuplicateEntry { kind: EntryKind, name: String },

    /// Entry is not present in the builder
    #[error("{kind} '{name}' is not in the archive")]
    EntryNotFound { kind: EntryKind, name: String },

    /// No default filename configured for saving
    #[error("no archive filename configured")]
    NoFilename,

    /// File read failed
    #[error("cannot read file '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File write failed
    #[error("cannot write file '{}': {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Header checksum does not match its contents
    #[error("checksum mismatch for entry '{name}': header says {expected}, computed {actual}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// Entry does not fit the 16/32-bit fields of a ZIP archive
    #[error("zip entry '{name}' exceeds the {limit} limit")]
    ZipLimit { name: String, limit: &'static str },

    /// Gzip compression or decompression failed
    #[error("gzip error: {0}")]
    Gzip(#[source] io::Error),

    /// IO error with context
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ArchiveError {
    /// Create a file read error
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ArchiveError::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a file write error
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ArchiveError::FileWrite {
            path: path.into(),
            source,
        }
    }

    pub fn duplicate(kind: EntryKind, name: impl Into<String>) -> Self {
        ArchiveError::DuplicateEntry {
            kind,
            name: name.into(),
        }
    }

    pub fn missing_entry(kind: EntryKind, name: impl Into<String>) -> Self {
        ArchiveError::EntryNotFound {
            kind,
            name: name.into(),
        }
    }

    /// Whether the error came from the filesystem rather than from builder state
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ArchiveError::FileRead { .. }
                | ArchiveError::FileWrite { .. }
                | ArchiveError::Gzip(_)
                | ArchiveError::Io(_)
        )
    }
}

/// Result type for archive-rs operations
pub type Result<T> = std::result::Result<T, ArchiveError>;
