use crate::error::{ArchiveError, EntryKind, Result};
use crate::gzip;
use crate::platform::{current_platform, Platform};
use crate::tar::entry::{TarDirectoryEntry, TarFileEntry};
use crate::tar::header::{compute_unsigned_checksum, padded_len, BLOCK_SIZE};
use crate::tar::parser::TarParser;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// TAR builder options.
#[derive(Debug, Clone)]
pub struct TarBuilderOptions {
    /// Default target of [`TarBuilder::save_tar`]
    pub filename: Option<PathBuf>,
    /// Whether [`TarBuilder::save_tar`] gzips its output
    pub gzip: bool,
    /// gzip level, 0-9
    pub compression_level: u32,
    /// Reject parsed headers whose checksum does not match
    pub verify_checksums: bool,
}

impl Default for TarBuilderOptions {
    fn default() -> Self {
        Self {
            filename: None,
            gzip: false,
            compression_level: gzip::DEFAULT_LEVEL,
            verify_checksums: true,
        }
    }
}

/// Builds TAR archives from files, directories and in-memory buffers, and
/// parses existing archives back into entries.
///
/// Files and directories are kept in insertion order and are unique by name.
/// Directories are written before files.
#[derive(Debug, Default)]
pub struct TarBuilder {
    options: TarBuilderOptions,
    files: Vec<TarFileEntry>,
    directories: Vec<TarDirectoryEntry>,
    file_names: HashSet<String>,
    directory_names: HashSet<String>,
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl TarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TarBuilderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Builder with the contents of the archive at `path`, which also becomes
    /// the default save target.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut builder = Self::new();
        builder.open_tar(path)?;
        Ok(builder)
    }

    pub fn filename(mut self, filename: impl AsRef<Path>) -> Self {
        self.options.filename = Some(filename.as_ref().to_path_buf());
        self
    }

    pub fn gzip(mut self, gzip: bool) -> Self {
        self.options.gzip = gzip;
        self
    }

    pub fn compression_level(mut self, level: u32) -> Self {
        self.options.compression_level = level.min(9);
        self
    }

    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.options.verify_checksums = verify;
        self
    }

    pub fn options(&self) -> &TarBuilderOptions {
        &self.options
    }

    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    pub fn num_directories(&self) -> usize {
        self.directories.len()
    }

    pub fn files(&self) -> &[TarFileEntry] {
        &self.files
    }

    pub fn directories(&self) -> &[TarDirectoryEntry] {
        &self.directories
    }

    /// Add a regular file from disk. Its content is read when the archive
    /// is generated.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.add_file_impl(path.as_ref(), false)
    }

    /// Same as [`add_file`](Self::add_file) with the entry flagged binary.
    pub fn add_binary_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.add_file_impl(path.as_ref(), true)
    }

    fn add_file_impl(&mut self, path: &Path, is_binary: bool) -> Result<()> {
        let name = path_key(path);
        if self.file_names.contains(&name) {
            return Err(ArchiveError::duplicate(EntryKind::File, name));
        }

        let info = stat(path)?;
        if !info.is_file {
            return Err(ArchiveError::NotAFile { path: path.to_path_buf() });
        }

        log::debug!("tar: add file '{}' ({} bytes)", name, info.size);
        self.file_names.insert(name.clone());
        self.files.push(TarFileEntry::from_disk(name, path, &info, is_binary));
        Ok(())
    }

    /// Add a file whose content is already in memory.
    pub fn add_file_data(&mut self, name: &str, data: impl Into<Vec<u8>>, mtime: u64) -> Result<()> {
        if self.file_names.contains(name) {
            return Err(ArchiveError::duplicate(EntryKind::File, name));
        }

        let data = data.into();
        log::debug!("tar: add in-memory file '{}' ({} bytes)", name, data.len());
        let mode = current_platform().default_file_permissions();
        self.file_names.insert(name.to_string());
        self.files.push(TarFileEntry::from_data(name.to_string(), data, mtime, mode));
        Ok(())
    }

    pub fn add_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let name = path_key(path);
        if self.directory_names.contains(&name) {
            return Err(ArchiveError::duplicate(EntryKind::Directory, name));
        }

        let info = stat(path)?;
        if !info.is_dir {
            return Err(ArchiveError::NotADirectory { path: path.to_path_buf() });
        }

        log::debug!("tar: add directory '{}'", name);
        self.directory_names.insert(name.clone());
        self.directories.push(TarDirectoryEntry::from_disk(name, &info));
        Ok(())
    }

    pub fn contains_file(&self, name: impl AsRef<Path>) -> bool {
        self.file_names.contains(&path_key(name.as_ref()))
    }

    pub fn contains_directory(&self, name: impl AsRef<Path>) -> bool {
        self.directory_names.contains(&path_key(name.as_ref()))
    }

    pub fn remove_file(&mut self, name: impl AsRef<Path>) -> Result<()> {
        let name = path_key(name.as_ref());
        if !self.file_names.remove(&name) {
            return Err(ArchiveError::missing_entry(EntryKind::File, name));
        }
        self.files.retain(|f| f.name != name);
        log::debug!("tar: removed file '{}'", name);
        Ok(())
    }

    pub fn remove_directory(&mut self, name: impl AsRef<Path>) -> Result<()> {
        let name = path_key(name.as_ref());
        if !self.directory_names.remove(&name) {
            return Err(ArchiveError::missing_entry(EntryKind::Directory, name));
        }
        self.directories.retain(|d| d.name != name);
        log::debug!("tar: removed directory '{}'", name);
        Ok(())
    }

    pub fn get_file(&self, name: impl AsRef<Path>) -> Option<&TarFileEntry> {
        let name = path_key(name.as_ref());
        self.files.iter().find(|f| f.name == name)
    }

    pub fn get_directory(&self, name: impl AsRef<Path>) -> Option<&TarDirectoryEntry> {
        let name = path_key(name.as_ref());
        self.directories.iter().find(|d| d.name == name)
    }

    /// Serialize to TAR bytes, gzip-compressed as a whole when `gzip` is set.
    ///
    /// File contents still on disk are loaded (and kept) first; an unreadable
    /// source fails the whole call.
    pub fn to_tar_output(&mut self, gzip: bool) -> Result<Vec<u8>> {
        let tar = self.generate_tar()?;
        if gzip {
            gzip::deflate_with_level(&tar, self.options.compression_level)
        } else {
            Ok(tar)
        }
    }

    /// Serialize and write to `filename`.
    pub fn to_tar(&mut self, filename: impl AsRef<Path>, gzip: bool) -> Result<()> {
        let filename = filename.as_ref();
        let output = self.to_tar_output(gzip)?;
        fs::write(filename, &output).map_err(|e| ArchiveError::file_write(filename, e))?;
        log::debug!("tar: wrote {} bytes to '{}'", output.len(), filename.display());
        Ok(())
    }

    /// Serialize and write to the configured default filename.
    pub fn save_tar(&mut self) -> Result<()> {
        let filename = self.options.filename.clone().ok_or(ArchiveError::NoFilename)?;
        let gzip = self.options.gzip;
        self.to_tar(filename, gzip)
    }

    /// Replace all entries with the archive at `path` and make it the
    /// default save target. Gzip framing is remembered for `save_tar`.
    ///
    /// On any error the builder keeps its entries and options.
    pub fn open_tar(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|e| ArchiveError::file_read(path, e))?;

        let mut opened = TarBuilder::with_options(TarBuilderOptions {
            filename: Some(path.to_path_buf()),
            gzip: gzip::is_gzip(&raw),
            ..self.options.clone()
        });
        let parsed = opened.parse_tar(&raw)?;

        *self = opened;
        Ok(parsed)
    }

    /// Read the archive at `path` (plain or gzipped) and merge its entries.
    pub fn append_tar(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|e| ArchiveError::file_read(path, e))?;
        log::debug!("tar: appending '{}' ({} bytes)", path.display(), raw.len());
        self.parse_tar(&raw)
    }

    /// Parse archive bytes already in memory and merge the entries. Gzip
    /// framing is detected and removed first.
    ///
    /// Returns the number of entries parsed. On a checksum mismatch the
    /// entries before the bad header stay merged.
    pub fn parse_tar(&mut self, buffer: &[u8]) -> Result<usize> {
        let tar = gzip::unpack(buffer)?;
        let parser = TarParser::new(&tar).verify_checksums(self.options.verify_checksums);

        let mut parsed = 0;
        for entry in parser {
            let entry = entry?;
            if entry.is_dir() {
                self.upsert_directory(TarDirectoryEntry::from_parsed(&entry));
            } else {
                self.upsert_file(TarFileEntry::from_parsed(&entry));
            }
            parsed += 1;
        }

        log::debug!(
            "tar: parsed {} entries, now {} files and {} directories",
            parsed,
            self.files.len(),
            self.directories.len()
        );
        Ok(parsed)
    }

    fn upsert_file(&mut self, entry: TarFileEntry) {
        if self.file_names.insert(entry.name.clone()) {
            self.files.push(entry);
        } else if let Some(slot) = self.files.iter_mut().find(|f| f.name == entry.name) {
            *slot = entry;
        }
    }

    fn upsert_directory(&mut self, entry: TarDirectoryEntry) {
        if self.directory_names.insert(entry.name.clone()) {
            self.directories.push(entry);
        } else if let Some(slot) = self.directories.iter_mut().find(|d| d.name == entry.name) {
            *slot = entry;
        }
    }

    fn generate_tar(&mut self) -> Result<Vec<u8>> {
        // 先全部加载，大小确定后再写头部
        for file in &mut self.files {
            file.load()?;
        }

        let capacity = 2 * BLOCK_SIZE
            + self.directories.len() * BLOCK_SIZE
            + self
                .files
                .iter()
                .map(|f| BLOCK_SIZE + padded_len(f.size as usize))
                .sum::<usize>();
        let mut archive = Vec::with_capacity(capacity);

        for dir in &mut self.directories {
            let block = dir.header().to_bytes();
            dir.checksum = compute_unsigned_checksum(&block);
            archive.extend_from_slice(&block);
        }

        for file in &mut self.files {
            let block = file.header().to_bytes();
            file.checksum = compute_unsigned_checksum(&block);
            archive.extend_from_slice(&block);
            archive.extend_from_slice(file.load()?);
            archive.resize(padded_len(archive.len()), 0);
        }

        archive.extend_from_slice(&[0u8; 2 * BLOCK_SIZE]);

        log::debug!(
            "tar: generated {} bytes ({} directories, {} files)",
            archive.len(),
            self.directories.len(),
            self.files.len()
        );
        Ok(archive)
    }
}

fn stat(path: &Path) -> Result<crate::platform::FileInfo> {
    current_platform().file_info(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ArchiveError::NotFound { path: path.to_path_buf() },
        _ => ArchiveError::file_read(path, e),
    })
}
