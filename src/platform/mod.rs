//! Platform abstraction layer
//!
//! This module provides a trait-based abstraction for the filesystem metadata
//! that ends up in TAR headers (mode, owner, modification time).

use std::fs;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Metadata of a filesystem entry, as recorded in archive headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Permission bits (`mode & 0o7777`)
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Modification time, seconds since the Unix epoch
    pub mtime: i64,
    pub user_name: String,
    pub group_name: String,
    pub is_file: bool,
    pub is_dir: bool,
}

/// Platform-specific operations trait
pub trait Platform {
    /// Read metadata for a path (follows symlinks)
    fn file_info(&self, path: &Path) -> io::Result<FileInfo>;

    /// Resolve a user id to a login name
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Resolve a group id to a group name
    fn group_name(&self, gid: u32) -> Option<String>;

    /// Get the default permissions for a file
    fn default_file_permissions(&self) -> u32 {
        0o644
    }

    /// Get the default permissions for a directory
    fn default_dir_permissions(&self) -> u32 {
        0o755
    }
}

fn mtime_of(meta: &fs::Metadata) -> i64 {
    match meta.modified().map(|t| t.duration_since(UNIX_EPOCH)) {
        Ok(Ok(d)) => d.as_secs() as i64,
        Ok(Err(e)) => -(e.duration().as_secs() as i64),
        Err(_) => 0,
    }
}

/// Unix platform implementation
#[cfg(unix)]
pub struct UnixPlatform;

#[cfg(unix)]
impl Platform for UnixPlatform {
    fn file_info(&self, path: &Path) -> io::Result<FileInfo> {
        use std::os::unix::fs::MetadataExt;

        let meta = fs::metadata(path)?;
        let is_dir = meta.is_dir();
        Ok(FileInfo {
            mode: meta.mode() & 0o7777,
            uid: meta.uid(),
            gid: meta.gid(),
            size: if is_dir { 0 } else { meta.len() },
            mtime: meta.mtime(),
            user_name: self.user_name(meta.uid()).unwrap_or_default(),
            group_name: self.group_name(meta.gid()).unwrap_or_default(),
            is_file: meta.is_file(),
            is_dir,
        })
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        let mut buf_len = 1024usize;
        loop {
            let mut buf = vec![0 as libc::c_char; buf_len];
            let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::passwd = std::ptr::null_mut();
            let ret = unsafe {
                libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
            };
            if ret == libc::ERANGE && buf_len < 65536 {
                buf_len *= 2;
                continue;
            }
            if ret != 0 || result.is_null() || pwd.pw_name.is_null() {
                return None;
            }
            let name = unsafe { std::ffi::CStr::from_ptr(pwd.pw_name) };
            return Some(name.to_string_lossy().into_owned());
        }
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        let mut buf_len = 1024usize;
        loop {
            let mut buf = vec![0 as libc::c_char; buf_len];
            let mut grp: libc::group = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::group = std::ptr::null_mut();
            let ret = unsafe {
                libc::getgrgid_r(gid, &mut grp, buf.as_mut_ptr(), buf.len(), &mut result)
            };
            if ret == libc::ERANGE && buf_len < 65536 {
                buf_len *= 2;
                continue;
            }
            if ret != 0 || result.is_null() || grp.gr_name.is_null() {
                return None;
            }
            let name = unsafe { std::ffi::CStr::from_ptr(grp.gr_name) };
            return Some(name.to_string_lossy().into_owned());
        }
    }
}

/// Generic platform implementation for non-Unix OSes
#[cfg(not(unix))]
pub struct GenericPlatform;

#[cfg(not(unix))]
impl Platform for GenericPlatform {
    fn file_info(&self, path: &Path) -> io::Result<FileInfo> {
        let meta = fs::metadata(path)?;
        let is_dir = meta.is_dir();
        let mode = if is_dir {
            self.default_dir_permissions()
        } else if meta.permissions().readonly() {
            0o444
        } else {
            self.default_file_permissions()
        };
        Ok(FileInfo {
            mode,
            uid: 0,
            gid: 0,
            size: if is_dir { 0 } else { meta.len() },
            mtime: mtime_of(&meta),
            user_name: String::new(),
            group_name: String::new(),
            is_file: meta.is_file(),
            is_dir,
        })
    }

    fn user_name(&self, _uid: u32) -> Option<String> {
        None
    }

    fn group_name(&self, _gid: u32) -> Option<String> {
        None
    }
}

/// Get the platform implementation for the current OS
pub fn current_platform() -> &'static impl Platform {
    #[cfg(unix)]
    {
        static PLATFORM: UnixPlatform = UnixPlatform;
        &PLATFORM
    }

    #[cfg(not(unix))]
    {
        static PLATFORM: GenericPlatform = GenericPlatform;
        &PLATFORM
    }
}

/// Modification time of a path in Unix seconds.
pub fn modified_secs(path: &Path) -> io::Result<i64> {
    Ok(mtime_of(&fs::metadata(path)?))
}
