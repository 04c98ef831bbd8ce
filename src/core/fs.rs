//! Filesystem capability handle.
//!
//! Components that touch the disk receive a `&dyn FileSystem` instead of
//! calling `std::fs` directly. Validation and resolution only ever read;
//! the fetcher and installer are the only callers of the mutating methods.
//! `MemoryFs` is an in-memory stand-in used by the test suites.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub trait FileSystem {
    /// True when `path` is a regular file that can be opened for reading.
    fn is_file(&self, path: &Path) -> bool;
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Absolute form of an existing `path` with links resolved.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// The host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn is_file(&self, path: &Path) -> bool {
        let is_regular = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
        is_regular && fs::File::open(path).is_ok()
    }

    /// Does not follow symlinks: a dangling link still occupies its path.
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

/// In-memory filesystem. Paths are normalized lexically, so `a/./b` and
/// `a/x/../b` address the same entry.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating every ancestor directory.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let path = normalize(path.as_ref());
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        self.files
            .borrow_mut()
            .insert(path, contents.as_ref().to_vec());
    }

    /// Every file path currently stored, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn read_string(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = normalize(path.as_ref());
        self.files
            .borrow()
            .get(&path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn insert_dirs(&self, path: &Path) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.parent().is_none() || self.dirs.borrow().contains(path)
    }
}

impl FileSystem for MemoryFs {
    fn is_file(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(&normalize(path))
    }

    fn exists(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.files.borrow().contains_key(&path) || self.is_dir(&path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .borrow()
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let path = normalize(path);
        let parent_ok = path.parent().map(|p| self.is_dir(p)).unwrap_or(false);
        if !parent_ok {
            return Err(not_found(&path));
        }
        if self.dirs.borrow().contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            ));
        }
        self.files.borrow_mut().insert(path, contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        if self.files.borrow().contains_key(&path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            ));
        }
        self.insert_dirs(&path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        if !self.exists(&path) {
            return Err(not_found(&path));
        }
        self.files.borrow_mut().retain(|p, _| !p.starts_with(&path));
        self.dirs.borrow_mut().retain(|p| !p.starts_with(&path));
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let path = normalize(path);
        if self.exists(&path) {
            Ok(path)
        } else {
            Err(not_found(&path))
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

/// Lexically resolve `.` and `..` components without touching the disk.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => true,
                    _ => false,
                };
                if !popped {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
