//! Filesystem abstraction rooted at a base directory.
//!
//! All paths are relative to the root; a path that would escape it
//! (absolute, or containing `..`) is rejected before touching the disk.

use std::io;
use std::path::{Component, Path, PathBuf};

/// A view of the filesystem anchored at one directory.
#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
}

impl Filesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a relative path onto the root, rejecting escapes.
    fn locate(&self, path: &str) -> io::Result<PathBuf> {
        let rel = Path::new(path);
        let escapes = rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes filesystem root: {path}"),
            ));
        }
        Ok(self.root.join(rel))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.locate(path).map(|p| p.exists()).unwrap_or(false)
    }

    pub fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.locate(path)?)
    }

    pub fn read_to_string(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.locate(path)?)
    }

    /// Writes `contents`, creating missing parent directories.
    pub fn write(&self, path: &str, contents: &[u8]) -> io::Result<()> {
        let target = self.locate(path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(target, contents)
    }

    /// Lists every file under `path`, recursively, as sorted root-relative
    /// paths with `/` separators.
    pub fn list_files(&self, path: &str) -> io::Result<Vec<String>> {
        let mut files = Vec::new();
        let mut pending = vec![self.locate(path)?];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file()
                    && let Ok(rel) = entry.path().strip_prefix(&self.root)
                {
                    files.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Filesystem::new(dir.path());

        fs.write("media/logo.txt", b"quak").unwrap();

        assert!(fs.exists("media/logo.txt"));
        assert_eq!(fs.read("media/logo.txt").unwrap(), b"quak");
        assert_eq!(fs.read_to_string("media/logo.txt").unwrap(), "quak");
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Filesystem::new(dir.path());

        let err = fs.read("../outside").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(fs.read("/etc/hosts").is_err());
        assert!(!fs.exists("../outside"));
    }

    #[test]
    fn list_files_walks_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Filesystem::new(dir.path());
        fs.write("a.txt", b"").unwrap();
        fs.write("styles/site.css", b"").unwrap();
        fs.write("styles/print/print.css", b"").unwrap();

        let files = fs.list_files("").unwrap();

        assert_eq!(files, vec!["a.txt", "styles/print/print.css", "styles/site.css"]);
    }
}
