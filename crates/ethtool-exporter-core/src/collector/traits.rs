//! Filesystem seam for interface discovery.
//!
//! The `FileSystem` trait lets interface discovery read the real
//! `/sys/class/net` on Linux or an in-memory tree in tests.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for the filesystem operations interface discovery needs.
pub trait FileSystem: Send + Sync {
    /// Returns the full paths of the entries of `path`, in enumeration order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reads the target of a symbolic link.
    ///
    /// Fails with an error if `path` is not a symlink.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Checks if a path is a symbolic link (without following it).
    fn is_symlink(&self, path: &Path) -> bool;
}

/// `/sys` as the kernel exposes it.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), "").unwrap();
        std::fs::write(dir.path().join("b"), "").unwrap();

        let fs = RealFs::new();
        let entries = fs.read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("eth0");
        let plain = dir.path().join("bonding_masters");
        std::os::unix::fs::symlink("../../devices/pci0000:00/0000:00:03.0/net/eth0", &link)
            .unwrap();
        std::fs::write(&plain, "").unwrap();

        let fs = RealFs::new();
        assert!(fs.is_symlink(&link));
        assert!(!fs.is_symlink(&plain));
        assert_eq!(
            fs.read_link(&link).unwrap(),
            PathBuf::from("../../devices/pci0000:00/0000:00:03.0/net/eth0")
        );
        assert!(fs.read_link(&plain).is_err());
    }

    #[test]
    fn test_real_fs_missing_dir() {
        let fs = RealFs::new();
        assert!(fs.read_dir(Path::new("/nonexistent/path/12345")).is_err());
    }
}
