//! In-memory mock filesystem for testing interface discovery without a real
//! `/sys/class/net`.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Holds directories, plain files and symlinks. Only what interface discovery
/// looks at is modelled: names, link targets and the symlink bit.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from symlink path to its (unresolved) target.
    links: HashMap<PathBuf, PathBuf>,
    /// Plain files; contents are irrelevant to discovery.
    files: HashSet<PathBuf>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Adds a symlink pointing at `target`. Parent directories are created.
    pub fn add_symlink(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.links.insert(path, target.as_ref().to_path_buf());
    }

    /// Adds a regular file. Parent directories are created.
    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path);
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a physical NIC the way the kernel exposes it: a symlink into the
    /// PCI device tree.
    pub fn add_physical_nic(&mut self, root: impl AsRef<Path>, name: &str) {
        let target = format!("../../devices/pci0000:00/0000:00:1c.0/0000:03:00.0/net/{name}");
        self.add_symlink(root.as_ref().join(name), target);
    }

    /// Adds a virtual device (loopback, bridge, veth...): a symlink into
    /// `devices/virtual`.
    pub fn add_virtual_nic(&mut self, root: impl AsRef<Path>, name: &str) {
        let target = format!("../../devices/virtual/net/{name}");
        self.add_symlink(root.as_ref().join(name), target);
    }
}

impl FileSystem for MockFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        let children = self
            .links
            .keys()
            .chain(self.files.iter())
            .chain(self.directories.iter());
        for child in children {
            if child.parent().is_some_and(|parent| parent == path) && child != path {
                entries.insert(child.clone());
            }
        }

        // Sorted so fixtures enumerate devices in a stable order.
        let mut entries: Vec<PathBuf> = entries.into_iter().collect();
        entries.sort();
        Ok(entries)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.links.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {:?}", path),
            )
        })
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.links.contains_key(path)
    }
}
