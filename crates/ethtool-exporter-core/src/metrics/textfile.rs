//! Textfile output for the node_exporter textfile collector.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::metrics::{Collection, format_prometheus};

/// Writes `collection` to `path` in exposition format.
///
/// The file is written atomically via a temporary file in the same directory,
/// so a concurrent reader never sees a partial file.
pub fn write_textfile(path: &Path, collection: &Collection) -> io::Result<()> {
    let tmp_path = temp_path(path);
    let body = format_prometheus(collection);

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(body.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// `<path>.<pid>.tmp`, next to the target.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    PathBuf::from(name)
}
