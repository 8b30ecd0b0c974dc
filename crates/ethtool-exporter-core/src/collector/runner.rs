//! Invocation of the external `ethtool` binary.
//!
//! The `CommandRunner` trait lets the collector run the real tool on Linux or
//! return canned output in tests.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, error};

/// Directories appended to `$PATH` when looking for ethtool; it usually lives
/// in an sbin directory that unprivileged users do not have on their path.
const EXTRA_SEARCH_DIRS: [&str; 2] = ["/usr/sbin", "/sbin"];

/// Which ethtool report to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EthtoolMode {
    /// `ethtool <dev>`: link settings.
    Settings,
    /// `ethtool -S <dev>`: NIC/driver statistics.
    Statistics,
    /// `ethtool -i <dev>`: driver information.
    DriverInfo,
    /// `ethtool -m <dev>`: plug-in module EEPROM and diagnostics.
    ModuleInfo,
}

impl EthtoolMode {
    /// Command-line flag for this mode, if any.
    pub fn flag(self) -> Option<&'static str> {
        match self {
            EthtoolMode::Settings => None,
            EthtoolMode::Statistics => Some("-S"),
            EthtoolMode::DriverInfo => Some("-i"),
            EthtoolMode::ModuleInfo => Some("-m"),
        }
    }
}

/// Error type for runner failures.
///
/// Every variant is fatal: when the binary is missing or not executable no
/// device could ever be collected. A non-zero exit for one device is *not* an
/// error; it is reported as `Ok(None)`, and so is any other spawn failure
/// such as `EAGAIN` or `EMFILE`.
#[derive(Debug)]
pub enum RunError {
    /// The ethtool binary does not exist.
    NotFound(PathBuf),
    /// The ethtool binary exists but cannot be executed.
    PermissionDenied { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::NotFound(path) => write!(f, "{} not found", path.display()),
            RunError::PermissionDenied { path, source } => {
                write!(f, "permission error trying to run {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::NotFound(_) => None,
            RunError::PermissionDenied { source, .. } => Some(source),
        }
    }
}

/// Sorts a spawn failure into fatal and per-device.
///
/// Returns `Err` for the fatal kinds and hands every other error back as
/// `Ok` so the caller can log it and move on to the next device.
fn classify_spawn_error(path: &Path, e: io::Error) -> Result<io::Error, RunError> {
    match e.kind() {
        io::ErrorKind::NotFound => Err(RunError::NotFound(path.to_path_buf())),
        io::ErrorKind::PermissionDenied => Err(RunError::PermissionDenied {
            path: path.to_path_buf(),
            source: e,
        }),
        _ => Ok(e),
    }
}

/// Runs ethtool for a device and returns its stdout.
pub trait CommandRunner: Send + Sync {
    /// Runs the tool in `mode` for `device`.
    ///
    /// # Returns
    /// - `Ok(Some(stdout))` when the tool exited with status 0
    /// - `Ok(None)` when it exited non-zero (logged; no data for this call)
    /// - `Err(_)` when the binary is missing or not executable
    fn run(&self, device: &str, mode: EthtoolMode) -> Result<Option<Vec<u8>>, RunError>;
}

/// Runs the real ethtool binary as a blocking subprocess.
#[derive(Debug, Clone)]
pub struct EthtoolRunner {
    path: PathBuf,
}

impl EthtoolRunner {
    /// Creates a runner for the binary at `path`.
    ///
    /// Fails with [`RunError::NotFound`] if nothing exists at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, RunError> {
        let path = path.into();
        if !path.is_file() {
            return Err(RunError::NotFound(path));
        }
        Ok(Self { path })
    }

    /// Locates `ethtool` on `$PATH`, `/usr/sbin` and `/sbin`.
    pub fn locate() -> Result<Self, RunError> {
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        find_executable("ethtool", &path_var)
            .ok_or_else(|| RunError::NotFound(PathBuf::from("ethtool")))
            .and_then(Self::new)
    }

    /// Path of the binary this runner executes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command_args(mode: EthtoolMode, device: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(2);
        if let Some(flag) = mode.flag() {
            args.push(flag.to_string());
        }
        args.push(device.to_string());
        args
    }
}

impl CommandRunner for EthtoolRunner {
    fn run(&self, device: &str, mode: EthtoolMode) -> Result<Option<Vec<u8>>, RunError> {
        let args = Self::command_args(mode, device);
        debug!(command = %self.path.display(), ?args, "running ethtool");

        let output = match Command::new(&self.path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                let e = classify_spawn_error(&self.path, e)?;
                error!(device, ?mode, error = %e, "failed to run ethtool");
                return Ok(None);
            }
        };

        if !output.status.success() {
            error!(
                device,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "ethtool returned non-zero return code"
            );
            return Ok(None);
        }

        Ok(Some(output.stdout))
    }
}

/// Searches `name` in `path_var` followed by the sbin directories.
///
/// Returns the first candidate that is a regular file with an execute bit set.
pub fn find_executable(name: &str, path_var: &OsString) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .chain(EXTRA_SEARCH_DIRS.iter().map(PathBuf::from))
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flags() {
        assert_eq!(EthtoolMode::Settings.flag(), None);
        assert_eq!(EthtoolMode::Statistics.flag(), Some("-S"));
        assert_eq!(EthtoolMode::DriverInfo.flag(), Some("-i"));
        assert_eq!(EthtoolMode::ModuleInfo.flag(), Some("-m"));
    }

    #[test]
    fn test_command_args() {
        assert_eq!(
            EthtoolRunner::command_args(EthtoolMode::Settings, "eth0"),
            vec!["eth0"]
        );
        assert_eq!(
            EthtoolRunner::command_args(EthtoolMode::ModuleInfo, "eth0"),
            vec!["-m", "eth0"]
        );
    }

    #[test]
    fn test_new_missing_binary() {
        let err = EthtoolRunner::new("/nonexistent/sbin/ethtool").unwrap_err();
        assert!(matches!(err, RunError::NotFound(_)));
        assert_eq!(err.to_string(), "/nonexistent/sbin/ethtool not found");
    }

    #[test]
    fn test_spawn_error_classification() {
        let path = Path::new("/usr/sbin/ethtool");

        let err = classify_spawn_error(path, io::ErrorKind::NotFound.into()).unwrap_err();
        assert!(matches!(err, RunError::NotFound(_)));

        let err = classify_spawn_error(path, io::ErrorKind::PermissionDenied.into()).unwrap_err();
        assert!(matches!(err, RunError::PermissionDenied { .. }));

        // EAGAIN/EMFILE only cost the current device.
        let soft = classify_spawn_error(path, io::ErrorKind::WouldBlock.into()).unwrap();
        assert_eq!(soft.kind(), io::ErrorKind::WouldBlock);
        let soft = classify_spawn_error(path, io::Error::other("too many open files")).unwrap();
        assert_eq!(soft.kind(), io::ErrorKind::Other);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("ethtool-test-stub");
        std::fs::write(&tool, "").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        let plain = dir.path().join("not-executable");
        std::fs::write(&plain, "").unwrap();

        let path_var = OsString::from(dir.path());
        assert_eq!(find_executable("ethtool-test-stub", &path_var), Some(tool));
        assert_eq!(find_executable("not-executable", &path_var), None);
        assert_eq!(find_executable("missing-tool-12345", &path_var), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_run_captures_stdout() {
        // echo prints its arguments, which checks the argument order too.
        let Ok(runner) = EthtoolRunner::new("/bin/echo") else {
            return;
        };
        let out = runner.run("eth0", EthtoolMode::Statistics).unwrap().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "-S eth0\n");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_run_non_zero_exit_is_no_data() {
        let Ok(runner) = EthtoolRunner::new("/bin/false") else {
            return;
        };
        assert!(runner.run("eth0", EthtoolMode::Settings).unwrap().is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_run_permission_denied_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("ethtool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();

        let runner = EthtoolRunner::new(&tool).unwrap();
        let err = runner.run("eth0", EthtoolMode::Settings).unwrap_err();
        assert!(matches!(err, RunError::PermissionDenied { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_run_removed_binary_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("ethtool");
        std::fs::write(&tool, "").unwrap();
        let runner = EthtoolRunner::new(&tool).unwrap();
        std::fs::remove_file(&tool).unwrap();

        let err = runner.run("eth0", EthtoolMode::Settings).unwrap_err();
        assert!(matches!(err, RunError::NotFound(_)));
    }
}
