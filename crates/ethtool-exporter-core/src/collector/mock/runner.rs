//! Canned ethtool responses for testing collectors without the real binary.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::collector::runner::{CommandRunner, EthtoolMode, RunError};

/// What the mock returns for one `(device, mode)` call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Exit status 0 with this stdout.
    Output(Vec<u8>),
    /// Non-zero exit status; no data.
    Failure,
    /// The binary could not be executed.
    Fatal,
}

/// In-memory [`CommandRunner`].
///
/// Calls without a registered response behave like a non-zero exit, which is
/// what ethtool does for an unsupported request. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: HashMap<(String, EthtoolMode), MockResponse>,
    calls: Mutex<Vec<(String, EthtoolMode)>>,
}

impl MockRunner {
    /// Creates a runner with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers text output for `device` in `mode`.
    pub fn add_output(&mut self, device: &str, mode: EthtoolMode, stdout: impl Into<String>) {
        self.responses.insert(
            (device.to_string(), mode),
            MockResponse::Output(stdout.into().into_bytes()),
        );
    }

    /// Registers a raw response for `device` in `mode`.
    pub fn add_response(&mut self, device: &str, mode: EthtoolMode, response: MockResponse) {
        self.responses.insert((device.to_string(), mode), response);
    }

    /// Returns the calls made so far, in order.
    pub fn calls(&self) -> Vec<(String, EthtoolMode)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, device: &str, mode: EthtoolMode) -> Result<Option<Vec<u8>>, RunError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((device.to_string(), mode));
        }
        match self.responses.get(&(device.to_string(), mode)) {
            Some(MockResponse::Output(stdout)) => Ok(Some(stdout.clone())),
            Some(MockResponse::Failure) | None => Ok(None),
            Some(MockResponse::Fatal) => Err(RunError::NotFound(PathBuf::from("ethtool"))),
        }
    }
}
