//! Shared fixtures for integration tests.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use link_dispatch::observability::TimeoutReporter;
use link_dispatch::MatcherTimeoutError;
use tempfile::TempDir;

/// The sample dispatch setup: Safari for Apple, `.vm` hosts stay in the
/// default browser, Reddit in Brave.
pub const SAMPLE_CONFIG: &str = r#"
default_browser = "Firefox Developer Edition"

[[rules]]
name = "apple"
domains = ["apple.com", "example.org"]
browser = "Safari"

[[rules]]
name = "vm"
contains = ".vm"
browser = "Firefox Developer Edition"

[[rules]]
name = "reddit"
domains = ["reddit.com"]
browser = "Brave Browser"
"#;

/// Write `contents` to `link-dispatch.toml` inside a fresh temp dir.
/// Keep the returned `TempDir` alive for as long as the file is needed.
pub fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("link-dispatch.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

/// Collects every reported timeout.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub seen: Mutex<Vec<MatcherTimeoutError>>,
}

impl TimeoutReporter for RecordingReporter {
    fn report(&self, error: &MatcherTimeoutError) {
        self.seen.lock().unwrap().push(error.clone());
    }
}
