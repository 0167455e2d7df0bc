//! Common test helpers for pushlatest-image integration tests
//!
//! Provides:
//! - `FakeRegistry`, an in-memory local store plus remote registry that records calls
//! - Mock executables that stand in for the `docker` binary
//! - `capture_logs`, which collects formatted log lines for assertions

#![allow(dead_code)]

use async_trait::async_trait;
use pushlatest_core::{Error, ImageReference, Result};
use pushlatest_image::{ImageInspect, RegistryGateway};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ─── In-memory Registry ──────────────────────────────────────────────────────

/// Content of a fake image: its layer commands and its package listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeImage {
    pub steps: Vec<String>,
    pub packages: Vec<u8>,
}

impl FakeImage {
    pub fn new(steps: &[&str], packages: &str) -> Self {
        Self {
            steps: steps.iter().map(|s| s.to_string()).collect(),
            packages: packages.as_bytes().to_vec(),
        }
    }
}

#[derive(Debug, Default)]
struct Stores {
    local: HashMap<String, FakeImage>,
    remote: HashMap<String, FakeImage>,
}

/// Recording gateway backed by two maps. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeRegistry {
    stores: Arc<Mutex<Stores>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image to the local store, as `docker build -t` would
    pub fn build(&self, name: &str, image: FakeImage) {
        self.stores
            .lock()
            .unwrap()
            .local
            .insert(name.to_string(), image);
    }

    /// Add an image to the remote registry only
    pub fn publish(&self, name: &str, image: FakeImage) {
        self.stores
            .lock()
            .unwrap()
            .remote
            .insert(name.to_string(), image);
    }

    pub fn remote(&self, name: &str) -> Option<FakeImage> {
        self.stores.lock().unwrap().remote.get(name).cloned()
    }

    /// Every call, formatted as `<operation> <args...>`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the tag and push calls
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("tag ") || c.starts_with("push "))
            .collect()
    }

    /// Whether any call was made for `operation`
    pub fn called(&self, operation: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| c.split(' ').next() == Some(operation))
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn local(&self, image: &ImageReference) -> Result<FakeImage> {
        let name = image.qualified_name();
        self.stores
            .lock()
            .unwrap()
            .local
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::not_found(name))
    }
}

#[async_trait]
impl RegistryGateway for FakeRegistry {
    async fn tag(&self, source: &ImageReference, target: &ImageReference) -> Result<()> {
        self.record(format!("tag {} {}", source, target));
        let image = self.local(source)?;
        self.stores
            .lock()
            .unwrap()
            .local
            .insert(target.qualified_name(), image);
        Ok(())
    }

    async fn push(&self, image: &ImageReference) -> Result<()> {
        self.record(format!("push {}", image));
        let content = self.local(image)?;
        self.stores
            .lock()
            .unwrap()
            .remote
            .insert(image.qualified_name(), content);
        Ok(())
    }

    async fn pull(&self, image: &ImageReference) -> Result<()> {
        self.record(format!("pull {}", image));
        let name = image.qualified_name();
        let mut stores = self.stores.lock().unwrap();
        let content = stores
            .remote
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::not_found(name.clone()))?;
        stores.local.insert(name, content);
        Ok(())
    }

    async fn inspect(&self, image: &ImageReference) -> Result<ImageInspect> {
        self.record(format!("inspect {}", image));
        self.local(image)?;
        Ok(ImageInspect {
            id: format!("sha256:{}", image.repository),
            repo_tags: vec![image.qualified_name()],
            config: serde_json::Value::Null,
        })
    }

    async fn list_construction_steps(&self, image: &ImageReference) -> Result<Vec<String>> {
        self.record(format!("history {}", image));
        Ok(self.local(image)?.steps)
    }

    async fn run_isolated(&self, image: &ImageReference, command: &[String]) -> Result<Vec<u8>> {
        self.record(format!("run {} {}", image, command.join(" ")));
        Ok(self.local(image)?.packages)
    }
}

// ─── Log Capture ─────────────────────────────────────────────────────────────

/// Shared in-memory sink for formatted log output
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's events at `debug` and above into a fresh buffer until
/// the guard is dropped. Lines carry the level and message only.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    (logs, tracing::subscriber::set_default(subscriber))
}

// ─── Process Mock Scripts ────────────────────────────────────────────────────

/// One branch of a conditional mock: when the joined arguments contain
/// `pattern`, print `stdout` and `stderr` and exit with `exit_code`.
pub struct MockBranch<'a> {
    pub pattern: &'a str,
    pub stdout: &'a str,
    pub stderr: &'a str,
    pub exit_code: i32,
}

/// Creates a mock executable that logs each invocation's arguments to
/// `<name>.log` and answers according to the first matching branch.
/// Unmatched invocations print nothing and exit 0.
pub fn create_conditional_mock(
    dir: &std::path::Path,
    name: &str,
    branches: &[MockBranch<'_>],
) -> anyhow::Result<std::path::PathBuf> {
    let script_path = dir.join(name);
    let log_path = dir.join(format!("{}.log", name));

    let mut script = format!(
        r#"#!/bin/sh
echo "$*" >> "{log}"
ALL_ARGS="$*"
"#,
        log = log_path.display(),
    );

    for (i, branch) in branches.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "elif" };
        script.push_str(&format!(
            r#"{keyword} echo "$ALL_ARGS" | grep -qF -- '{pattern}'; then
  cat <<'MOCK_OUT_{i}'
{stdout}
MOCK_OUT_{i}
  cat >&2 <<'MOCK_ERR_{i}'
{stderr}
MOCK_ERR_{i}
  exit {exit_code}
"#,
            keyword = keyword,
            pattern = branch.pattern,
            stdout = branch.stdout,
            stderr = branch.stderr,
            exit_code = branch.exit_code,
            i = i,
        ));
    }
    if !branches.is_empty() {
        script.push_str("fi\n");
    }
    script.push_str("exit 0\n");

    std::fs::write(&script_path, script)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755))?;
    }

    Ok(script_path)
}

/// Read the invocation log for a mock executable.
pub fn read_mock_log(dir: &std::path::Path, name: &str) -> Vec<String> {
    let log_path = dir.join(format!("{}.log", name));
    if log_path.exists() {
        std::fs::read_to_string(&log_path)
            .unwrap_or_default()
            .lines()
            .map(|s| s.to_string())
            .collect()
    } else {
        vec![]
    }
}
