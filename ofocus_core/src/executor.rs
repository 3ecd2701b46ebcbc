//! Runs generated JXA through `osascript` and unpacks the JSON it prints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::ExecutorConfig;
use crate::error::OmniFocusError;

/// Executes a script body and returns whatever it printed to stdout.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &str) -> Result<String, OmniFocusError>;
}

static SCRIPT_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct OsascriptRunner {
    osascript: PathBuf,
    max_output_bytes: usize,
    timeout: Option<Duration>,
    temp_dir: PathBuf,
}

impl Default for OsascriptRunner {
    fn default() -> Self {
        Self::from_config(&ExecutorConfig::default())
    }
}

impl OsascriptRunner {
    pub fn from_config(cfg: &ExecutorConfig) -> Self {
        Self {
            osascript: cfg.osascript_path.clone(),
            max_output_bytes: cfg.max_output_bytes,
            timeout: cfg.timeout(),
            temp_dir: cfg.temp_dir(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn osascript_path(&self) -> &Path {
        &self.osascript
    }

    fn temp_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = SCRIPT_SEQ.fetch_add(1, Ordering::Relaxed);
        self.temp_dir.join(format!(
            "ofocus-{}-{}-{}.js",
            millis,
            std::process::id(),
            seq
        ))
    }

    async fn execute(&self, path: &Path) -> Result<String, OmniFocusError> {
        let mut child = Command::new(&self.osascript)
            .arg("-l")
            .arg("JavaScript")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                OmniFocusError::Host(format!(
                    "failed to launch {}: {}",
                    self.osascript.display(),
                    e
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| OmniFocusError::Internal("osascript stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| OmniFocusError::Internal("osascript stderr not captured".into()))?;

        let limit = self.max_output_bytes as u64 + 1;
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.take(limit).read_to_end(&mut buf).await;
            buf
        });

        let mut out = Vec::new();
        stdout.take(limit).read_to_end(&mut out).await?;
        if out.len() > self.max_output_bytes {
            let _ = child.start_kill();
            stderr_task.abort();
            return Err(OmniFocusError::OutputTooLarge(self.max_output_bytes));
        }

        let status = child.wait().await?;
        let err = stderr_task.await.unwrap_or_default();
        let stderr_text = String::from_utf8_lossy(&err).trim().to_string();

        if !status.success() {
            if stderr_text.is_empty() {
                return Err(OmniFocusError::Host(format!(
                    "osascript exited with {}",
                    status
                )));
            }
            return Err(classify_failure(&stderr_text));
        }
        if !stderr_text.is_empty() {
            debug!(stderr = %stderr_text, "osascript wrote to stderr");
        }

        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    async fn run(&self, script: &str) -> Result<String, OmniFocusError> {
        let wrapped = wrap_script(script);
        let path = self.temp_path();
        tokio::fs::write(&path, wrapped.as_bytes()).await?;
        let _guard = TempScript(path.clone());
        debug!(path = %path.display(), bytes = wrapped.len(), "running script");

        let run = self.execute(&path);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                OmniFocusError::Timeout(format!(
                    "OmniFocus did not respond within {} seconds",
                    limit.as_secs()
                ))
            })?,
            None => run.await,
        }
    }
}

/// Removes the script file however `run` exits.
struct TempScript(PathBuf);

impl Drop for TempScript {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.0.display(), error = %e, "failed to remove temp script");
            }
        }
    }
}

/// Escape a script body so it can sit inside a JS template literal.
pub fn escape_for_wrapper(script: &str) -> String {
    let mut out = String::with_capacity(script.len() + 16);
    for ch in script.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}

/// The script is evaluated as a function body so a top-level `return` works.
pub fn wrap_script(script: &str) -> String {
    format!(
        "(function () {{\n  var source = `{}`;\n  var result = (new Function(source))();\n  return typeof result === \"string\" ? result : JSON.stringify(result);\n}})();\n",
        escape_for_wrapper(script)
    )
}

/// Map osascript stderr to the error the caller should see.
pub fn classify_failure(stderr: &str) -> OmniFocusError {
    let lower = stderr.to_lowercase();
    if lower.contains("is not running") || stderr.contains("(-600)") {
        return OmniFocusError::AppNotRunning;
    }
    if lower.contains("not authorized to send apple events")
        || lower.contains("not allowed to send apple events")
        || stderr.contains("-1743")
    {
        return OmniFocusError::PermissionDenied;
    }
    OmniFocusError::Host(stderr.to_string())
}

pub fn parse_json_output(raw: &str) -> Result<Value, OmniFocusError> {
    serde_json::from_str(raw.trim()).map_err(|_| OmniFocusError::InvalidJson {
        raw: raw.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Parse stdout and unpack the `{ok, data | error}` envelope into `T`.
pub fn parse_envelope<T: DeserializeOwned>(raw: &str) -> Result<T, OmniFocusError> {
    let value = parse_json_output(raw)?;
    let envelope: Envelope = serde_json::from_value(value)
        .map_err(|e| OmniFocusError::Script(format!("unexpected response shape: {}", e)))?;

    if !envelope.ok {
        let err = envelope.error.unwrap_or(EnvelopeError {
            kind: "failed".to_string(),
            message: "script reported failure without a message".to_string(),
        });
        return Err(match err.kind.as_str() {
            "not_found" => OmniFocusError::NotFound(err.message),
            "invalid" => OmniFocusError::InvalidParams(err.message),
            _ => OmniFocusError::Script(err.message),
        });
    }

    Ok(serde_json::from_value(envelope.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_for_wrapper() {
        assert_eq!(escape_for_wrapper(r"a\b`c${d}"), r"a\\b\`c\${d}");
        assert_eq!(escape_for_wrapper("plain \"text\" 'x'"), "plain \"text\" 'x'");
    }

    #[test]
    fn test_wrap_script_embeds_escaped_body() {
        let wrapped = wrap_script("return `x${1}`;");
        assert!(wrapped.contains(r"var source = `return \`x\${1}\`;`;"));
        assert!(wrapped.contains("new Function(source)"));
    }

    #[test]
    fn test_classify_not_running() {
        let err = classify_failure(
            "execution error: Error: Application isn't running. OmniFocus is not running. (-600)",
        );
        assert!(matches!(err, OmniFocusError::AppNotRunning));
        assert_eq!(
            err.to_string(),
            "OmniFocus is not running. Please launch the application first and try again."
        );
        assert!(matches!(
            classify_failure("execution error: Error (-600)"),
            OmniFocusError::AppNotRunning
        ));
    }

    #[test]
    fn test_classify_permission_denied() {
        for stderr in [
            "execution error: Not authorized to send Apple events to OmniFocus. (-1743)",
            "osascript is not allowed to send Apple events to OmniFocus",
            "Error -1743",
        ] {
            assert!(
                matches!(classify_failure(stderr), OmniFocusError::PermissionDenied),
                "{stderr}"
            );
        }
    }

    #[test]
    fn test_classify_other_keeps_raw_text() {
        let err = classify_failure("execution error: TypeError: undefined is not an object");
        assert_eq!(
            err.to_string(),
            "Script execution failed: execution error: TypeError: undefined is not an object"
        );
    }

    #[test]
    fn test_parse_json_output_reports_raw_text() {
        let err = parse_json_output("not json at all").unwrap_err();
        match &err {
            OmniFocusError::InvalidJson { raw } => assert_eq!(raw, "not json at all"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_parse_envelope_success_and_failure() {
        let n: u32 = parse_envelope(r#"{"ok":true,"data":7}"#).unwrap();
        assert_eq!(n, 7);

        let err = parse_envelope::<Value>(
            r#"{"ok":false,"error":{"kind":"not_found","message":"Task not found: abc"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, OmniFocusError::NotFound(ref m) if m == "Task not found: abc"));

        let err = parse_envelope::<Value>(
            r#"{"ok":false,"error":{"kind":"failed","message":"boom"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, OmniFocusError::Script(_)));
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let runner = OsascriptRunner::default();
        let a = runner.temp_path();
        let b = runner.temp_path();
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ofocus-"));
        assert!(name.ends_with(".js"));
        assert!(name.contains(&format!("-{}-", std::process::id())));
    }
}
