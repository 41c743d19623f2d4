//! External commands bounded by a timeout.

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tokio::time::timeout;

use super::ExtractionError;

/// Run `command` and return its stdout.
///
/// The child is killed once `limit` elapses. A non-zero exit status is an
/// error carrying the trimmed stderr.
pub(crate) fn run_with_timeout(command: Command, limit: Duration) -> Result<Vec<u8>, ExtractionError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let fail = |reason: String| ExtractionError::Command {
        command: program.clone(),
        reason,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| fail(e.to_string()))?;

    let mut command = tokio::process::Command::from(command);
    command.stdin(Stdio::null()).kill_on_drop(true);

    let started = Instant::now();
    let out = runtime
        .block_on(async { timeout(limit, command.output()).await })
        .map_err(|_| fail(format!("timed out after {}", humantime::format_duration(limit))))?
        .map_err(|e| fail(e.to_string()))?;

    if !out.status.success() {
        let message = String::from_utf8_lossy(&out.stderr).trim().to_string();
        return Err(fail(if message.is_empty() {
            format!("exited with {}", out.status)
        } else {
            message
        }));
    }

    tracing::debug!(
        command = %program,
        elapsed_ms = started.elapsed().as_millis() as u64,
        bytes = out.stdout.len(),
        "Command finished"
    );
    Ok(out.stdout)
}
