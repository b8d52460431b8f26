//! Shared subprocess-driver plumbing for PA11Y/AXE/LIGHTHOUSE (spec §4.3,
//! §6 "Scanner subprocess contract"): argv = `[binary, url, ...flags]`,
//! minimal inherited environment, stdout read as JSON on exit, stderr
//! logged, no stdin.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::domain::outcome::{ScannerId, ScannerOutcome};
use crate::error::DriverError;

/// Run `binary [url, ...extra_args]`, killing it if it doesn't exit
/// within `timeout`. Non-zero exit with non-empty stderr is FAILED; a
/// forced kill on timeout is TIMED_OUT (spec §4.3).
pub async fn run_subprocess_driver(
    scanner: ScannerId,
    binary: &str,
    url: &str,
    extra_args: &[&str],
    timeout: Duration,
) -> ScannerOutcome {
    let started = Instant::now();

    let mut command = Command::new(binary);
    command
        .env_clear()
        .arg(url)
        .args(extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            return ScannerOutcome::failed(
                url.to_string(),
                scanner,
                started.elapsed(),
                DriverError::Spawn(format!("{binary}: {err}")).to_string(),
            );
        }
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let duration = started.elapsed();
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                if !stderr.is_empty() {
                    tracing::warn!(scanner = %scanner, %stderr, "subprocess driver reported failure");
                }
                return ScannerOutcome::failed(
                    url.to_string(),
                    scanner,
                    duration,
                    DriverError::SubprocessFailed { status: output.status.code().unwrap_or(-1), stderr }.to_string(),
                );
            }

            match serde_json::from_slice(&output.stdout) {
                Ok(json) => ScannerOutcome::ok(url.to_string(), scanner, duration, json),
                Err(err) => ScannerOutcome::failed(
                    url.to_string(),
                    scanner,
                    duration,
                    DriverError::MalformedOutput(err.to_string()).to_string(),
                ),
            }
        }
        Ok(Err(err)) => ScannerOutcome::failed(
            url.to_string(),
            scanner,
            started.elapsed(),
            DriverError::Spawn(format!("wait failed: {err}")).to_string(),
        ),
        Err(_) => {
            // Timed out; child is killed on drop (kill_on_drop(true)).
            ScannerOutcome::timed_out(url.to_string(), scanner, timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::ScannerStatus;

    #[tokio::test]
    async fn unspawnable_binary_fails_with_spawn_driver_error() {
        let outcome = run_subprocess_driver(ScannerId::Pa11y, "/no/such/binary-xyz", "http://x.test", &[], Duration::from_secs(1)).await;
        assert_eq!(outcome.status, ScannerStatus::Failed);
        assert!(outcome.error_message.unwrap().starts_with("failed to spawn scanner subprocess:"));
    }
}
