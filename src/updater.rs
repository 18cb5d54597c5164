// SPDX-License-Identifier: GPL-3.0-only

//! Update checker
//!
//! A sleep-poll-prompt loop: fetch the repository HEAD commit from the
//! GitHub API once an hour, compare its short hash with the built version
//! and offer an upgrade on the terminal. Declining backs the poll off to
//! once a day.

use crate::constants::{app_info, update};
use crate::errors::{AppError, AppResult};
use std::io::Write;
use std::process::Command;
use std::time::Duration;
use tracing::{info, warn};

/// Run the update checker until interrupted
pub fn run() -> AppResult<()> {
    let mut sleep = Duration::from_secs(update::CHECK_INTERVAL_SECS);

    loop {
        std::thread::sleep(sleep);

        let remote = match fetch_head_commit() {
            Ok(sha) => sha,
            Err(e) => {
                warn!(error = %e, "Update check failed");
                continue;
            }
        };

        let remote_short = &remote[..remote.len().min(7)];
        let current = app_info::version();
        if current.ends_with(remote_short) {
            info!(version = current, "Already up to date");
            continue;
        }

        info!(current, remote = remote_short, "New version available");
        if prompt_for_upgrade()? {
            upgrade();
        } else {
            sleep = Duration::from_secs(update::DECLINED_INTERVAL_SECS);
        }
    }
}

/// Fetch the HEAD commit hash from the GitHub API
fn fetch_head_commit() -> AppResult<String> {
    let output = Command::new("curl")
        .args(["-s", update::COMMITS_URL])
        .output()
        .map_err(|e| AppError::Other(format!("curl failed: {}", e)))?;

    if !output.status.success() {
        return Err(AppError::Other("curl returned an error".to_string()));
    }

    let body = String::from_utf8_lossy(&output.stdout);
    parse_head_sha(&body).ok_or_else(|| AppError::Other("no sha in API reply".to_string()))
}

/// Extract the commit sha from the API reply
fn parse_head_sha(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("sha")?.as_str().map(str::to_string)
}

/// Ask on the terminal whether to upgrade now
fn prompt_for_upgrade() -> AppResult<bool> {
    print!("New version of astrocam available. Upgrade now? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Pull and reinstall
fn upgrade() {
    info!("Upgrading");
    let status = Command::new("sh")
        .args(["-c", update::UPGRADE_COMMAND])
        .status();
    match status {
        Ok(status) if status.success() => info!("Upgrade complete"),
        Ok(status) => warn!(code = ?status.code(), "Upgrade command failed"),
        Err(e) => warn!(error = %e, "Could not run upgrade command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head_sha() {
        let body = r#"{"sha":"0123456789abcdef","commit":{}}"#;
        assert_eq!(parse_head_sha(body), Some("0123456789abcdef".to_string()));
        assert_eq!(parse_head_sha("{}"), None);
        assert_eq!(parse_head_sha("not json"), None);
    }
}
