// SPDX-License-Identifier: GPL-3.0-only

//! Board-level probes
//!
//! Memory budget for the resolution gate (queried once at startup) and the
//! optional hardware shutter button. Absent hardware degrades the feature,
//! never the session.

use std::path::Path;
use std::process::Command;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::hardware;

/// Memory available to the session, probed once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBudget {
    /// GPU-reserved memory in MB
    pub gpu_mb: u64,
    /// Total system memory in MB
    pub system_mb: u64,
}

impl MemoryBudget {
    /// Create a budget from known values
    pub const fn new(gpu_mb: u64, system_mb: u64) -> Self {
        Self { gpu_mb, system_mb }
    }

    /// Probe the board
    ///
    /// A failing probe reports zero, which keeps the gated resolution
    /// tiers unreachable.
    pub fn probe() -> Self {
        let budget = Self {
            gpu_mb: gpu_memory_mb(),
            system_mb: system_memory_mb(),
        };
        info!(
            gpu_mb = budget.gpu_mb,
            system_mb = budget.system_mb,
            "Probed memory budget"
        );
        budget
    }
}

/// GPU memory split via the firmware tool
fn gpu_memory_mb() -> u64 {
    let output = Command::new("vcgencmd").args(["get_mem", "gpu"]).output();

    match output {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            parse_gpu_mem(&stdout).unwrap_or_else(|| {
                warn!(reply = %stdout.trim(), "Unexpected vcgencmd reply");
                0
            })
        }
        _ => {
            warn!("vcgencmd not available, GPU memory unknown");
            0
        }
    }
}

/// Parse a `gpu=76M` style vcgencmd reply
fn parse_gpu_mem(reply: &str) -> Option<u64> {
    reply
        .trim()
        .strip_prefix("gpu=")?
        .trim_end_matches('M')
        .parse()
        .ok()
}

/// Total system memory via sysinfo(2)
fn system_memory_mb() -> u64 {
    // SAFETY: sysinfo only writes into the zeroed struct we hand it
    let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::sysinfo(&mut info) };
    if rc != 0 {
        warn!("sysinfo failed, system memory unknown");
        return 0;
    }

    let bytes = info.totalram as u64 * info.mem_unit as u64;
    bytes / (1024 * 1024)
}

/// Spawn the hardware shutter-button monitor
///
/// Polls a GPIO value file and invokes `on_press` on each released-to-
/// pressed edge. The thread never touches controller or session state;
/// the callback is expected to post a message into the UI channel.
///
/// Returns `None` when the GPIO is not exported, which disables the
/// feature for the session.
pub fn spawn_button_monitor(
    device: &Path,
    on_press: impl Fn() + Send + 'static,
) -> Option<JoinHandle<()>> {
    if !device.exists() {
        info!(device = %device.display(), "Hardware button not present, monitoring disabled");
        return None;
    }

    let device = device.to_path_buf();
    let interval = Duration::from_millis(hardware::BUTTON_POLL_INTERVAL_MS);

    let handle = std::thread::Builder::new()
        .name("button-monitor".to_string())
        .spawn(move || {
            debug!(device = %device.display(), "Button monitor started");
            let mut pressed = false;
            loop {
                let level = std::fs::read_to_string(&device)
                    .map(|s| s.trim() == "1")
                    .unwrap_or(false);
                if level && !pressed {
                    on_press();
                }
                pressed = level;
                std::thread::sleep(interval);
            }
        })
        .ok()?;

    Some(handle)
}
