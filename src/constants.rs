// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Memory requirements for the upper resolution tiers
///
/// The sensor's full-resolution modes need a large GPU memory split and
/// enough system memory to hold the ISP buffers. The budget is probed once
/// at startup; tiers whose requirements are not met stay unreachable for
/// the whole session.
pub mod memory {
    /// Memory requirement for one gated resolution tier
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MemoryGate {
        /// Frame width of the gated tier
        pub width: u32,
        /// Minimum GPU-reserved memory in MB
        pub gpu_mb: u64,
        /// Minimum total system memory in MB
        pub system_mb: u64,
    }

    /// Gates for the three largest sensor modes, smallest first
    pub static GATES: [MemoryGate; 3] = [
        MemoryGate {
            width: 2048,
            gpu_mb: 128,
            system_mb: 512,
        },
        MemoryGate {
            width: 3200,
            gpu_mb: 256,
            system_mb: 1024,
        },
        MemoryGate {
            width: 4056,
            gpu_mb: 512,
            system_mb: 2048,
        },
    ];

    /// Get the memory gate for a frame width, if that width is gated
    pub fn gate_for(width: u32) -> Option<&'static MemoryGate> {
        GATES.iter().find(|g| g.width == width)
    }
}

/// Sensor overlay annotation defaults
pub mod annotation {
    /// Default annotation mode flags (custom text + black background)
    pub const DEFAULT_MODE: u32 = 0x0000_065D;

    /// Annotation text size is derived from the frame height with this divisor
    pub const TEXT_SIZE_DIVISOR: u32 = 16;
}

/// Capture file naming
pub mod capture {
    /// Gallery file prefix
    pub const FILE_PREFIX: &str = "DSCF";

    /// Gallery file extension
    pub const FILE_EXTENSION: &str = "JPG";

    /// Sequence numbers are four digits and wrap 9999 -> 0000
    pub const SEQUENCE_MODULO: u32 = 10_000;

    /// Name of the always-overwritten temporary capture file
    pub const TEMP_FILE_NAME: &str = "astrocam-capture.jpg";
}

/// Preview display branch
pub mod display {
    /// Scaled preview width shown on the touchscreen
    pub const PREVIEW_WIDTH: u32 = 640;

    /// Scaled preview height shown on the touchscreen
    pub const PREVIEW_HEIGHT: u32 = 480;
}

/// Optional hardware shutter button
pub mod hardware {
    /// GPIO value file polled by the button monitor; GPIO 3 doubles as the
    /// power button pin on the Pi, which the companion HAT exposes here.
    pub const SHUTTER_BUTTON_GPIO: &str = "/sys/class/gpio/gpio3/value";

    /// Poll interval for the button monitor in milliseconds
    pub const BUTTON_POLL_INTERVAL_MS: u64 = 50;
}

/// Update checker
pub mod update {
    /// GitHub API endpoint for the repository HEAD commit
    pub const COMMITS_URL: &str = "https://api.github.com/repos/astrocam/astrocam/commits/HEAD";

    /// Poll interval between update checks, in seconds
    pub const CHECK_INTERVAL_SECS: u64 = 60 * 60;

    /// Backoff interval after the user declines an upgrade, in seconds
    pub const DECLINED_INTERVAL_SECS: u64 = 60 * 60 * 24;

    /// Shell command that performs the upgrade
    pub const UPGRADE_COMMAND: &str =
        "cd $HOME/workspace/astrocam && git pull && make reinstall";
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
