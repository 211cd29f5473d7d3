// Application configuration types
//
// This module contains:
// - Runtime constants (frame pacing, refresh cadence, particle ranges)
// - The command line interface
// - Settings structs for rendering, attacks and the frame interval

use crate::model::AttackType;
use clap::{Parser, ValueEnum};
use std::ops::Range;
use std::path::PathBuf;
use std::time::{Duration, Instant};

// ============================================================================
// Constants
// ============================================================================

/// Default UI frame interval in milliseconds (~30 fps)
pub const DEFAULT_FRAME_MS: u64 = 33;

/// Minimum frame interval in milliseconds
pub const MIN_FRAME_MS: u64 = 10;

/// Maximum frame interval in milliseconds
pub const MAX_FRAME_MS: u64 = 500;

/// Frame interval adjustment step in milliseconds
pub const FRAME_STEP_MS: u64 = 5;

/// Duration to highlight recently changed frame intervals
pub const CHANGE_HIGHLIGHT_DURATION: Duration = Duration::from_millis(500);

/// Node status and API health are refreshed this often while idle
pub const STATUS_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Delay between a successful launch and opening the live feed,
/// giving the orchestrator time to register the attack
pub const FEED_CONNECT_DELAY: Duration = Duration::from_millis(500);

/// Number of operator log lines kept in memory
pub const LOG_CAPACITY: usize = 200;

/// Per-frame progress range for newly spawned particles
pub const PARTICLE_SPEED_RANGE: Range<f64> = 0.015..0.025;

/// Particles never move slower than this, so every one retires
pub const MIN_PARTICLE_SPEED: f64 = 0.001;

/// Relative size range for newly spawned particles
pub const PARTICLE_SIZE_RANGE: Range<f64> = 2.0..5.0;

/// Spawned particles start up to this far along their path
pub const SPAWN_PROGRESS_JITTER: f64 = 0.1;

/// Fading positions drawn behind each particle
pub const TRAIL_LENGTH: usize = 4;

/// Packets-per-second adjustment step
pub const PPS_STEP: f64 = 10.0;

/// Packets-per-second bounds for the +/- keys
pub const MIN_PPS: f64 = 1.0;
pub const MAX_PPS: f64 = 500.0;

/// HTTP timeout for orchestration API calls
pub const API_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Enums
// ============================================================================

/// Which layout the attack map uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RendererKind {
    /// Two vertical lanes
    Flat,
    /// Depth lanes with an oblique projection (default)
    #[default]
    Isometric,
}

impl RendererKind {
    pub fn toggled(&self) -> Self {
        match self {
            Self::Flat => Self::Isometric,
            Self::Isometric => Self::Flat,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Flat => "2D",
            Self::Isometric => "ISO",
        }
    }
}

// ============================================================================
// Command line
// ============================================================================

/// Terminal attack map for red team / blue team DDoS range exercises
#[derive(Debug, Clone, Parser)]
#[command(name = "strikemap", version, about)]
pub struct Cli {
    /// Base URL of the attack orchestration API
    #[arg(long, env = "STRIKEMAP_API_URL", default_value = "http://localhost:8841")]
    pub api_url: String,

    /// Simulated packets per second for the animation
    #[arg(long, default_value_t = 50.0)]
    pub packets_per_second: f64,

    /// Attack map layout
    #[arg(long, value_enum, default_value_t = RendererKind::Isometric)]
    pub renderer: RendererKind,

    /// UI frame interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
    pub frame_ms: u64,

    /// Write logs to this file (stdout belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Attack type for launches
    #[arg(long, value_enum, default_value_t = AttackType::HttpFlood)]
    pub attack_type: AttackType,

    /// Port on the target to aim at
    #[arg(long, default_value_t = 9080)]
    pub target_port: u16,

    /// Attack duration in seconds
    #[arg(long, default_value_t = 120)]
    pub duration: u32,

    /// Worker count passed to the attack tool
    #[arg(long, default_value_t = 50)]
    pub workers: u32,

    /// Socket count passed to the attack tool
    #[arg(long, default_value_t = 100)]
    pub sockets: u32,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Visual settings for the attack map
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Layout in use (toggle with 'v' key)
    pub renderer: RendererKind,

    /// Spawn rate for the animation (adjust with '+' and '-' keys)
    pub packets_per_second: f64,

    /// Show node names and addresses (toggle with 'l' key)
    pub labels_enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            packets_per_second: 50.0,
            labels_enabled: true,
        }
    }
}

impl RenderSettings {
    /// Raise the spawn rate by one step, clamped to MAX_PPS
    pub fn faster(&mut self) {
        self.packets_per_second = (self.packets_per_second + PPS_STEP).min(MAX_PPS);
    }

    /// Lower the spawn rate by one step, clamped to MIN_PPS
    pub fn slower(&mut self) {
        self.packets_per_second = (self.packets_per_second - PPS_STEP).max(MIN_PPS);
    }
}

/// Parameters sent with every launch
#[derive(Debug, Clone)]
pub struct AttackSettings {
    /// Cycle with the 'y' key
    pub attack_type: AttackType,
    pub target_port: u16,
    pub duration: u32,
    pub workers: u32,
    pub sockets: u32,
    pub enable_ip_spoofing: bool,
    pub spoofed_ips: Vec<String>,
}

impl Default for AttackSettings {
    fn default() -> Self {
        Self {
            attack_type: AttackType::HttpFlood,
            target_port: 9080,
            duration: 120,
            workers: 50,
            sockets: 100,
            enable_ip_spoofing: false,
            spoofed_ips: Vec::new(),
        }
    }
}

/// Configuration for the UI frame interval
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Frame interval in milliseconds (MIN_FRAME_MS to MAX_FRAME_MS)
    pub frame_ms: u64,

    /// Timestamp of last interval change (for visual feedback)
    pub last_change: Option<Instant>,
}

impl RefreshConfig {
    /// Create a new RefreshConfig, clamping the interval into range
    pub fn new(frame_ms: u64) -> Self {
        Self {
            frame_ms: frame_ms.clamp(MIN_FRAME_MS, MAX_FRAME_MS),
            last_change: None,
        }
    }

    /// Get frame interval as Duration
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Whether the interval changed within CHANGE_HIGHLIGHT_DURATION
    pub fn recently_changed(&self) -> bool {
        self.last_change
            .map(|t| t.elapsed() < CHANGE_HIGHLIGHT_DURATION)
            .unwrap_or(false)
    }

    /// Shorten the interval by one step (more frames per second)
    pub fn speed_up(&mut self) {
        self.frame_ms = self.frame_ms.saturating_sub(FRAME_STEP_MS).max(MIN_FRAME_MS);
        self.last_change = Some(Instant::now());
    }

    /// Lengthen the interval by one step (fewer frames per second)
    pub fn slow_down(&mut self) {
        self.frame_ms = self.frame_ms.saturating_add(FRAME_STEP_MS).min(MAX_FRAME_MS);
        self.last_change = Some(Instant::now());
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["strikemap"]);
        assert_eq!(cli.packets_per_second, 50.0);
        assert_eq!(cli.renderer, RendererKind::Isometric);
        assert_eq!(cli.frame_ms, DEFAULT_FRAME_MS);
        assert_eq!(cli.attack_type, AttackType::HttpFlood);
        assert_eq!(cli.target_port, 9080);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "strikemap",
            "--api-url",
            "http://10.72.200.63:8841",
            "--renderer",
            "flat",
            "--attack-type",
            "syn_flood",
            "--packets-per-second",
            "10",
        ]);
        assert_eq!(cli.api_url, "http://10.72.200.63:8841");
        assert_eq!(cli.renderer, RendererKind::Flat);
        assert_eq!(cli.attack_type, AttackType::SynFlood);
        assert_eq!(cli.packets_per_second, 10.0);
    }

    #[test]
    fn test_renderer_toggle() {
        assert_eq!(RendererKind::Flat.toggled(), RendererKind::Isometric);
        assert_eq!(RendererKind::Isometric.toggled(), RendererKind::Flat);
    }

    #[test]
    fn test_refresh_config_clamps() {
        assert_eq!(RefreshConfig::new(1).frame_ms, MIN_FRAME_MS);
        assert_eq!(RefreshConfig::new(10_000).frame_ms, MAX_FRAME_MS);

        let mut config = RefreshConfig::default();
        assert!(!config.recently_changed());
        config.speed_up();
        assert_eq!(config.frame_ms, DEFAULT_FRAME_MS - FRAME_STEP_MS);
        assert!(config.recently_changed());
    }

    #[test]
    fn test_pps_steps_are_clamped() {
        let mut settings = RenderSettings {
            packets_per_second: MIN_PPS,
            ..RenderSettings::default()
        };
        settings.slower();
        assert_eq!(settings.packets_per_second, MIN_PPS);

        settings.packets_per_second = MAX_PPS - 1.0;
        settings.faster();
        assert_eq!(settings.packets_per_second, MAX_PPS);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any sequence of interval adjustments stays within bounds
        #[test]
        fn prop_frame_interval_stays_in_bounds(
            steps in prop::collection::vec(any::<bool>(), 0..200),
        ) {
            let mut config = RefreshConfig::default();
            for faster in steps {
                if faster {
                    config.speed_up();
                } else {
                    config.slow_down();
                }
                prop_assert!(config.frame_ms >= MIN_FRAME_MS);
                prop_assert!(config.frame_ms <= MAX_FRAME_MS);
            }
        }
    }
}
