//! Simulation configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::rng::RngMode;

/// Grid specification (rows × columns of symbol cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Visible rows per reel
    pub rows: u8,
    /// Number of reels (columns)
    pub cols: u8,
}

impl GridSpec {
    /// The flip-dot cabinet: 4 rows × 3 reels
    pub fn standard_4x3() -> Self {
        Self { rows: 4, cols: 3 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_4x3()
    }
}

/// Per-reel motion constants. Distances in pixels, time in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelPhysics {
    /// Height of one symbol cell (px)
    pub cell_height: f64,
    /// Full spin speed (px/ms)
    pub fast_speed: f64,
    /// Creep speed at which the reel snap-arms (px/ms)
    pub slow_speed: f64,
    /// Speed lost per ms while decelerating (px/ms²)
    pub decel_rate: f64,
}

impl ReelPhysics {
    /// Time to bleed from fast to slow speed (ms)
    pub fn decel_duration_ms(&self) -> f64 {
        (self.fast_speed - self.slow_speed) / self.decel_rate
    }
}

impl Default for ReelPhysics {
    fn default() -> Self {
        Self {
            cell_height: 8.0,
            fast_speed: 0.06,
            slow_speed: 0.02,
            decel_rate: 0.0001,
        }
    }
}

/// Chain-stop timing (ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainTiming {
    /// Spin start → first reel begins decelerating
    pub first_decel_delay_ms: f64,
    /// Reel N stopped → reel N+1 begins decelerating
    pub between_decel_delay_ms: f64,
    /// How long winning lines stay on display after a spin
    pub win_display_ms: f64,
    /// Half-period of the winning-line blink
    pub blink_period_ms: f64,
}

impl Default for ChainTiming {
    fn default() -> Self {
        Self {
            first_decel_delay_ms: 700.0,
            between_decel_delay_ms: 250.0,
            win_display_ms: 3000.0,
            blink_period_ms: 250.0,
        }
    }
}

/// Tick loop settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Target frame rate of the driver
    pub target_fps: u32,
    /// Upper bound applied to every dt before it reaches the simulation (ms)
    pub max_dt_ms: f64,
}

impl LoopConfig {
    /// Nominal frame length (ms)
    pub fn frame_ms(&self) -> f64 {
        1000.0 / self.target_fps.max(1) as f64
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            max_dt_ms: 50.0,
        }
    }
}

/// Debug port settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Start with periodic snapshots enabled
    pub enabled: bool,
    /// Stage trace capacity
    pub log_capacity: usize,
    /// Trace entries included in each snapshot
    pub snapshot_log_lines: usize,
    /// Periodic snapshot interval while debug is enabled
    pub interval_ticks: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_capacity: 256,
            snapshot_log_lines: 64,
            interval_ticks: 30,
        }
    }
}

/// Flip-dot panel geometry handed to the display collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSpec {
    pub width: u16,
    pub height: u16,
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self {
            width: 28,
            height: 28,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridSpec,
    pub physics: ReelPhysics,
    pub chain: ChainTiming,
    #[serde(rename = "loop")]
    pub looping: LoopConfig,
    pub debug: DebugConfig,
    pub panel: PanelSpec,
    pub rng: RngMode,
}

impl SimConfig {
    /// Slower, more theatrical stops for showroom use
    pub fn demo() -> Self {
        Self {
            physics: ReelPhysics {
                decel_rate: 0.00005,
                slow_speed: 0.015,
                ..ReelPhysics::default()
            },
            chain: ChainTiming {
                first_decel_delay_ms: 1500.0,
                between_decel_delay_ms: 600.0,
                win_display_ms: 5000.0,
                ..ChainTiming::default()
            },
            ..Self::default()
        }
    }

    /// Short delays for quick iteration
    pub fn turbo() -> Self {
        Self {
            physics: ReelPhysics {
                fast_speed: 0.1,
                slow_speed: 0.03,
                decel_rate: 0.0005,
                ..ReelPhysics::default()
            },
            chain: ChainTiming {
                first_decel_delay_ms: 300.0,
                between_decel_delay_ms: 100.0,
                win_display_ms: 1500.0,
                blink_period_ms: 150.0,
            },
            ..Self::default()
        }
    }

    /// Get config for a preset name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "demo" => Some(Self::demo()),
            "turbo" => Some(Self::turbo()),
            _ => None,
        }
    }

    /// Builder: seeded RNG
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.rng = RngMode::Seeded { seed };
        self
    }

    /// Parse a JSON config and validate it
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config and validate it
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let config = match ext.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Check every constraint the simulation relies on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.grid != GridSpec::standard_4x3() {
            return Err(ConfigError::Validation(format!(
                "Grid must be 4 rows x 3 reels, got {} x {}",
                self.grid.rows, self.grid.cols
            )));
        }

        let p = &self.physics;
        let positive = [
            ("cell_height", p.cell_height),
            ("fast_speed", p.fast_speed),
            ("slow_speed", p.slow_speed),
            ("decel_rate", p.decel_rate),
            ("max_dt_ms", self.looping.max_dt_ms),
            ("blink_period_ms", self.chain.blink_period_ms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if p.slow_speed >= p.fast_speed {
            return Err(ConfigError::Validation(format!(
                "slow_speed ({}) must be below fast_speed ({})",
                p.slow_speed, p.fast_speed
            )));
        }

        let delays = [
            ("first_decel_delay_ms", self.chain.first_decel_delay_ms),
            ("between_decel_delay_ms", self.chain.between_decel_delay_ms),
            ("win_display_ms", self.chain.win_display_ms),
        ];
        for (name, value) in delays {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be >= 0, got {value}"
                )));
            }
        }

        if self.looping.target_fps == 0 {
            return Err(ConfigError::Validation("target_fps must be >= 1".into()));
        }

        if self.debug.interval_ticks == 0 {
            return Err(ConfigError::Validation(
                "debug interval_ticks must be >= 1".into(),
            ));
        }

        if self.panel.width == 0 || self.panel.height == 0 {
            return Err(ConfigError::Validation("panel must be non-empty".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for name in ["default", "demo", "turbo"] {
            let config = SimConfig::preset(name).unwrap();
            assert!(config.validate().is_ok(), "{name} preset invalid");
        }
        assert!(SimConfig::preset("nope").is_none());
    }

    #[test]
    fn test_decel_duration() {
        let physics = ReelPhysics::default();
        assert!((physics.decel_duration_ms() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_partial_override() {
        let config = SimConfig::from_json_str(
            r#"{ "chain": { "first_decel_delay_ms": 900.0, "between_decel_delay_ms": 300.0,
                 "win_display_ms": 2000.0, "blink_period_ms": 200.0 },
                 "rng": { "mode": "seeded", "seed": 1337 } }"#,
        )
        .unwrap();

        assert_eq!(config.chain.first_decel_delay_ms, 900.0);
        assert_eq!(config.rng, RngMode::Seeded { seed: 1337 });
        assert_eq!(config.physics, ReelPhysics::default());
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "loop:\n  target_fps: 60\n  max_dt_ms: 40.0\nrng:\n  mode: entropy\n";
        let config = SimConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.looping.target_fps, 60);
        assert_eq!(config.rng, RngMode::Entropy);
    }

    #[test]
    fn test_rejects_wrong_grid() {
        let mut config = SimConfig::default();
        config.grid.cols = 5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_slow_above_fast() {
        let mut config = SimConfig::default();
        config.physics.slow_speed = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_clamp() {
        let mut config = SimConfig::default();
        config.looping.max_dt_ms = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("sim.json");
        std::fs::write(&json_path, r#"{ "rng": { "mode": "seeded", "seed": 5 } }"#).unwrap();
        assert_eq!(
            SimConfig::load(&json_path).unwrap().rng,
            RngMode::Seeded { seed: 5 }
        );

        let txt_path = dir.path().join("sim.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(matches!(
            SimConfig::load(&txt_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
