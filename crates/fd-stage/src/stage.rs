//! Stage — The core enum defining every observable simulation moment
//!
//! A Stage is NOT a log line and NOT a render instruction.
//! A Stage is the SEMANTIC MEANING of a moment in the spin flow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical simulation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// All reels released at full speed
    SpinStart {
        spin_id: String,
    },

    /// Start request refused (session active or a reel still moving)
    SpinRejected {
        reason: String,
    },

    /// Every reel idle, paylines evaluated exactly once
    EvaluateWins {
        spin_id: String,
        /// Indices of winning paylines
        #[serde(default)]
        winning_lines: Vec<u8>,
    },

    /// Session closed, win window open
    SpinEnd {
        spin_id: String,
        /// End of the win display window (simulation ms)
        window_end_ms: f64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // REEL
    // ═══════════════════════════════════════════════════════════════════════
    /// Chain issued the decel command to this reel
    DecelBegin {
        reel_index: u8,
    },

    /// Duplicate or out-of-phase decel command dropped
    DecelIgnored {
        reel_index: u8,
        /// Phase the reel was in when the command arrived
        phase: String,
    },

    /// Reel reached slow speed, will stop at the next cell boundary
    SnapArmed {
        reel_index: u8,
    },

    /// Reel stopped cleanly on a cell boundary
    ReelStop {
        reel_index: u8,
        /// Visible symbol ids, top to bottom
        #[serde(default)]
        symbols: Vec<u8>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // ANOMALY
    // ═══════════════════════════════════════════════════════════════════════
    /// More than one cell boundary crossed in a single update
    Overshoot {
        reel_index: u8,
        /// Boundaries actually applied
        crossed: u32,
        /// Boundaries discarded by the snap stop
        dropped: u32,
        dt_ms: f64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // CONTROL
    // ═══════════════════════════════════════════════════════════════════════
    Paused,

    Resumed,

    StepQueued {
        frames: u32,
    },

    DumpRequested,

    DebugToggled {
        enabled: bool,
    },

    /// Unknown or malformed command discarded
    CommandRejected {
        raw: String,
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // DIAGNOSTICS
    // ═══════════════════════════════════════════════════════════════════════
    /// Best-effort diagnostic write failed
    DiagnosticFailed {
        target: String,
        reason: String,
    },
}

impl Stage {
    /// Get stage category
    pub fn category(&self) -> StageCategory {
        match self {
            Stage::SpinStart { .. }
            | Stage::SpinRejected { .. }
            | Stage::EvaluateWins { .. }
            | Stage::SpinEnd { .. } => StageCategory::SpinLifecycle,

            Stage::DecelBegin { .. }
            | Stage::DecelIgnored { .. }
            | Stage::SnapArmed { .. }
            | Stage::ReelStop { .. } => StageCategory::Reel,

            Stage::Overshoot { .. } => StageCategory::Anomaly,

            Stage::Paused
            | Stage::Resumed
            | Stage::StepQueued { .. }
            | Stage::DumpRequested
            | Stage::DebugToggled { .. }
            | Stage::CommandRejected { .. } => StageCategory::Control,

            Stage::DiagnosticFailed { .. } => StageCategory::Diagnostics,
        }
    }

    /// Get stage type name (matches the serde tag)
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::SpinStart { .. } => "spin_start",
            Stage::SpinRejected { .. } => "spin_rejected",
            Stage::EvaluateWins { .. } => "evaluate_wins",
            Stage::SpinEnd { .. } => "spin_end",
            Stage::DecelBegin { .. } => "decel_begin",
            Stage::DecelIgnored { .. } => "decel_ignored",
            Stage::SnapArmed { .. } => "snap_armed",
            Stage::ReelStop { .. } => "reel_stop",
            Stage::Overshoot { .. } => "overshoot",
            Stage::Paused => "paused",
            Stage::Resumed => "resumed",
            Stage::StepQueued { .. } => "step_queued",
            Stage::DumpRequested => "dump_requested",
            Stage::DebugToggled { .. } => "debug_toggled",
            Stage::CommandRejected { .. } => "command_rejected",
            Stage::DiagnosticFailed { .. } => "diagnostic_failed",
        }
    }

    /// Reel this stage refers to, if any
    pub fn reel_index(&self) -> Option<u8> {
        match self {
            Stage::DecelBegin { reel_index }
            | Stage::DecelIgnored { reel_index, .. }
            | Stage::SnapArmed { reel_index }
            | Stage::ReelStop { reel_index, .. }
            | Stage::Overshoot { reel_index, .. } => Some(*reel_index),
            _ => None,
        }
    }

    /// Log level this stage is reported at through the `log` facade
    pub fn log_level(&self) -> log::Level {
        match self.category() {
            StageCategory::Anomaly | StageCategory::Diagnostics => log::Level::Warn,
            StageCategory::SpinLifecycle => match self {
                Stage::SpinRejected { .. } => log::Level::Debug,
                _ => log::Level::Info,
            },
            StageCategory::Control => match self {
                Stage::CommandRejected { .. } => log::Level::Warn,
                _ => log::Level::Info,
            },
            StageCategory::Reel => log::Level::Debug,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::SpinStart { spin_id } => write!(f, "spin_start {spin_id}"),
            Stage::SpinRejected { reason } => write!(f, "spin_rejected: {reason}"),
            Stage::EvaluateWins {
                spin_id,
                winning_lines,
            } => write!(f, "evaluate_wins {spin_id} lines={winning_lines:?}"),
            Stage::SpinEnd {
                spin_id,
                window_end_ms,
            } => write!(f, "spin_end {spin_id} window_end={window_end_ms:.1}ms"),
            Stage::DecelBegin { reel_index } => write!(f, "decel_begin reel={reel_index}"),
            Stage::DecelIgnored { reel_index, phase } => {
                write!(f, "decel_ignored reel={reel_index} phase={phase}")
            }
            Stage::SnapArmed { reel_index } => write!(f, "snap_armed reel={reel_index}"),
            Stage::ReelStop {
                reel_index,
                symbols,
            } => write!(f, "reel_stop reel={reel_index} symbols={symbols:?}"),
            Stage::Overshoot {
                reel_index,
                crossed,
                dropped,
                dt_ms,
            } => write!(
                f,
                "overshoot reel={reel_index} crossed={crossed} dropped={dropped} dt={dt_ms:.2}ms"
            ),
            Stage::Paused => write!(f, "paused"),
            Stage::Resumed => write!(f, "resumed"),
            Stage::StepQueued { frames } => write!(f, "step_queued frames={frames}"),
            Stage::DumpRequested => write!(f, "dump_requested"),
            Stage::DebugToggled { enabled } => write!(f, "debug_toggled enabled={enabled}"),
            Stage::CommandRejected { raw, reason } => {
                write!(f, "command_rejected {raw:?}: {reason}")
            }
            Stage::DiagnosticFailed { target, reason } => {
                write!(f, "diagnostic_failed {target}: {reason}")
            }
        }
    }
}

/// Stage category for grouping and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    SpinLifecycle,
    Reel,
    Anomaly,
    Control,
    Diagnostics,
}

impl StageCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SpinLifecycle => "Spin Lifecycle",
            Self::Reel => "Reel",
            Self::Anomaly => "Anomaly",
            Self::Control => "Control",
            Self::Diagnostics => "Diagnostics",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_matches_serde_tag() {
        let stages = vec![
            Stage::SpinStart {
                spin_id: "spin-000001".into(),
            },
            Stage::DecelBegin { reel_index: 1 },
            Stage::ReelStop {
                reel_index: 2,
                symbols: vec![0, 1, 2, 3],
            },
            Stage::Paused,
            Stage::StepQueued { frames: 3 },
        ];

        for stage in stages {
            let json = serde_json::to_value(&stage).unwrap();
            assert_eq!(json["type"], stage.type_name());
        }
    }

    #[test]
    fn test_stage_roundtrip() {
        let stage = Stage::Overshoot {
            reel_index: 0,
            crossed: 1,
            dropped: 2,
            dt_ms: 400.0,
        };
        let json = serde_json::to_string(&stage).unwrap();
        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(stage, back);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            Stage::SnapArmed { reel_index: 0 }.category(),
            StageCategory::Reel
        );
        assert_eq!(Stage::DumpRequested.category(), StageCategory::Control);
        assert_eq!(
            Stage::Overshoot {
                reel_index: 0,
                crossed: 1,
                dropped: 1,
                dt_ms: 1.0
            }
            .log_level(),
            log::Level::Warn
        );
    }

    #[test]
    fn test_reel_index() {
        assert_eq!(Stage::DecelBegin { reel_index: 2 }.reel_index(), Some(2));
        assert_eq!(Stage::Resumed.reel_index(), None);
    }
}
