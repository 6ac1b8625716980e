//! Debug snapshot — serializable view of the whole simulation
//!
//! Snapshots are read-only copies. Writing one is best-effort: a failed write
//! is reported to the caller, who logs it and carries on.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fd_stage::StageEvent;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotResult;
use crate::reel::{Reel, ReelPhase};
use crate::rng::RngStrategy;
use crate::symbols::Symbol;

/// Per-reel state as seen by tooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelSnapshot {
    pub index: usize,
    pub spinning: bool,
    pub decelerating: bool,
    pub snap_armed: bool,
    pub speed: f64,
    pub offset: f64,
    pub phase: ReelPhase,
}

impl From<&Reel> for ReelSnapshot {
    fn from(reel: &Reel) -> Self {
        let state = reel.state();
        Self {
            index: reel.index(),
            spinning: state.spinning,
            decelerating: state.decelerating,
            snap_armed: state.snap_armed,
            speed: state.speed,
            offset: state.offset,
            phase: reel.phase(),
        }
    }
}

/// Chain controller state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub active: bool,
    pub spin_id: Option<String>,
    pub chain_index: usize,
    pub countdown_ms: f64,
    pub evaluations: u32,
    pub spins_started: u64,
    pub window_start_ms: Option<f64>,
    pub window_end_ms: Option<f64>,
}

/// Full introspection snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    pub time_ms: f64,
    pub tick: u64,
    pub paused: bool,
    pub step_budget: u32,
    pub debug_enabled: bool,
    pub rng: RngStrategy,
    pub reels: Vec<ReelSnapshot>,
    pub controller: ControllerSnapshot,
    /// Rows top to bottom
    pub grid: Vec<Vec<Symbol>>,
    pub winning_lines: Vec<u8>,
    /// Most recent trace entries, oldest first
    pub log: Vec<StageEvent>,
    /// Trace entries evicted so far
    pub log_dropped: u64,
}

impl DebugSnapshot {
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// On-disk wrapper: snapshot plus wall-clock write time
#[derive(Debug, Serialize)]
struct SnapshotEnvelope<'a> {
    written_at: DateTime<Utc>,
    snapshot: &'a DebugSnapshot,
}

/// Destination for snapshots
pub trait SnapshotSink {
    fn write(&mut self, snapshot: &DebugSnapshot) -> SnapshotResult<()>;
}

/// Writes each snapshot to one JSON file, replacing it atomically
#[derive(Debug, Clone)]
pub struct FileSnapshotSink {
    path: PathBuf,
}

impl FileSnapshotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotSink for FileSnapshotSink {
    fn write(&mut self, snapshot: &DebugSnapshot) -> SnapshotResult<()> {
        let envelope = SnapshotEnvelope {
            written_at: Utc::now(),
            snapshot,
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Snapshot written to {}", self.path.display());
        Ok(())
    }
}

/// Keeps snapshots in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshotSink {
    pub snapshots: Vec<DebugSnapshot>,
}

impl SnapshotSink for MemorySnapshotSink {
    fn write(&mut self, snapshot: &DebugSnapshot) -> SnapshotResult<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fd_stage::Stage;

    fn sample() -> DebugSnapshot {
        DebugSnapshot {
            time_ms: 720.0,
            tick: 36,
            paused: false,
            step_budget: 0,
            debug_enabled: true,
            rng: RngStrategy::Seeded { seed: 1337 },
            reels: vec![ReelSnapshot {
                index: 0,
                spinning: true,
                decelerating: true,
                snap_armed: false,
                speed: 0.03125,
                offset: 3.25,
                phase: ReelPhase::Decelerating,
            }],
            controller: ControllerSnapshot {
                active: true,
                spin_id: Some("spin-000001".into()),
                ..Default::default()
            },
            grid: vec![vec![Symbol::Bell, Symbol::Bar, Symbol::Seven]],
            winning_lines: vec![],
            log: vec![StageEvent::new(Stage::DecelBegin { reel_index: 0 }, 700.0).at_tick(35)],
            log_dropped: 0,
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["rng"]["kind"], "seeded");
        assert_eq!(value["rng"]["seed"], 1337);
        assert_eq!(value["reels"][0]["phase"], "decelerating");
        assert_eq!(value["controller"]["spin_id"], "spin-000001");
        assert_eq!(value["grid"][0][2], "seven");
        assert_eq!(value["log"][0]["stage"]["type"], "decel_begin");

        assert_eq!(DebugSnapshot::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_file_sink_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut sink = FileSnapshotSink::new(&path);

        sink.write(&sample()).unwrap();
        let mut second = sample();
        second.tick = 99;
        sink.write(&second).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["written_at"].is_string());
        assert_eq!(value["snapshot"]["tick"], 99);
        assert!(!dir.path().join("snapshot.json.tmp").exists());
    }

    #[test]
    fn test_file_sink_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSnapshotSink::new(dir.path().join("missing").join("snapshot.json"));
        assert!(sink.write(&sample()).is_err());
    }
}
