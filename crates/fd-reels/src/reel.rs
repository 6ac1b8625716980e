//! Reel state machine
//!
//! ```text
//!   Idle ──start──▶ Fast ──begin_decel──▶ Decelerating ──speed hits SLOW──▶ SnapArmed
//!    ▲                                                                        │
//!    └──────────────────── next cell boundary (offset = 0) ◀──────────────────┘
//! ```
//!
//! Offsets are measured in pixels inside the current cell; every time the
//! offset passes `cell_height` the column buffer shifts up one symbol.

use serde::{Deserialize, Serialize};

use crate::column::ColumnBuffer;
use crate::config::ReelPhysics;
use crate::rng::SymbolRng;
use crate::symbols::Symbol;

/// Raw per-reel motion state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReelState {
    pub spinning: bool,
    pub decelerating: bool,
    pub snap_armed: bool,
    /// px/ms, never negative
    pub speed: f64,
    /// px into the current cell, `0 <= offset < cell_height` between updates
    pub offset: f64,
}

impl ReelState {
    /// Phase derived from the flags
    pub fn phase(&self) -> ReelPhase {
        match (self.spinning, self.decelerating, self.snap_armed) {
            (false, _, _) => ReelPhase::Idle,
            (true, _, true) => ReelPhase::SnapArmed,
            (true, true, false) => ReelPhase::Decelerating,
            (true, false, false) => ReelPhase::Fast,
        }
    }

    /// Only a fast-spinning reel may start decelerating
    pub fn can_begin_decel(&self) -> bool {
        self.spinning && !self.decelerating && !self.snap_armed
    }
}

/// Named reel phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReelPhase {
    Idle,
    Fast,
    Decelerating,
    SnapArmed,
}

impl ReelPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ReelPhase::Idle => "idle",
            ReelPhase::Fast => "fast",
            ReelPhase::Decelerating => "decelerating",
            ReelPhase::SnapArmed => "snap_armed",
        }
    }
}

/// Result of a decel command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecelOutcome {
    Started,
    /// Reel was not in the Fast phase; nothing changed
    Ignored(ReelPhase),
}

/// What happened to one reel during one update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReelTick {
    /// Cell boundaries applied (buffer shifts)
    pub boundaries_crossed: u32,
    /// Entered SnapArmed during this update
    pub snap_armed: bool,
    /// Stopped during this update
    pub stopped: bool,
    /// Further boundaries discarded by the snap stop
    pub dropped_boundaries: u32,
}

impl ReelTick {
    /// A snap stop reached more than one boundary in a single update (dt too large)
    pub fn is_overshoot(&self) -> bool {
        self.stopped && self.boundaries_crossed + self.dropped_boundaries > 1
    }
}

/// One reel: state machine plus its column buffer
#[derive(Debug, Clone)]
pub struct Reel {
    index: usize,
    state: ReelState,
    buffer: ColumnBuffer,
}

impl Reel {
    pub fn new(index: usize, buffer: ColumnBuffer) -> Self {
        Self {
            index,
            state: ReelState::default(),
            buffer,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> &ReelState {
        &self.state
    }

    pub fn phase(&self) -> ReelPhase {
        self.state.phase()
    }

    pub fn buffer(&self) -> &ColumnBuffer {
        &self.buffer
    }

    pub fn is_spinning(&self) -> bool {
        self.state.spinning
    }

    /// Visible symbols, top to bottom
    pub fn visible(&self, rows: usize) -> &[Symbol] {
        self.buffer.top_rows(rows)
    }

    /// Enter Fast: offset reset, full speed
    pub fn start(&mut self, physics: &ReelPhysics) {
        self.state = ReelState {
            spinning: true,
            decelerating: false,
            snap_armed: false,
            speed: physics.fast_speed,
            offset: 0.0,
        };
    }

    /// Idempotent decel command. Only a Fast reel reacts; anything else is ignored.
    pub fn begin_decel(&mut self) -> DecelOutcome {
        if !self.state.can_begin_decel() {
            return DecelOutcome::Ignored(self.state.phase());
        }
        self.state.decelerating = true;
        DecelOutcome::Started
    }

    /// Advance by `dt_ms`.
    ///
    /// While snap-armed, the first boundary crossed stops the reel and any
    /// remaining overshoot in this update is discarded rather than replayed.
    pub fn update(
        &mut self,
        dt_ms: f64,
        physics: &ReelPhysics,
        rng: &mut dyn SymbolRng,
    ) -> ReelTick {
        let mut tick = ReelTick::default();
        if !self.state.spinning {
            return tick;
        }

        if self.state.decelerating {
            self.state.speed = (self.state.speed - physics.decel_rate * dt_ms).max(physics.slow_speed);
            if self.state.speed <= physics.slow_speed {
                self.state.speed = physics.slow_speed;
                self.state.decelerating = false;
                self.state.snap_armed = true;
                tick.snap_armed = true;
            }
        }

        self.state.offset += self.state.speed * dt_ms;

        while self.state.offset >= physics.cell_height {
            self.state.offset -= physics.cell_height;
            self.buffer.shift_up(rng);
            tick.boundaries_crossed += 1;

            if self.state.snap_armed {
                tick.dropped_boundaries = (self.state.offset / physics.cell_height).floor() as u32;
                self.stop();
                tick.stopped = true;
                break;
            }
        }

        tick
    }

    fn stop(&mut self) {
        self.state = ReelState::default();
    }
}
