//! SimulationContext — owns every piece of mutable simulation state
//!
//! One context per simulated machine. Nothing here is shared or locked; the
//! loop driving a context calls [`SimulationContext::tick`] once per frame.
//!
//! ## Tick order
//!
//! 1. Poll the command source (at most one message)
//! 2. Skip the update when paused with no step budget
//! 3. Controller update → every reel update → completion check

use fd_stage::{Stage, StageTrace};

use crate::chain::{ChainController, SpinCompletion};
use crate::column::ColumnBuffer;
use crate::command::{parse_command, Command, CommandSource};
use crate::config::SimConfig;
use crate::error::ConfigResult;
use crate::grid::Grid;
use crate::paytable::PaylineSet;
use crate::reel::{DecelOutcome, Reel};
use crate::render::RenderFrame;
use crate::rng::{RngStrategy, SymbolRng};
use crate::snapshot::{ControllerSnapshot, DebugSnapshot, ReelSnapshot};
use crate::timing::{blink_on, clamp_dt};

/// What one loop tick did
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// Loop tick number (1-based)
    pub tick: u64,
    /// Clamped dt applied, 0 when the update was skipped
    pub dt_ms: f64,
    /// Command applied this tick
    pub command: Option<Command>,
    /// Whether the simulation advanced
    pub updated: bool,
    /// Session closed this tick
    pub completion: Option<SpinCompletion>,
    /// A snapshot should be written (dump request or debug interval)
    pub snapshot_due: bool,
}

pub struct SimulationContext {
    config: SimConfig,
    rng: Box<dyn SymbolRng>,
    reels: Vec<Reel>,
    paylines: PaylineSet,
    chain: ChainController,
    trace: StageTrace,
    time_ms: f64,
    tick_count: u64,
    paused: bool,
    step_budget: u32,
    debug_enabled: bool,
    dump_requested: bool,
}

impl SimulationContext {
    /// Validate `config` and build the RNG strategy it names
    pub fn new(config: SimConfig) -> ConfigResult<Self> {
        config.validate()?;
        let rng = config.rng.build();
        Ok(Self::with_rng(config, rng))
    }

    /// Build around an explicit RNG strategy (config is trusted as-is)
    pub fn with_rng(config: SimConfig, mut rng: Box<dyn SymbolRng>) -> Self {
        let rows = config.grid.rows as usize;
        let reels = (0..config.grid.cols as usize)
            .map(|i| Reel::new(i, ColumnBuffer::for_rows(rows, rng.as_mut())))
            .collect::<Vec<_>>();

        match rng.strategy() {
            RngStrategy::Seeded { seed } => log::info!("Symbol RNG: seeded (seed {seed})"),
            RngStrategy::Entropy => log::info!("Symbol RNG: entropy"),
        }

        Self {
            chain: ChainController::new(config.chain, reels.len()),
            trace: StageTrace::with_capacity(config.debug.log_capacity),
            debug_enabled: config.debug.enabled,
            paylines: PaylineSet::standard_4x3(),
            reels,
            rng,
            config,
            time_ms: 0.0,
            tick_count: 0,
            paused: false,
            step_budget: 0,
            dump_requested: false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOOP
    // ═══════════════════════════════════════════════════════════════════════

    /// One loop iteration
    pub fn tick(&mut self, dt_ms: f64, source: &mut dyn CommandSource) -> TickReport {
        self.tick_count += 1;
        let mut report = TickReport {
            tick: self.tick_count,
            ..Default::default()
        };

        match source.poll() {
            Ok(Some(raw)) => report.command = self.submit_raw(&raw),
            Ok(None) => {}
            Err(e) => self.emit(Stage::DiagnosticFailed {
                target: "commands".into(),
                reason: e.to_string(),
            }),
        }

        if !self.paused || self.step_budget > 0 {
            if self.paused {
                self.step_budget -= 1;
            }
            report.dt_ms = clamp_dt(dt_ms, self.config.looping.max_dt_ms);
            report.completion = self.update(dt_ms);
            report.updated = true;
        }

        let interval_hit =
            self.debug_enabled && self.tick_count % self.config.debug.interval_ticks.max(1) == 0;
        report.snapshot_due = std::mem::take(&mut self.dump_requested) || interval_hit;
        report
    }

    /// Parse and apply one raw message. Rejected messages are logged and dropped.
    pub fn submit_raw(&mut self, raw: &str) -> Option<Command> {
        match parse_command(raw) {
            Ok(command) => {
                self.apply(command);
                Some(command)
            }
            Err(e) => {
                self.emit(Stage::CommandRejected {
                    raw: raw.chars().take(120).collect(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Spin => {
                self.start_spin();
            }
            Command::Pause => {
                self.paused = true;
                self.step_budget = 0;
                self.emit(Stage::Paused);
            }
            Command::Resume => {
                self.paused = false;
                self.step_budget = 0;
                self.emit(Stage::Resumed);
            }
            Command::Step { frames } => {
                self.paused = true;
                self.step_budget = frames;
                self.emit(Stage::StepQueued { frames });
            }
            Command::Dump => {
                self.dump_requested = true;
                self.emit(Stage::DumpRequested);
            }
            Command::ToggleDebug => {
                self.debug_enabled = !self.debug_enabled;
                self.emit(Stage::DebugToggled {
                    enabled: self.debug_enabled,
                });
            }
        }
    }

    /// Advance the simulation by `dt_ms` (clamped), regardless of pause state
    pub fn update(&mut self, dt_ms: f64) -> Option<SpinCompletion> {
        let dt = clamp_dt(dt_ms, self.config.looping.max_dt_ms);
        self.time_ms += dt;

        if let Some(index) = self.chain.update(dt, &self.reels) {
            self.begin_decel(index);
        }

        let rows = self.config.grid.rows as usize;
        let mut stages = Vec::new();
        let mut stopped = Vec::new();
        for reel in &mut self.reels {
            let tick = reel.update(dt, &self.config.physics, self.rng.as_mut());
            let reel_index = reel.index() as u8;

            if tick.snap_armed {
                stages.push(Stage::SnapArmed { reel_index });
            }
            if tick.is_overshoot() {
                stages.push(Stage::Overshoot {
                    reel_index,
                    crossed: tick.boundaries_crossed,
                    dropped: tick.dropped_boundaries,
                    dt_ms: dt,
                });
            }
            if tick.stopped {
                stages.push(Stage::ReelStop {
                    reel_index,
                    symbols: reel.visible(rows).iter().map(|s| s.id()).collect(),
                });
                stopped.push(reel.index());
            }
        }
        for stage in stages {
            self.emit(stage);
        }
        for index in stopped {
            self.chain.on_reel_stopped(index);
        }

        let (reels, paylines) = (&self.reels, &self.paylines);
        let completion = self.chain.try_complete(self.time_ms, reels, || {
            let grid = Grid::from_reels(reels, rows);
            paylines.evaluate(&grid).iter().map(|l| l.index).collect()
        })?;

        self.emit(Stage::EvaluateWins {
            spin_id: completion.spin_id.clone(),
            winning_lines: completion.winning_lines.clone(),
        });
        self.emit(Stage::SpinEnd {
            spin_id: completion.spin_id.clone(),
            window_end_ms: completion.window_end_ms,
        });
        Some(completion)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN CONTROL
    // ═══════════════════════════════════════════════════════════════════════

    /// Start a spin. Refused (and logged) while a session is active or any reel moves.
    pub fn start_spin(&mut self) -> bool {
        let spin_id = match self.chain.start(self.time_ms, &self.reels) {
            Ok(session) => session.spin_id.clone(),
            Err(rejection) => {
                self.emit(Stage::SpinRejected {
                    reason: rejection.reason().into(),
                });
                return false;
            }
        };

        for reel in &mut self.reels {
            reel.start(&self.config.physics);
        }
        self.emit(Stage::SpinStart { spin_id });
        true
    }

    /// Ask one reel to decelerate. Out-of-phase requests are logged and ignored.
    pub fn begin_decel(&mut self, index: usize) -> Option<DecelOutcome> {
        let outcome = self.reels.get_mut(index)?.begin_decel();
        let reel_index = index as u8;
        match outcome {
            DecelOutcome::Started => self.emit(Stage::DecelBegin { reel_index }),
            DecelOutcome::Ignored(phase) => self.emit(Stage::DecelIgnored {
                reel_index,
                phase: phase.name().into(),
            }),
        }
        Some(outcome)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // VIEWS
    // ═══════════════════════════════════════════════════════════════════════

    /// Settled symbol matrix derived from the reel buffers
    pub fn grid(&self) -> Grid {
        Grid::from_reels(&self.reels, self.config.grid.rows as usize)
    }

    /// Winning line indices of the current or last session
    pub fn winning_lines(&self) -> &[u8] {
        self.chain
            .session()
            .map(|s| s.winning_lines.as_slice())
            .unwrap_or_default()
    }

    pub fn render_frame(&self) -> RenderFrame {
        let (winning_lines, blink) = match self.chain.session() {
            Some(session) if session.window_open(self.time_ms) => {
                let lines = session
                    .winning_lines
                    .iter()
                    .filter_map(|i| self.paylines.get(*i as usize).copied())
                    .collect();
                let elapsed = self.time_ms - session.window_start_ms.unwrap_or(self.time_ms);
                (lines, blink_on(elapsed, self.config.chain.blink_period_ms))
            }
            _ => (Vec::new(), false),
        };

        RenderFrame {
            grid: self.grid(),
            offsets: self.reels.iter().map(|r| r.state().offset).collect(),
            winning_lines,
            blink_on: blink,
        }
    }

    /// Read-only introspection snapshot
    pub fn snapshot(&self) -> DebugSnapshot {
        let controller = match self.chain.session() {
            Some(s) => ControllerSnapshot {
                active: s.active,
                spin_id: Some(s.spin_id.clone()),
                chain_index: s.chain_index,
                countdown_ms: s.countdown_ms,
                evaluations: s.evaluations,
                spins_started: self.chain.spin_count(),
                window_start_ms: s.window_start_ms,
                window_end_ms: s.window_end_ms,
            },
            None => ControllerSnapshot::default(),
        };

        DebugSnapshot {
            time_ms: self.time_ms,
            tick: self.tick_count,
            paused: self.paused,
            step_budget: self.step_budget,
            debug_enabled: self.debug_enabled,
            rng: self.rng.strategy(),
            reels: self.reels.iter().map(ReelSnapshot::from).collect(),
            controller,
            grid: self.grid().to_rows(),
            winning_lines: self.winning_lines().to_vec(),
            log: self.trace.recent(self.config.debug.snapshot_log_lines),
            log_dropped: self.trace.dropped_count(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn paylines(&self) -> &PaylineSet {
        &self.paylines
    }

    pub fn chain(&self) -> &ChainController {
        &self.chain
    }

    pub fn trace(&self) -> &StageTrace {
        &self.trace
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn step_budget(&self) -> u32 {
        self.step_budget
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn is_spinning(&self) -> bool {
        self.chain.is_active() || self.reels.iter().any(Reel::is_spinning)
    }

    /// Record a stage in the trace and report it through `log`
    pub fn emit(&mut self, stage: Stage) {
        log::log!(
            stage.log_level(),
            "[t={:.1}ms tick={}] {}",
            self.time_ms,
            self.tick_count,
            stage
        );
        self.trace.record(stage, self.time_ms, self.tick_count);
    }
}
