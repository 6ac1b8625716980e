//! Spin/chain controller
//!
//! Starts every reel at once, then walks a decel command down the reels one
//! at a time: reel 0 after `first_decel_delay_ms`, each following reel
//! `between_decel_delay_ms` after its predecessor stopped. When every reel is
//! idle the session closes and the grid is evaluated exactly once.

use serde::{Deserialize, Serialize};

use crate::config::ChainTiming;
use crate::reel::Reel;

/// One spin from start to evaluation. Replaced, never reused, by the next spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinSession {
    pub spin_id: String,
    pub active: bool,
    /// Next reel to receive its decel command
    pub chain_index: usize,
    /// Time left before `chain_index` is told to decelerate (ms)
    pub countdown_ms: f64,
    pub started_at_ms: f64,
    pub winning_lines: Vec<u8>,
    pub window_start_ms: Option<f64>,
    pub window_end_ms: Option<f64>,
    /// Times the grid was evaluated for this session (0 or 1)
    pub evaluations: u32,
    pub completed_at_ms: Option<f64>,
}

impl SpinSession {
    /// Whether `now_ms` falls inside the win display window
    pub fn window_open(&self, now_ms: f64) -> bool {
        match (self.window_start_ms, self.window_end_ms) {
            (Some(start), Some(end)) => now_ms >= start && now_ms < end,
            _ => false,
        }
    }
}

/// Why a start request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejection {
    SessionActive,
    ReelsSpinning,
}

impl StartRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            StartRejection::SessionActive => "session active",
            StartRejection::ReelsSpinning => "reels still spinning",
        }
    }
}

/// Result of closing a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinCompletion {
    pub spin_id: String,
    pub winning_lines: Vec<u8>,
    pub window_start_ms: f64,
    pub window_end_ms: f64,
}

/// Chained stop sequencer
#[derive(Debug, Clone)]
pub struct ChainController {
    timing: ChainTiming,
    reel_count: usize,
    session: Option<SpinSession>,
    spin_counter: u64,
}

impl ChainController {
    pub fn new(timing: ChainTiming, reel_count: usize) -> Self {
        Self {
            timing,
            reel_count,
            session: None,
            spin_counter: 0,
        }
    }

    pub fn timing(&self) -> &ChainTiming {
        &self.timing
    }

    /// Current or most recent session
    pub fn session(&self) -> Option<&SpinSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.active)
    }

    /// Sessions started so far
    pub fn spin_count(&self) -> u64 {
        self.spin_counter
    }

    /// Open a new session. The caller sets the reels to Fast on success.
    pub fn start(&mut self, now_ms: f64, reels: &[Reel]) -> Result<&SpinSession, StartRejection> {
        if self.is_active() {
            return Err(StartRejection::SessionActive);
        }
        if reels.iter().any(Reel::is_spinning) {
            return Err(StartRejection::ReelsSpinning);
        }

        self.spin_counter += 1;
        let session = self.session.insert(SpinSession {
            spin_id: format!("spin-{:06}", self.spin_counter),
            active: true,
            chain_index: 0,
            countdown_ms: self.timing.first_decel_delay_ms,
            started_at_ms: now_ms,
            winning_lines: Vec::new(),
            window_start_ms: None,
            window_end_ms: None,
            evaluations: 0,
            completed_at_ms: None,
        });
        Ok(session)
    }

    /// Advance the countdown. Returns the reel that should begin decelerating now, if any.
    ///
    /// Runs before the reels update on the same tick. Reels that were
    /// stopped out of order are passed over once the countdown reaches them.
    pub fn update(&mut self, dt_ms: f64, reels: &[Reel]) -> Option<usize> {
        let session = self.session.as_mut().filter(|s| s.active)?;
        if session.chain_index >= self.reel_count {
            return None;
        }

        session.countdown_ms -= dt_ms;
        if session.countdown_ms > 0.0 {
            return None;
        }

        while session.chain_index < self.reel_count
            && reels.get(session.chain_index).is_some_and(|r| !r.is_spinning())
        {
            log::debug!(
                "{}: reel {} already idle, chain moves on",
                session.spin_id,
                session.chain_index
            );
            session.chain_index += 1;
        }

        let index = session.chain_index;
        reels
            .get(index)
            .filter(|r| r.state().can_begin_decel())
            .map(|_| index)
    }

    /// A reel stopped during this tick
    pub fn on_reel_stopped(&mut self, index: usize) {
        let Some(session) = self.session.as_mut().filter(|s| s.active) else {
            return;
        };
        if index != session.chain_index {
            return;
        }

        session.chain_index += 1;
        if session.chain_index < self.reel_count {
            session.countdown_ms = self.timing.between_decel_delay_ms;
        }
    }

    /// Close the session once every reel is idle.
    ///
    /// `evaluate` runs at most once per session.
    pub fn try_complete<F>(&mut self, now_ms: f64, reels: &[Reel], evaluate: F) -> Option<SpinCompletion>
    where
        F: FnOnce() -> Vec<u8>,
    {
        let session = self.session.as_mut().filter(|s| s.active)?;
        if reels.iter().any(Reel::is_spinning) {
            return None;
        }

        let window_end_ms = now_ms + self.timing.win_display_ms;
        session.active = false;
        session.evaluations += 1;
        session.winning_lines = evaluate();
        session.window_start_ms = Some(now_ms);
        session.window_end_ms = Some(window_end_ms);
        session.completed_at_ms = Some(now_ms);

        Some(SpinCompletion {
            spin_id: session.spin_id.clone(),
            winning_lines: session.winning_lines.clone(),
            window_start_ms: now_ms,
            window_end_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnBuffer;
    use crate::config::ReelPhysics;
    use crate::rng::Mulberry32;

    fn reels(rng: &mut Mulberry32) -> Vec<Reel> {
        (0..3)
            .map(|i| Reel::new(i, ColumnBuffer::for_rows(4, rng)))
            .collect()
    }

    #[test]
    fn test_start_assigns_sequential_ids() {
        let mut rng = Mulberry32::new(1);
        let reels = reels(&mut rng);
        let mut chain = ChainController::new(ChainTiming::default(), 3);

        let first = chain.start(0.0, &reels).unwrap();
        assert_eq!(first.spin_id, "spin-000001");
        assert_eq!(first.countdown_ms, 700.0);
        assert_eq!(first.chain_index, 0);

        assert_eq!(
            chain.start(10.0, &reels).unwrap_err(),
            StartRejection::SessionActive
        );

        chain.try_complete(20.0, &reels, Vec::new).unwrap();
        let second = chain.start(30.0, &reels).unwrap();
        assert_eq!(second.spin_id, "spin-000002");
        assert_eq!(second.evaluations, 0);
        assert!(second.winning_lines.is_empty());
    }

    #[test]
    fn test_start_rejected_while_reel_spinning() {
        let mut rng = Mulberry32::new(2);
        let mut reels = reels(&mut rng);
        reels[1].start(&ReelPhysics::default());

        let mut chain = ChainController::new(ChainTiming::default(), 3);
        assert_eq!(
            chain.start(0.0, &reels).unwrap_err(),
            StartRejection::ReelsSpinning
        );
        assert!(chain.session().is_none());
        assert_eq!(chain.spin_count(), 0);
    }

    #[test]
    fn test_first_decel_after_delay() {
        let mut rng = Mulberry32::new(3);
        let mut reels = reels(&mut rng);
        let mut chain = ChainController::new(ChainTiming::default(), 3);
        chain.start(0.0, &reels).unwrap();
        for reel in &mut reels {
            reel.start(&ReelPhysics::default());
        }

        let mut elapsed = 0.0;
        let mut issued = None;
        while issued.is_none() {
            elapsed += 20.0;
            issued = chain.update(20.0, &reels);
        }
        assert_eq!(issued, Some(0));
        assert_eq!(elapsed, 700.0);

        // reel 0 now decelerating: no repeat command
        reels[0].begin_decel();
        assert_eq!(chain.update(20.0, &reels), None);
    }

    #[test]
    fn test_stop_advances_chain() {
        let mut rng = Mulberry32::new(4);
        let reels = reels(&mut rng);
        let mut chain = ChainController::new(ChainTiming::default(), 3);
        chain.start(0.0, &reels).unwrap();

        // out-of-order stop is ignored
        chain.on_reel_stopped(2);
        assert_eq!(chain.session().unwrap().chain_index, 0);

        chain.on_reel_stopped(0);
        let session = chain.session().unwrap();
        assert_eq!(session.chain_index, 1);
        assert_eq!(session.countdown_ms, 250.0);
    }

    #[test]
    fn test_idle_reel_passed_over_when_countdown_expires() {
        let mut rng = Mulberry32::new(7);
        let mut reels = reels(&mut rng);
        let physics = ReelPhysics::default();
        let mut chain = ChainController::new(ChainTiming::default(), 3);
        chain.start(0.0, &reels).unwrap();
        // reels 0 and 1 already stopped before the chain reached them
        reels[2].start(&physics);

        assert_eq!(chain.update(680.0, &reels), None);
        assert_eq!(chain.session().unwrap().chain_index, 0);
        assert_eq!(chain.update(20.0, &reels), Some(2));
        assert_eq!(chain.session().unwrap().chain_index, 2);

        reels[2].begin_decel();
        for _ in 0..1000 {
            if reels[2].update(20.0, &physics, &mut rng).stopped {
                break;
            }
        }
        assert!(!reels[2].is_spinning());
        chain.on_reel_stopped(2);
        assert_eq!(chain.session().unwrap().chain_index, 3);
        assert_eq!(chain.update(1000.0, &reels), None);
        assert!(chain.try_complete(2000.0, &reels, Vec::new).is_some());
    }

    #[test]
    fn test_completion_evaluates_once() {
        let mut rng = Mulberry32::new(5);
        let reels = reels(&mut rng);
        let mut chain = ChainController::new(ChainTiming::default(), 3);
        chain.start(0.0, &reels).unwrap();

        let mut calls = 0;
        let done = chain
            .try_complete(1500.0, &reels, || {
                calls += 1;
                vec![3, 8]
            })
            .unwrap();
        assert_eq!(done.winning_lines, vec![3, 8]);
        assert_eq!(done.window_end_ms, 4500.0);

        assert!(chain.try_complete(1520.0, &reels, || unreachable!()).is_none());
        assert_eq!(calls, 1);

        let session = chain.session().unwrap();
        assert!(!session.active);
        assert_eq!(session.evaluations, 1);
        assert!(session.window_open(1500.0));
        assert!(session.window_open(4499.0));
        assert!(!session.window_open(4500.0));
    }

    #[test]
    fn test_no_completion_while_spinning() {
        let mut rng = Mulberry32::new(6);
        let mut reels = reels(&mut rng);
        let mut chain = ChainController::new(ChainTiming::default(), 3);
        chain.start(0.0, &reels).unwrap();
        reels[2].start(&ReelPhysics::default());

        assert!(chain.try_complete(100.0, &reels, Vec::new).is_none());
        assert!(chain.is_active());
    }
}
