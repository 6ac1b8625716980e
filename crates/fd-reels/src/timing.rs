//! Frame timing helpers

use std::time::{Duration, Instant};

/// Clamp a raw frame delta to `[0, max_dt_ms]`. Non-finite or negative input becomes 0.
pub fn clamp_dt(dt_ms: f64, max_dt_ms: f64) -> f64 {
    if !dt_ms.is_finite() || dt_ms <= 0.0 {
        return 0.0;
    }
    dt_ms.min(max_dt_ms)
}

/// Blink phase `elapsed_ms` into a window: on for the first half-period, off for the next
pub fn blink_on(elapsed_ms: f64, period_ms: f64) -> bool {
    if period_ms <= 0.0 || elapsed_ms < 0.0 {
        return true;
    }
    ((elapsed_ms / period_ms).floor() as u64) % 2 == 0
}

/// Wall-clock frame delta source
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_dt_ms: f64,
    frame: Duration,
}

impl FrameClock {
    pub fn new(target_fps: u32, max_dt_ms: f64) -> Self {
        Self {
            last: None,
            max_dt_ms,
            frame: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
        }
    }

    /// Nominal frame length
    pub fn frame_duration(&self) -> Duration {
        self.frame
    }

    /// Clamped ms since the previous call (0 on the first call)
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        self.last = Some(now);
        clamp_dt(dt, self.max_dt_ms)
    }

    /// Time left in the current frame, measured from the last tick
    pub fn remaining(&self) -> Duration {
        match self.last {
            Some(last) => self.frame.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(16.6, 50.0), 16.6);
        assert_eq!(clamp_dt(400.0, 50.0), 50.0);
        assert_eq!(clamp_dt(-3.0, 50.0), 0.0);
        assert_eq!(clamp_dt(f64::NAN, 50.0), 0.0);
        assert_eq!(clamp_dt(f64::INFINITY, 50.0), 0.0);
    }

    #[test]
    fn test_blink_phase() {
        assert!(blink_on(0.0, 250.0));
        assert!(blink_on(249.0, 250.0));
        assert!(!blink_on(250.0, 250.0));
        assert!(!blink_on(499.0, 250.0));
        assert!(blink_on(500.0, 250.0));
    }

    #[test]
    fn test_frame_clock_clamps() {
        let mut clock = FrameClock::new(30, 50.0);
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), 0.0);

        let dt = clock.tick_at(start + Duration::from_millis(20));
        assert!((dt - 20.0).abs() < 1e-6);

        // long stall
        let dt = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(dt, 50.0);

        // clock going backwards never yields negative time
        assert_eq!(clock.tick_at(start), 0.0);
    }
}
