//! StageEvent — A stage occurrence with timing metadata

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A stage event stamped with simulation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// Sequence number assigned by the trace (monotonic, survives eviction)
    #[serde(default)]
    pub seq: u64,

    /// Loop tick the event was emitted on
    #[serde(default)]
    pub tick: u64,

    /// Simulation time in milliseconds
    pub timestamp_ms: f64,

    /// The canonical stage
    pub stage: Stage,
}

impl StageEvent {
    pub fn new(stage: Stage, timestamp_ms: f64) -> Self {
        Self {
            seq: 0,
            tick: 0,
            timestamp_ms,
            stage,
        }
    }

    /// Builder: set loop tick
    pub fn at_tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[#{} t={:.1}ms tick={}] {}",
            self.seq, self.timestamp_ms, self.tick, self.stage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_line() {
        let event = StageEvent::new(Stage::DecelBegin { reel_index: 1 }, 700.0).at_tick(35);
        assert_eq!(event.to_string(), "[#0 t=700.0ms tick=35] decel_begin reel=1");
    }
}
