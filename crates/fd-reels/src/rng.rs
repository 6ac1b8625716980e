//! Symbol RNG strategies
//!
//! Two interchangeable strategies, chosen once when the simulation is built:
//!
//! - [`EntropyRng`] — OS-seeded `StdRng`, for live play
//! - [`Mulberry32`] — seeded 32-bit generator with a fixed, documented
//!   recurrence, for reproducible runs and tests
//!
//! The seeded strategy is never substituted behind the caller's back: the
//! active strategy is reported by [`SymbolRng::strategy`] and ends up in every
//! debug snapshot.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Source of uniformly distributed symbols
pub trait SymbolRng {
    /// Draw the next symbol. Draws are independent and uniform over [`Symbol::ALL`].
    fn next_symbol(&mut self) -> Symbol;

    /// Strategy identity (reported in snapshots)
    fn strategy(&self) -> RngStrategy;
}

/// Strategy identity as seen by tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RngStrategy {
    Entropy,
    Seeded { seed: u32 },
}

/// Configured RNG selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RngMode {
    #[default]
    Entropy,
    Seeded { seed: u32 },
}

impl RngMode {
    /// Build the strategy this mode names
    pub fn build(self) -> Box<dyn SymbolRng> {
        match self {
            RngMode::Entropy => Box::new(EntropyRng::new()),
            RngMode::Seeded { seed } => Box::new(Mulberry32::new(seed)),
        }
    }
}

/// Mulberry32 — 32-bit state-mixing generator.
///
/// Recurrence, all arithmetic wrapping on `u32`:
///
/// ```text
/// s   = s + 0x6D2B79F5
/// t   = s
/// t   = (t ^ (t >> 15)) * (t | 1)
/// t   = t ^ (t + (t ^ (t >> 7)) * (t | 61))
/// out = t ^ (t >> 14)
/// ```
///
/// A symbol is `Symbol::ALL[out >> 30]` (the top two bits).
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    seed: u32,
    state: u32,
}

impl Mulberry32 {
    const INCREMENT: u32 = 0x6D2B_79F5;

    pub fn new(seed: u32) -> Self {
        Self { seed, state: seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Advance the state and return the next raw output
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl SymbolRng for Mulberry32 {
    fn next_symbol(&mut self) -> Symbol {
        Symbol::ALL[(self.next_u32() >> 30) as usize]
    }

    fn strategy(&self) -> RngStrategy {
        RngStrategy::Seeded { seed: self.seed }
    }
}

/// OS-seeded entropy strategy
#[derive(Debug, Clone)]
pub struct EntropyRng {
    inner: StdRng,
}

impl EntropyRng {
    pub fn new() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }
}

impl Default for EntropyRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRng for EntropyRng {
    fn next_symbol(&mut self) -> Symbol {
        Symbol::ALL[self.inner.random_range(0..Symbol::COUNT)]
    }

    fn strategy(&self) -> RngStrategy {
        RngStrategy::Entropy
    }
}
