//! # fd-reels — Flip-Dot Slot Reel Simulation
//!
//! Deterministic reel physics, chained stops and payline evaluation for a
//! 4-row × 3-reel flip-dot slot machine.
//!
//! ## Features
//!
//! - **Reel State Machine**: Fast → Decelerating → SnapArmed → stop on a cell boundary
//! - **Chain Controller**: Staggered decel commands, single evaluation per spin
//! - **Symbol RNG**: OS entropy, or seeded Mulberry32 for reproducible runs
//! - **Debug Port**: Serializable snapshots, command channel, bounded stage trace
//!
//! ## Architecture
//!
//! ```text
//! CommandSource ──▶ SimulationContext::tick
//!                       │
//!                       ├── ChainController (decel sequencing, completion)
//!                       ├── Reel × 3 ──▶ ColumnBuffer (shift on each boundary)
//!                       └── PaylineSet (on full stop)
//!                             │
//!                             v
//!                  DebugSnapshot / RenderFrame
//! ```

pub mod chain;
pub mod column;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod grid;
pub mod paytable;
pub mod reel;
pub mod render;
pub mod rng;
pub mod runner;
pub mod snapshot;
pub mod symbols;
pub mod timing;

pub use chain::*;
pub use column::*;
pub use command::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use grid::*;
pub use paytable::*;
pub use reel::*;
pub use render::*;
pub use rng::*;
pub use runner::*;
pub use snapshot::*;
pub use symbols::*;
pub use timing::*;
