//! # fd-stage — Flip-Dot Slot Stage System
//!
//! Defines the canonical stages the reel simulation passes through and the
//! bounded trace that records them for the debug port.
//!
//! ## Philosophy
//!
//! Every spin passes through the same semantic phases:
//! - Spin starts → reels decelerate one by one → reels snap and stop → lines evaluated
//!
//! Controller and reels never log free-form text into the trace; they emit
//! stages. Tooling reads stages back from snapshots.

pub mod event;
pub mod stage;
pub mod trace;

pub use event::*;
pub use stage::*;
pub use trace::*;
