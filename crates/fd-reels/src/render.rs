//! Render/display seams
//!
//! The simulation hands a [`RenderFrame`] to a [`Renderer`] each tick. A
//! renderer may draw it into a [`PixelFrame`], which is packed one bit per dot
//! and pushed to a [`DisplaySink`] together with a `changed` flag.
//! Symbol artwork and the panel transport live outside this crate.

use std::io;

use serde::{Deserialize, Serialize};

use crate::config::PanelSpec;
use crate::grid::Grid;
use crate::paytable::Payline;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub grid: Grid,
    /// Per-reel offset inside the current cell (px)
    pub offsets: Vec<f64>,
    /// Lines to highlight; empty outside the win display window
    pub winning_lines: Vec<Payline>,
    /// Highlight phase for the winning lines
    pub blink_on: bool,
}

/// Draws render frames into panel pixels
pub trait Renderer {
    /// `None` when nothing should be pushed to the panel this tick
    fn render(&mut self, frame: &RenderFrame) -> Option<PixelFrame>;
}

/// 1-bit panel image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: u16,
    height: u16,
    /// Row-major bits, MSB first, no per-row padding
    bits: Vec<u8>,
}

impl PixelFrame {
    /// All dots off
    pub fn new(width: u16, height: u16) -> Self {
        let dots = width as usize * height as usize;
        Self {
            width,
            height,
            bits: vec![0; dots.div_ceil(8)],
        }
    }

    /// All dots off, sized to `panel`
    pub fn for_panel(panel: &PanelSpec) -> Self {
        Self::new(panel.width, panel.height)
    }

    /// Same dimensions as `panel`
    pub fn fits(&self, panel: &PanelSpec) -> bool {
        self.width == panel.width && self.height == panel.height
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn bit(&self, x: u16, y: u16) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.width as usize + x as usize;
        Some((i / 8, 0x80 >> (i % 8)))
    }

    /// Out-of-range coordinates are ignored
    pub fn set(&mut self, x: u16, y: u16, on: bool) {
        if let Some((byte, mask)) = self.bit(x, y) {
            if on {
                self.bits[byte] |= mask;
            } else {
                self.bits[byte] &= !mask;
            }
        }
    }

    pub fn get(&self, x: u16, y: u16) -> bool {
        self.bit(x, y)
            .is_some_and(|(byte, mask)| self.bits[byte] & mask != 0)
    }

    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Packed buffer as sent to the panel
    pub fn packed(&self) -> &[u8] {
        &self.bits
    }
}

/// Consumer of packed panel frames
pub trait DisplaySink {
    fn send(&mut self, packed: &[u8], changed: bool) -> io::Result<()>;
}

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn send(&mut self, _packed: &[u8], _changed: bool) -> io::Result<()> {
        Ok(())
    }
}

/// Remembers the last frame pushed so unchanged frames can be flagged
#[derive(Debug, Default, Clone)]
pub struct FrameDiff {
    last: Option<Vec<u8>>,
}

impl FrameDiff {
    /// Record `frame`, returning whether it differs from the previous one
    pub fn update(&mut self, frame: &PixelFrame) -> bool {
        let packed = frame.packed();
        if self.last.as_deref() == Some(packed) {
            return false;
        }
        self.last = Some(packed.to_vec());
        true
    }
}
