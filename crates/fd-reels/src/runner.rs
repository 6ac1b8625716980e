//! TickLoop — a context plus its collaborators
//!
//! Wires the command source, snapshot sink, renderer and display around one
//! [`SimulationContext`]. Collaborator failures are recorded as diagnostics
//! and never stop the loop.

use fd_stage::Stage;

use crate::command::{CommandSource, NoCommands};
use crate::context::{SimulationContext, TickReport};
use crate::render::{DisplaySink, FrameDiff, NullDisplay, Renderer};
use crate::snapshot::SnapshotSink;

pub struct TickLoop {
    ctx: SimulationContext,
    source: Box<dyn CommandSource>,
    snapshots: Option<Box<dyn SnapshotSink>>,
    renderer: Option<Box<dyn Renderer>>,
    display: Box<dyn DisplaySink>,
    diff: FrameDiff,
}

impl TickLoop {
    pub fn new(ctx: SimulationContext) -> Self {
        Self {
            ctx,
            source: Box::new(NoCommands),
            snapshots: None,
            renderer: None,
            display: Box::new(NullDisplay),
            diff: FrameDiff::default(),
        }
    }

    pub fn with_commands(mut self, source: impl CommandSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn with_snapshots(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.snapshots = Some(Box::new(sink));
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_display(mut self, display: impl DisplaySink + 'static) -> Self {
        self.display = Box::new(display);
        self
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.ctx
    }

    pub fn into_context(self) -> SimulationContext {
        self.ctx
    }

    /// One frame: tick, then snapshot and render as needed
    pub fn step(&mut self, dt_ms: f64) -> TickReport {
        let report = self.ctx.tick(dt_ms, self.source.as_mut());

        if report.snapshot_due {
            self.write_snapshot();
        }
        self.present();
        report
    }

    /// Write a snapshot now, regardless of debug state
    pub fn write_snapshot(&mut self) {
        let Some(sink) = self.snapshots.as_mut() else {
            return;
        };
        if let Err(e) = sink.write(&self.ctx.snapshot()) {
            self.ctx.emit(Stage::DiagnosticFailed {
                target: "snapshot".into(),
                reason: e.to_string(),
            });
        }
    }

    fn present(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let Some(pixels) = renderer.render(&self.ctx.render_frame()) else {
            return;
        };
        let panel = &self.ctx.config().panel;
        if !pixels.fits(panel) {
            let reason = format!(
                "frame is {}x{}, panel is {}x{}",
                pixels.width(),
                pixels.height(),
                panel.width,
                panel.height
            );
            self.ctx.emit(Stage::DiagnosticFailed {
                target: "display".into(),
                reason,
            });
            return;
        }

        let changed = self.diff.update(&pixels);
        if let Err(e) = self.display.send(pixels.packed(), changed) {
            self.ctx.emit(Stage::DiagnosticFailed {
                target: "display".into(),
                reason: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use crate::command::QueueCommandSource;
    use crate::config::{PanelSpec, SimConfig};
    use crate::error::{SnapshotError, SnapshotResult};
    use crate::render::{PixelFrame, RenderFrame};
    use crate::snapshot::{DebugSnapshot, MemorySnapshotSink};

    fn ctx() -> SimulationContext {
        SimulationContext::new(SimConfig::default().with_seed(21)).unwrap()
    }

    struct BrokenSink;

    impl SnapshotSink for BrokenSink {
        fn write(&mut self, _snapshot: &DebugSnapshot) -> SnapshotResult<()> {
            Err(SnapshotError::Io(io::Error::other("disk full")))
        }
    }

    /// Lights one dot per reel offset row
    struct OffsetRenderer(PanelSpec);

    impl Renderer for OffsetRenderer {
        fn render(&mut self, frame: &RenderFrame) -> Option<PixelFrame> {
            let mut pixels = PixelFrame::for_panel(&self.0);
            for (col, offset) in frame.offsets.iter().enumerate() {
                pixels.set(col as u16, *offset as u16, true);
            }
            Some(pixels)
        }
    }

    /// Records (packed length, changed) per send
    #[derive(Clone, Default)]
    struct RecordingDisplay(Rc<RefCell<Vec<(usize, bool)>>>);

    impl DisplaySink for RecordingDisplay {
        fn send(&mut self, packed: &[u8], changed: bool) -> io::Result<()> {
            self.0.borrow_mut().push((packed.len(), changed));
            Ok(())
        }
    }

    #[test]
    fn test_snapshot_failure_does_not_stop_loop() {
        let source: QueueCommandSource = ["dump", "spin"].into_iter().collect();
        let mut runner = TickLoop::new(ctx())
            .with_commands(source)
            .with_snapshots(BrokenSink);

        runner.step(20.0);
        let report = runner.step(20.0);
        assert!(report.updated);
        assert!(runner.context().is_spinning());
        assert_eq!(
            runner
                .context()
                .trace()
                .events_by_type("diagnostic_failed")
                .len(),
            1
        );
    }

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<MemorySnapshotSink>>);

    impl SnapshotSink for SharedSink {
        fn write(&mut self, snapshot: &DebugSnapshot) -> SnapshotResult<()> {
            self.0.borrow_mut().write(snapshot)
        }
    }

    #[test]
    fn test_dump_writes_one_snapshot() {
        let sink = SharedSink::default();
        let written = sink.0.clone();
        let source: QueueCommandSource = ["dump"].into_iter().collect();
        let mut runner = TickLoop::new(ctx())
            .with_commands(source)
            .with_snapshots(sink);

        runner.step(20.0);
        runner.step(20.0);

        let written = written.borrow();
        assert_eq!(written.snapshots.len(), 1);
        assert_eq!(written.snapshots[0].tick, 1);
        assert!(written.snapshots[0].log.iter().any(|e| e.type_name() == "dump_requested"));
    }

    #[test]
    fn test_display_changed_flag() {
        let display = RecordingDisplay::default();
        let seen = display.0.clone();
        let mut runner = TickLoop::new(ctx())
            .with_renderer(OffsetRenderer(PanelSpec::default()))
            .with_display(display);

        // idle reels draw the same frame twice
        runner.step(20.0);
        runner.step(20.0);
        assert_eq!(*seen.borrow(), vec![(98, true), (98, false)]);
    }

    #[test]
    fn test_display_follows_configured_panel() {
        let mut config = SimConfig::default().with_seed(21);
        config.panel = PanelSpec {
            width: 32,
            height: 16,
        };
        let display = RecordingDisplay::default();
        let seen = display.0.clone();
        let mut runner = TickLoop::new(SimulationContext::new(config).unwrap())
            .with_renderer(OffsetRenderer(PanelSpec {
                width: 32,
                height: 16,
            }))
            .with_display(display);

        runner.step(20.0);
        assert_eq!(*seen.borrow(), vec![(64, true)]);
    }

    #[test]
    fn test_wrong_size_frame_not_sent() {
        let display = RecordingDisplay::default();
        let seen = display.0.clone();
        let mut runner = TickLoop::new(ctx())
            .with_renderer(OffsetRenderer(PanelSpec {
                width: 10,
                height: 10,
            }))
            .with_display(display);

        runner.step(20.0);
        runner.step(20.0);
        assert!(seen.borrow().is_empty());

        let trace = runner.context().trace();
        let failures = trace.events_by_type("diagnostic_failed");
        assert_eq!(failures.len(), 2);
        assert!(matches!(
            &failures[0].stage,
            Stage::DiagnosticFailed { target, .. } if target == "display"
        ));
    }
}
