//! One engine, one surface, one animation loop.
//!
//! The viewport owns the whole pipeline: each frame advances the engine,
//! decodes whatever payload it advertises, paints the surface, records
//! telemetry, and schedules the next frame while the loop is running.
//!
//! Decode failures split by blame. A view that overruns engine memory means
//! this frame's bytes are unusable: the frame is skipped with a warning and
//! the loop keeps going. A malformed payload (count mismatch, out-of-range
//! coordinate) means the integration itself is broken: the loop halts and
//! the error is surfaced once instead of scrolling past at 60 Hz.

use log::{error, warn};

use crate::config::{ConfigError, RenderConfig};
use crate::control::{AnimationController, FrameId, FrameScheduler};
use crate::decode::{decode_changes, dense_snapshot, CellPaint, DecodeError};
use crate::engine::{CellPayload, Engine};
use crate::input::{ControlEvent, PointerMap};
use crate::render::{CellGeometry, GridRenderer, Surface, SurfaceSizeMismatch};
use crate::telemetry::{FpsStats, FpsWindow};

/// Failure to assemble a viewport.
#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Surface(#[from] SurfaceSizeMismatch),
}

/// Ties an [`Engine`], a [`Surface`], and a [`FrameScheduler`] together.
pub struct Viewport<E, S, C> {
    engine: E,
    renderer: GridRenderer<S>,
    controller: AnimationController,
    scheduler: C,
    pointer: PointerMap,
    telemetry: FpsWindow,
    changes: Vec<CellPaint>,
}

impl<E, S, C> Viewport<E, S, C>
where
    E: Engine,
    S: Surface,
    C: FrameScheduler,
{
    /// Wire an engine to a surface. The surface must already be sized for
    /// the engine's grid under `config.cell_size`.
    pub fn new(
        engine: E,
        surface: S,
        scheduler: C,
        config: RenderConfig,
    ) -> Result<Self, ViewportError> {
        config.validate()?;
        let geometry = CellGeometry::new(config.cell_size);
        let renderer = GridRenderer::new(
            surface,
            engine.width(),
            engine.height(),
            geometry,
            config.palette,
        )?;
        let pointer = PointerMap::new(geometry, engine.width(), engine.height());
        Ok(Self {
            engine,
            renderer,
            controller: AnimationController::new(config.steps_per_frame),
            scheduler,
            pointer,
            telemetry: FpsWindow::default(),
            changes: Vec::new(),
        })
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    #[inline]
    pub fn has_pending_frame(&self) -> bool {
        self.controller.pending().is_some()
    }

    #[inline]
    pub fn steps_per_frame(&self) -> u32 {
        self.controller.steps_per_frame()
    }

    /// Change the generations advanced per frame, from the next frame on.
    pub fn set_steps_per_frame(&mut self, steps: u32) {
        self.controller.set_steps_per_frame(steps);
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Direct engine access, for hosts that drive setup themselves.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The painted surface, for hosts that blit it to a display.
    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn scheduler(&self) -> &C {
        &self.scheduler
    }

    /// The scheduler, for hosts that drive frames by hand.
    pub fn scheduler_mut(&mut self) -> &mut C {
        &mut self.scheduler
    }

    pub fn fps_stats(&self) -> Option<FpsStats> {
        self.telemetry.stats()
    }

    pub fn fps_summary(&self) -> String {
        self.telemetry.summary()
    }

    /// Start the loop: runs one frame body immediately and schedules the
    /// next. No-op when already running.
    pub fn play(&mut self, now_ms: f64) {
        if !self.controller.begin() {
            return;
        }
        self.run_frame(now_ms);
    }

    /// Stop the loop and cancel the pending frame. No-op when idle.
    pub fn pause(&mut self) {
        if let Some(id) = self.controller.halt() {
            self.scheduler.cancel(id);
        }
    }

    /// Host callback for a scheduled frame. Stale ids are dropped without
    /// running anything.
    pub fn on_frame(&mut self, id: FrameId, now_ms: f64) {
        if !self.controller.frame_fired(id) {
            return;
        }
        self.run_frame(now_ms);
    }

    /// Decode and paint the current state outside the animation loop.
    pub fn render_now(&mut self) -> Result<(), DecodeError> {
        self.paint_current()
    }

    /// Toggle the cell under a pointer position in display pixels, then
    /// repaint.
    pub fn handle_click(
        &mut self,
        x: f64,
        y: f64,
        display_width: f64,
        display_height: f64,
    ) -> Result<(), DecodeError> {
        let (row, col) = self.pointer.cell_at_scaled(x, y, display_width, display_height);
        self.engine.toggle_cell(row, col);
        self.paint_current()
    }

    /// Apply a host control event.
    pub fn handle_control(
        &mut self,
        event: ControlEvent,
        now_ms: f64,
    ) -> Result<(), DecodeError> {
        match event {
            ControlEvent::PlayPause => {
                if self.is_running() {
                    self.pause();
                } else {
                    self.play(now_ms);
                }
                Ok(())
            }
            ControlEvent::Randomize => {
                self.engine.randomize();
                self.paint_current()
            }
            ControlEvent::Clear => {
                self.engine.clear();
                self.paint_current()
            }
            ControlEvent::StepRate(steps) => {
                self.controller.set_steps_per_frame(steps);
                Ok(())
            }
        }
    }

    fn run_frame(&mut self, now_ms: f64) {
        for _ in 0..self.controller.steps_per_frame() {
            self.engine.tick();
        }
        match self.paint_current() {
            Ok(()) => {}
            Err(err) if err.is_format() => {
                error!("halting the loop, the engine handed over a corrupt payload: {err}");
                self.pause();
                return;
            }
            Err(err) => {
                warn!("skipping this frame: {err}");
            }
        }
        self.telemetry.record(now_ms);
        if self.controller.is_running() {
            let id = self.scheduler.schedule();
            self.controller.scheduled(id);
        }
    }

    /// Paint gridlines plus whatever the engine's payload describes. The
    /// sparse change buffer is released before any error propagates, so a
    /// bad frame never leaks engine memory.
    fn paint_current(&mut self) -> Result<(), DecodeError> {
        self.renderer.draw_grid();
        match self.engine.payload() {
            CellPayload::Dense { offset } => {
                let snapshot = dense_snapshot(
                    self.engine.memory(),
                    offset,
                    self.renderer.grid_width(),
                    self.renderer.grid_height(),
                )?;
                self.renderer.paint_full(&snapshot);
                Ok(())
            }
            CellPayload::Sparse { offset, count } => {
                let decoded = decode_changes(
                    self.engine.memory(),
                    offset,
                    count,
                    self.renderer.grid_width(),
                    self.renderer.grid_height(),
                    &mut self.changes,
                );
                self.engine.release_changes();
                decoded?;
                self.renderer.paint_changes(&self.changes);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::control::ManualScheduler;
    use crate::engine::WireMode;
    use crate::render::{PixelSurface, Rgba};
    use crate::replay::{blinker_frames, ReplayEngine};

    const ALIVE: Rgba = Rgba::rgb(0x00, 0x00, 0x00);
    const DEAD: Rgba = Rgba::rgb(0xFF, 0xFF, 0xFF);
    const GRID: Rgba = Rgba::rgb(0xCC, 0xCC, 0xCC);

    fn config(cell_size: u32) -> RenderConfig {
        RenderConfig {
            cell_size,
            ..RenderConfig::default()
        }
    }

    fn surface_for(engine: &impl Engine, cell_size: u32) -> PixelSurface {
        let geometry = CellGeometry::new(cell_size);
        PixelSurface::new(
            geometry.surface_width(engine.width()),
            geometry.surface_height(engine.height()),
        )
    }

    /// 4x4 blinker viewport at cell size 2, so cell (row, col) paints the
    /// pixel square with origin (col * 3 + 1, row * 3 + 1).
    fn blinker_viewport(
        wire: WireMode,
    ) -> Viewport<ReplayEngine, PixelSurface, ManualScheduler> {
        let mut engine = ReplayEngine::new(4, 4, wire);
        let [a, b] = blinker_frames();
        engine.push_frame(&a);
        engine.push_frame(&b);
        let surface = surface_for(&engine, 2);
        Viewport::new(engine, surface, ManualScheduler::new(), config(2)).unwrap()
    }

    #[test]
    fn test_play_runs_a_frame_and_schedules_the_next() {
        let mut vp = blinker_viewport(WireMode::Dense);
        vp.play(0.0);
        assert!(vp.is_running());
        assert!(vp.has_pending_frame());
        assert_eq!(vp.scheduler().pending().len(), 1);
        // The first frame body already ticked to the vertical phase.
        assert_eq!(vp.surface().pixel(4, 1), ALIVE);
        assert_eq!(vp.surface().pixel(1, 4), DEAD);
    }

    #[test]
    fn test_scheduled_frames_advance_the_animation() {
        let mut vp = blinker_viewport(WireMode::Dense);
        vp.play(0.0);
        let id = vp.scheduler_mut().fire_next().unwrap();
        vp.on_frame(id, 16.0);
        // Back to the horizontal phase, with the next frame queued.
        assert_eq!(vp.surface().pixel(1, 4), ALIVE);
        assert_eq!(vp.surface().pixel(4, 1), DEAD);
        assert!(vp.has_pending_frame());
    }

    #[test]
    fn test_pause_cancels_the_pending_frame() {
        let mut vp = blinker_viewport(WireMode::Dense);
        vp.play(0.0);
        let pending = vp.scheduler().pending().to_vec();
        vp.pause();
        assert!(!vp.is_running());
        assert!(!vp.has_pending_frame());
        assert_eq!(vp.scheduler().cancelled(), &pending[..]);
        // A late callback for the cancelled id does nothing.
        vp.on_frame(pending[0], 32.0);
        assert!(!vp.is_running());
    }

    #[test]
    fn test_pause_while_idle_is_a_noop() {
        let mut vp = blinker_viewport(WireMode::Dense);
        vp.pause();
        assert!(!vp.is_running());
        assert!(vp.scheduler().cancelled().is_empty());
    }

    #[test]
    fn test_play_while_running_does_not_double_schedule() {
        let mut vp = blinker_viewport(WireMode::Dense);
        vp.play(0.0);
        vp.play(5.0);
        assert_eq!(vp.scheduler().pending().len(), 1);
    }

    #[test]
    fn test_step_rate_applies_from_the_next_frame() {
        let mut engine = ReplayEngine::new(4, 1, WireMode::Dense);
        for col in 0..4 {
            engine.push_frame(&[(0, col)]);
        }
        let surface = surface_for(&engine, 2);
        let mut vp =
            Viewport::new(engine, surface, ManualScheduler::new(), config(2)).unwrap();
        vp.play(0.0);
        assert_eq!(vp.surface().pixel(4, 1), ALIVE);
        vp.set_steps_per_frame(3);
        // Changing the rate repaints nothing by itself.
        assert_eq!(vp.surface().pixel(4, 1), ALIVE);
        let id = vp.scheduler_mut().fire_next().unwrap();
        vp.on_frame(id, 16.0);
        // Three generations on from frame 1 wraps back to frame 0.
        assert_eq!(vp.surface().pixel(1, 1), ALIVE);
        assert_eq!(vp.surface().pixel(4, 1), DEAD);
    }

    #[test]
    fn test_sparse_pipeline_paints_changes_and_releases() {
        let mut vp = blinker_viewport(WireMode::Sparse);
        vp.render_now().unwrap();
        // The initial change batch paints the horizontal phase and is
        // released as soon as it is read.
        assert_eq!(vp.surface().pixel(1, 4), ALIVE);
        assert_eq!(vp.surface().pixel(4, 4), ALIVE);
        assert!(matches!(
            vp.engine().payload(),
            CellPayload::Sparse { count: 0, .. }
        ));
        vp.play(0.0);
        // Only the diff was painted; the untouched center cell survives.
        assert_eq!(vp.surface().pixel(4, 1), ALIVE);
        assert_eq!(vp.surface().pixel(1, 4), DEAD);
        assert_eq!(vp.surface().pixel(4, 4), ALIVE);
        assert!(matches!(
            vp.engine().payload(),
            CellPayload::Sparse { count: 0, .. }
        ));
    }

    #[test]
    fn test_click_toggles_the_cell_under_the_pointer() {
        let engine = ReplayEngine::new(4, 4, WireMode::Dense);
        let surface = surface_for(&engine, 2);
        let mut vp =
            Viewport::new(engine, surface, ManualScheduler::new(), config(2)).unwrap();
        // Surface is 13x13 shown at native size; pixel (4, 1) is cell (0, 1).
        vp.handle_click(4.0, 1.0, 13.0, 13.0).unwrap();
        assert_eq!(vp.surface().pixel(4, 1), ALIVE);
        vp.handle_click(4.0, 1.0, 13.0, 13.0).unwrap();
        assert_eq!(vp.surface().pixel(4, 1), DEAD);
    }

    #[test]
    fn test_control_events_drive_the_loop() {
        let mut vp = blinker_viewport(WireMode::Dense);
        vp.handle_control(ControlEvent::StepRate(4), 0.0).unwrap();
        assert_eq!(vp.steps_per_frame(), 4);
        vp.handle_control(ControlEvent::PlayPause, 0.0).unwrap();
        assert!(vp.is_running());
        vp.handle_control(ControlEvent::PlayPause, 16.0).unwrap();
        assert!(!vp.is_running());
        vp.handle_control(ControlEvent::Clear, 16.0).unwrap();
        assert_eq!(vp.surface().pixel(4, 4), DEAD);
    }

    #[test]
    fn test_telemetry_tracks_frame_deltas() {
        let mut vp = blinker_viewport(WireMode::Dense);
        vp.play(0.0);
        let id = vp.scheduler_mut().fire_next().unwrap();
        vp.on_frame(id, 20.0);
        let stats = vp.fps_stats().unwrap();
        assert_eq!(stats.latest, 50.0);
        assert!(vp.fps_summary().contains("latest = 50"));
    }

    #[test]
    fn test_wrong_surface_size_rejected() {
        let engine = ReplayEngine::new(4, 4, WireMode::Dense);
        let result = Viewport::new(
            engine,
            PixelSurface::new(5, 5),
            ManualScheduler::new(),
            config(2),
        );
        assert!(matches!(result, Err(ViewportError::Surface(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let engine = ReplayEngine::new(4, 4, WireMode::Dense);
        let surface = surface_for(&engine, 2);
        let result = Viewport::new(
            engine,
            surface,
            ManualScheduler::new(),
            config(0),
        );
        assert!(matches!(result, Err(ViewportError::Config(_))));
    }

    /// Sparse engine that advertises one record pointing outside the grid.
    struct CorruptEngine {
        memory: Vec<u8>,
        released: bool,
    }

    impl CorruptEngine {
        fn new() -> Self {
            Self {
                memory: crate::decode::encode_change(9, 0, true).to_vec(),
                released: false,
            }
        }
    }

    impl Engine for CorruptEngine {
        fn width(&self) -> u32 {
            4
        }

        fn height(&self) -> u32 {
            4
        }

        fn tick(&mut self) {}

        fn randomize(&mut self) {}

        fn clear(&mut self) {}

        fn toggle_cell(&mut self, _row: u32, _col: u32) {}

        fn memory(&self) -> &[u8] {
            &self.memory
        }

        fn payload(&self) -> CellPayload {
            CellPayload::Sparse {
                offset: 0,
                count: 1,
            }
        }

        fn release_changes(&mut self) {
            self.released = true;
        }
    }

    #[test]
    fn test_corrupt_payload_halts_the_loop_but_still_releases() {
        let engine = CorruptEngine::new();
        let surface = surface_for(&engine, 2);
        let mut vp =
            Viewport::new(engine, surface, ManualScheduler::new(), config(2)).unwrap();
        vp.play(0.0);
        assert!(!vp.is_running());
        assert!(!vp.has_pending_frame());
        assert!(vp.engine().released);
        // Gridlines made it in before the decode failed.
        assert_eq!(vp.surface().pixel(0, 0), GRID);
    }

    /// Dense engine whose memory is shorter than its grid needs.
    struct TruncatedEngine {
        memory: Vec<u8>,
    }

    impl Engine for TruncatedEngine {
        fn width(&self) -> u32 {
            4
        }

        fn height(&self) -> u32 {
            4
        }

        fn tick(&mut self) {}

        fn randomize(&mut self) {}

        fn clear(&mut self) {}

        fn toggle_cell(&mut self, _row: u32, _col: u32) {}

        fn memory(&self) -> &[u8] {
            &self.memory
        }

        fn payload(&self) -> CellPayload {
            CellPayload::Dense { offset: 0 }
        }
    }

    #[test]
    fn test_short_view_skips_the_frame_but_keeps_running() {
        let engine = TruncatedEngine {
            memory: vec![0u8; 1],
        };
        let surface = surface_for(&engine, 2);
        let mut vp =
            Viewport::new(engine, surface, ManualScheduler::new(), config(2)).unwrap();
        vp.play(0.0);
        assert!(vp.is_running());
        assert!(vp.has_pending_frame());
        // Gridlines were drawn; no cell was painted.
        assert_eq!(vp.surface().pixel(0, 0), GRID);
        assert_eq!(vp.surface().pixel(1, 1), Rgba::TRANSPARENT);
    }
}
