//! WebAssembly bindings for Life View.
//!
//! Provides a thin wrapper around [`Viewport`] for browser hosts: the host
//! supplies requestAnimationFrame-style callbacks and blits the rendered
//! framebuffer, everything else stays on this side of the boundary.

use wasm_bindgen::prelude::*;

use crate::config::RenderConfig;
use crate::control::{FrameId, FrameScheduler};
use crate::engine::{Engine, WireMode};
use crate::input::ControlEvent;
use crate::render::{CellGeometry, PixelSurface, Surface};
use crate::replay::ReplayEngine;
use crate::viewport::Viewport;

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// Frame scheduler backed by host callbacks, typically
/// `requestAnimationFrame` and `cancelAnimationFrame`.
struct JsScheduler {
    request: js_sys::Function,
    revoke: js_sys::Function,
}

impl FrameScheduler for JsScheduler {
    fn schedule(&mut self) -> FrameId {
        let id = self
            .request
            .call0(&JsValue::NULL)
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or_default();
        FrameId(id as u64)
    }

    fn cancel(&mut self, id: FrameId) {
        let _ = self.revoke.call1(&JsValue::NULL, &JsValue::from_f64(id.0 as f64));
    }
}

/// WebAssembly wrapper for an animated Game of Life viewport.
#[wasm_bindgen]
pub struct WasmViewport {
    viewport: Viewport<ReplayEngine, PixelSurface, JsScheduler>,
}

#[wasm_bindgen]
impl WasmViewport {
    /// Create a viewport over a scripted engine with an all-dead grid.
    ///
    /// # Arguments
    /// * `width`, `height` - grid dimensions in cells
    /// * `sparse` - emit change records instead of full snapshots
    /// * `config_json` - JSON string containing RenderConfig
    /// * `schedule` - callback requesting one animation frame, returns its id
    /// * `cancel` - callback revoking a previously returned id
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: u32,
        height: u32,
        sparse: bool,
        config_json: &str,
        schedule: js_sys::Function,
        cancel: js_sys::Function,
    ) -> Result<WasmViewport, JsValue> {
        let config: RenderConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?;
        config
            .validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;

        let wire = if sparse {
            WireMode::Sparse
        } else {
            WireMode::Dense
        };
        let engine = ReplayEngine::new(width, height, wire);

        let geometry = CellGeometry::new(config.cell_size);
        let surface = PixelSurface::new(
            geometry.surface_width(width),
            geometry.surface_height(height),
        );
        let scheduler = JsScheduler {
            request: schedule,
            revoke: cancel,
        };

        let viewport = Viewport::new(engine, surface, scheduler, config)
            .map_err(|e| JsValue::from_str(&format!("Invalid viewport: {e}")))?;

        Ok(WasmViewport { viewport })
    }

    /// Append one scripted frame as an array of `[row, col]` pairs.
    #[wasm_bindgen(js_name = pushFrame)]
    pub fn push_frame(&mut self, cells: JsValue) -> Result<(), JsValue> {
        let cells: Vec<(u32, u32)> = serde_wasm_bindgen::from_value(cells)
            .map_err(|e| JsValue::from_str(&format!("Invalid frame: {e}")))?;

        let engine = self.viewport.engine();
        for &(row, col) in &cells {
            if row >= engine.height() || col >= engine.width() {
                return Err(JsValue::from_str(&format!(
                    "Cell ({row}, {col}) is outside the grid"
                )));
            }
        }
        self.viewport.engine_mut().push_frame(&cells);
        Ok(())
    }

    /// Decode and paint the current state without touching the loop.
    #[wasm_bindgen]
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.viewport
            .render_now()
            .map_err(|e| JsValue::from_str(&format!("Decode error: {e}")))
    }

    /// Start the animation loop.
    #[wasm_bindgen]
    pub fn play(&mut self, now_ms: f64) {
        self.viewport.play(now_ms);
    }

    /// Stop the animation loop and cancel the pending frame.
    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.viewport.pause();
    }

    /// Toggle between running and idle.
    #[wasm_bindgen(js_name = playPause)]
    pub fn play_pause(&mut self, now_ms: f64) {
        if let Err(e) = self
            .viewport
            .handle_control(ControlEvent::PlayPause, now_ms)
        {
            log::warn!("play/pause control failed: {e}");
        }
    }

    /// Callback for a scheduled animation frame.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self, id: f64, now_ms: f64) {
        self.viewport.on_frame(FrameId(id as u64), now_ms);
    }

    /// Toggle the cell under a pointer position, in display pixels relative
    /// to the canvas box.
    #[wasm_bindgen]
    pub fn click(
        &mut self,
        x: f64,
        y: f64,
        display_width: f64,
        display_height: f64,
    ) -> Result<(), JsValue> {
        self.viewport
            .handle_click(x, y, display_width, display_height)
            .map_err(|e| JsValue::from_str(&format!("Decode error: {e}")))
    }

    /// Reroll every cell.
    #[wasm_bindgen]
    pub fn randomize(&mut self) -> Result<(), JsValue> {
        self.viewport
            .handle_control(ControlEvent::Randomize, 0.0)
            .map_err(|e| JsValue::from_str(&format!("Decode error: {e}")))
    }

    /// Kill every cell.
    #[wasm_bindgen]
    pub fn clear(&mut self) -> Result<(), JsValue> {
        self.viewport
            .handle_control(ControlEvent::Clear, 0.0)
            .map_err(|e| JsValue::from_str(&format!("Decode error: {e}")))
    }

    /// Change the generations advanced per frame.
    #[wasm_bindgen(js_name = setStepsPerFrame)]
    pub fn set_steps_per_frame(&mut self, steps: u32) {
        self.viewport.set_steps_per_frame(steps);
    }

    /// Whether the animation loop is running.
    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.viewport.is_running()
    }

    /// Get framebuffer width in pixels.
    #[wasm_bindgen(js_name = surfaceWidth)]
    pub fn surface_width(&self) -> u32 {
        self.viewport.surface().width()
    }

    /// Get framebuffer height in pixels.
    #[wasm_bindgen(js_name = surfaceHeight)]
    pub fn surface_height(&self) -> u32 {
        self.viewport.surface().height()
    }

    /// Pointer to the RGBA framebuffer in linear memory, laid out for a
    /// direct `ImageData` blit.
    #[wasm_bindgen(js_name = framePtr)]
    pub fn frame_ptr(&self) -> *const u8 {
        self.viewport.surface().as_bytes().as_ptr()
    }

    /// Byte length of the RGBA framebuffer.
    #[wasm_bindgen(js_name = frameByteLen)]
    pub fn frame_byte_len(&self) -> usize {
        self.viewport.surface().as_bytes().len()
    }

    /// Get the fps readout block as text.
    #[wasm_bindgen(js_name = fpsSummary)]
    pub fn fps_summary(&self) -> String {
        self.viewport.fps_summary()
    }

    /// Get frame-rate statistics as an object, or undefined before the
    /// second frame.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.viewport.fps_stats())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }
}
