//! Life View - incremental Game of Life rendering over engine-owned memory.
//!
//! This crate renders a Game of Life simulation whose state lives in a
//! foreign engine's linear memory. It decodes bit-packed snapshots or
//! sparse change records straight out of that memory and paints them onto
//! a pixel surface, under an animation loop that keeps the two in step.
//!
//! # Architecture
//!
//! The pipeline is split along the data path:
//!
//! - `memory`: bounds-checked, zero-copy views over engine-owned bytes
//! - `decode`: dense snapshots and sparse change records out of a view
//! - `render`: pixel surfaces, grid geometry, and cell painting
//! - `control` / `telemetry`: animation state machine and fps tracking
//! - `viewport`: the per-frame pipeline tying an engine to a surface
//! - `replay`: a scripted engine for demos and tests
//!
//! # Example
//!
//! ```rust,no_run
//! use life_view::{
//!     blinker_frames, ManualScheduler, PixelSurface, RenderConfig, ReplayEngine, Viewport,
//!     WireMode,
//! };
//!
//! // Script a blinker on a 16x16 grid.
//! let mut engine = ReplayEngine::new(16, 16, WireMode::Sparse);
//! let [first, second] = blinker_frames();
//! engine.push_frame(&first);
//! engine.push_frame(&second);
//!
//! // Render into an in-memory framebuffer at the default cell size.
//! let config = RenderConfig::default();
//! let surface = PixelSurface::new(16 * 6 + 1, 16 * 6 + 1);
//! let mut view = Viewport::new(engine, surface, ManualScheduler::new(), config).unwrap();
//!
//! // Drive the loop by hand: play, then pump scheduled frames.
//! view.play(0.0);
//! for frame in 1..60 {
//!     if let Some(id) = view.scheduler_mut().fire_next() {
//!         view.on_frame(id, f64::from(frame) * 16.7);
//!     }
//! }
//! println!("{}", view.fps_summary());
//! ```

pub mod config;
pub mod control;
pub mod decode;
pub mod engine;
pub mod input;
pub mod memory;
pub mod render;
pub mod replay;
pub mod telemetry;
pub mod viewport;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use config::{Palette, RenderConfig};
pub use control::{FrameId, FrameScheduler, ManualScheduler};
pub use decode::{CellPaint, DecodeError, DenseSnapshot};
pub use engine::{CellPayload, Engine, WireMode};
pub use input::ControlEvent;
pub use memory::MemoryView;
pub use render::{CellGeometry, GridRenderer, PixelSurface, Rgba, Surface};
pub use replay::{beacon_frames, blinker_frames, ReplayEngine};
pub use telemetry::{FpsStats, FpsWindow};
pub use viewport::{Viewport, ViewportError};
