//! Quick render-pipeline performance test

use std::time::Instant;

use rand::{Rng, SeedableRng, rngs::StdRng};

use life_view::{
    CellGeometry, ManualScheduler, PixelSurface, RenderConfig, ReplayEngine, Viewport, WireMode,
};

const FRAMES: u64 = 240;

/// Two random phases, so every tick diffs most of the grid.
fn scripted_engine(size: u32, wire: WireMode) -> ReplayEngine {
    let mut rng = StdRng::seed_from_u64(42);
    let mut engine = ReplayEngine::new(size, size, wire);
    for _ in 0..2 {
        let mut frame = Vec::new();
        for row in 0..size {
            for col in 0..size {
                if rng.gen_bool(0.3) {
                    frame.push((row, col));
                }
            }
        }
        engine.push_frame(&frame);
    }
    engine
}

fn run(size: u32, wire: WireMode) -> (u64, f64) {
    let engine = scripted_engine(size, wire);
    let config = RenderConfig::default();
    let geometry = CellGeometry::new(config.cell_size);
    let surface = PixelSurface::new(
        geometry.surface_width(size),
        geometry.surface_height(size),
    );
    let mut view = Viewport::new(engine, surface, ManualScheduler::new(), config).unwrap();

    let start = Instant::now();
    let mut now_ms = 0.0;
    view.play(now_ms);
    let mut rendered: u64 = 1;
    while rendered < FRAMES {
        let Some(id) = view.scheduler_mut().fire_next() else {
            break;
        };
        now_ms += 1000.0 / 60.0;
        view.on_frame(id, now_ms);
        rendered += 1;
    }
    view.pause();

    (rendered, start.elapsed().as_secs_f64())
}

fn main() {
    println!("=== Render Pipeline Performance Test ===\n");

    for size in [64u32, 128, 256] {
        println!("Grid size: {}x{}", size, size);

        for wire in [WireMode::Dense, WireMode::Sparse] {
            let (rendered, elapsed) = run(size, wire);
            println!(
                "  {:?}: {} frames in {:.2}s ({:.1} frames/sec)",
                wire,
                rendered,
                elapsed,
                rendered as f64 / elapsed
            );
        }
        println!();
    }
}
