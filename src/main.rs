//! Life View CLI - Run the scripted Game of Life demo in the terminal.

use std::fs;
use std::time::Instant;

use life_view::{
    beacon_frames, blinker_frames, decode::dense_snapshot, render::CellGeometry, CellPayload,
    Engine, ManualScheduler, PixelSurface, RenderConfig, ReplayEngine, Viewport, WireMode,
};

const GRID_COLS: u32 = 16;
const GRID_ROWS: u32 = 16;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).is_some_and(|arg| arg == "--example") {
        print_example_config();
        return;
    }

    if args.get(1).is_some_and(|arg| arg.starts_with('-')) {
        eprintln!("Usage: {} [config.json] [frames]", args[0]);
        eprintln!();
        eprintln!("Animate two scripted oscillators and print the final grid.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to render configuration file (optional)");
        eprintln!("  frames       Number of animation frames (default: 60)");
        eprintln!();
        eprintln!("Example configuration is generated with the --example flag.");
        std::process::exit(1);
    }

    let frames: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(60);

    // Load configuration
    let config: RenderConfig = match args.get(1) {
        Some(path) => {
            let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config file: {}", e);
                std::process::exit(1);
            });
            serde_json::from_str(&config_str).unwrap_or_else(|e| {
                eprintln!("Error parsing config: {}", e);
                std::process::exit(1);
            })
        }
        None => RenderConfig::default(),
    };
    config.validate().unwrap_or_else(|e| {
        eprintln!("Error in config: {}", e);
        std::process::exit(1);
    });

    println!("Life View Demo");
    println!("==============");
    println!(
        "Grid: {}x{} at cell size {}",
        GRID_COLS, GRID_ROWS, config.cell_size
    );
    println!("Frames: {}", frames);
    println!();

    // Script a blinker and a beacon onto one grid.
    let mut engine = ReplayEngine::new(GRID_COLS, GRID_ROWS, WireMode::Dense);
    let [blink_a, blink_b] = blinker_frames();
    let [beacon_a, beacon_b] = beacon_frames();
    let mut first = Vec::new();
    place(&mut first, &blink_a, 2, 2);
    place(&mut first, &beacon_a, 9, 9);
    let mut second = Vec::new();
    place(&mut second, &blink_b, 2, 2);
    place(&mut second, &beacon_b, 9, 9);
    engine.push_frame(&first);
    engine.push_frame(&second);

    let geometry = CellGeometry::new(config.cell_size);
    let surface = PixelSurface::new(
        geometry.surface_width(GRID_COLS),
        geometry.surface_height(GRID_ROWS),
    );
    let mut view = Viewport::new(engine, surface, ManualScheduler::new(), config)
        .unwrap_or_else(|e| {
            eprintln!("Error building viewport: {}", e);
            std::process::exit(1);
        });

    // Run the loop by hand at a nominal 60 Hz clock.
    println!("Running animation...");
    let start = Instant::now();
    let mut now_ms = 0.0;
    view.play(now_ms);
    let mut rendered: u64 = 1;
    while rendered < frames {
        let Some(id) = view.scheduler_mut().fire_next() else {
            break;
        };
        now_ms += 1000.0 / 60.0;
        view.on_frame(id, now_ms);
        rendered += 1;
    }
    view.pause();

    let elapsed = start.elapsed();

    println!();
    println!("Final state after {} frames:", rendered);
    if let CellPayload::Dense { offset } = view.engine().payload() {
        match dense_snapshot(view.engine().memory(), offset, GRID_COLS, GRID_ROWS) {
            Ok(snapshot) => print!("{}", snapshot),
            Err(e) => eprintln!("Error decoding final state: {}", e),
        }
    }
    println!();
    println!("{}", view.fps_summary());
    println!();
    println!(
        "Time: {:.2}s ({:.1} frames/s)",
        elapsed.as_secs_f32(),
        rendered as f32 / elapsed.as_secs_f32()
    );
}

fn place(frame: &mut Vec<(u32, u32)>, cells: &[(u32, u32)], row: u32, col: u32) {
    frame.extend(cells.iter().map(|&(r, c)| (r + row, c + col)));
}

fn print_example_config() {
    let config = RenderConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
