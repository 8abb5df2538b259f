// rainsim - Drive the rain scene headless
//
// Pipeline:
//   1. Load settings (file, then env overrides), validate
//   2. Build the scene at the requested screen size
//   3. Tick N frames on a simulated 60 Hz clock, logging counts
//   4. Encode the last frame and report coverage
//
// Usage: cargo run --bin rainsim -- [--config FILE] [--frames N] [--width W] [--height H] [--seed S]

use std::env;
use std::process::ExitCode;

use rainfall_engine::render::Encoder;
use rainfall_engine::{RainScene, Result, Settings};
use tracing::{error, info};

const FRAME_MS: f64 = 1000.0 / 60.0;
const LOG_EVERY: u64 = 60;

struct Args {
    config: Option<String>,
    frames: u64,
    width: u32,
    height: u32,
    seed: Option<u64>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args { config: None, frames: 600, width: 1280, height: 720, seed: None };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--config" => { parsed.config = value.cloned(); i += 2; }
            "--frames" => { parsed.frames = value.and_then(|s| s.parse().ok()).unwrap_or(600); i += 2; }
            "--width" => { parsed.width = value.and_then(|s| s.parse().ok()).unwrap_or(1280); i += 2; }
            "--height" => { parsed.height = value.and_then(|s| s.parse().ok()).unwrap_or(720); i += 2; }
            "--seed" => { parsed.seed = value.and_then(|s| s.parse().ok()); i += 2; }
            _ => i += 1,
        }
    }
    parsed
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    match run(parse_args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("rainsim failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.apply_env_overrides();
    settings.validate()?;

    let seed = args.seed.unwrap_or_else(rainfall_engine::particles::clock_seed);
    info!(
        "{}x{}, {} frames, {} drops, seed {seed}",
        args.width, args.height, args.frames, settings.rain.count
    );

    let mut scene = RainScene::new(settings, args.width as f32, args.height as f32, seed, 0.0);
    for frame in 1..=args.frames {
        scene.tick(frame as f64 * FRAME_MS);
        if frame % LOG_EVERY == 0 {
            info!(
                "frame {frame}: {} drops, {} splashes ({} particles), {} fps",
                scene.drop_count(),
                scene.splash_count(),
                scene.splash_particle_count(),
                scene.fps()
            );
        }
    }

    let mut encoder = Encoder::new(args.width, args.height);
    encoder.encode_rain(scene.rain().particles(), scene.settings().rain.width);
    encoder.encode_splashes(scene.splashes());
    let lit = encoder.lit();
    info!(
        "final frame: {lit} of {} pixels lit ({:.2}%)",
        encoder.len(),
        100.0 * lit as f64 / encoder.len().max(1) as f64
    );
    Ok(())
}
