//! Box room demo
//!
//! Builds the box room scene and drives it headlessly through the recording
//! backend: a scripted click starts the game, the ball spins, the bouncer
//! follows the keyframe schedule. Frame statistics are logged at the end.
//!
//! Usage: `box_room [frames]`

mod assets;

use std::path::Path;

use scene_engine::prelude::*;

use assets::FileAssets;

const DEFAULT_FRAMES: u64 = 120;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting box room demo");

    let frames = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => DEFAULT_FRAMES,
    };

    let result = run(Path::new(env!("CARGO_MANIFEST_DIR")), frames);
    match &result {
        Ok(summary) => log::info!(
            "Box room demo finished: {} frames, {} draws and {} indices in the last frame",
            summary.frames,
            summary.last_frame.draw_calls,
            summary.last_frame.indices_submitted
        ),
        Err(e) => log::error!("Box room demo failed: {}", e),
    }
    result.map(|_| ())
}

fn run(root: &Path, frames: u64) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default(root.join("config.toml"))?;
    let description = SceneDescription::load(root.join("scenes/box_room.ron"))?;
    let mut assets = FileAssets::new(root.join("resources"));

    let (width, height) = (config.window.width, config.window.height);
    let mut engine = Engine::initialize(config, RecordingBackend::new(), &mut assets, &description)?;

    // click once to start the game clock
    let mut platform = HeadlessPlatform::new(width, height, frames).with_script([vec![MouseButton::Left]]);
    Ok(engine.run(&mut platform))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_room_runs() {
        let summary = run(Path::new(env!("CARGO_MANIFEST_DIR")), 3).unwrap();
        assert_eq!(summary.frames, 3);
        // room, crate, pedestal, ball, bouncer
        assert_eq!(summary.last_frame.draw_calls, 5);
        assert_eq!(summary.last_frame.lights_bound, 1);
    }
}
