//! Headless demo host.
//!
//! Builds a tree, feeds it a scripted hand-gesture sequence and a pair of
//! pointer taps, and logs what the scene does. Run with `RUST_LOG=debug` to
//! see every mode transition.
//!
//! ```text
//! noel [config.json] [photo.jpg ...]
//! ```

use std::env;
use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use noel::gesture::{FINGERTIPS, INDEX_TIP, LANDMARK_COUNT, PALM, THUMB_TIP, WRIST};
use noel::prelude::*;

const FPS: f32 = 60.0;

/// One step of the scripted demo.
#[derive(Debug, Clone, Copy)]
enum Cue {
    /// No hand in view.
    Empty,
    /// A hand with fingertips `reach` from the wrist and the thumb `pinch`
    /// from the index tip, palm at `palm_x`.
    Hand { reach: f32, pinch: f32, palm_x: f32 },
}

const SCRIPT: &[(f32, Cue)] = &[
    (1.0, Cue::Empty),
    (2.0, Cue::Hand { reach: 0.6, pinch: 0.3, palm_x: 0.7 }),
    (2.0, Cue::Hand { reach: 0.32, pinch: 0.02, palm_x: 0.5 }),
    (1.5, Cue::Hand { reach: 0.32, pinch: 0.3, palm_x: 0.5 }),
    (2.0, Cue::Hand { reach: 0.1, pinch: 0.3, palm_x: 0.5 }),
    (1.0, Cue::Empty),
];

/// Synthetic landmarks for a cue.
fn landmarks(reach: f32, pinch: f32, palm_x: f32) -> Vec<Vec2> {
    let wrist = Vec2::new(palm_x, 0.9);
    let mut points = vec![wrist; LANDMARK_COUNT];
    for (finger, tip) in FINGERTIPS.into_iter().enumerate() {
        points[tip] = Vec2::new(palm_x - 0.06 + finger as f32 * 0.04, wrist.y - reach);
    }
    points[WRIST] = wrist;
    points[PALM] = Vec2::new(palm_x, wrist.y - reach * 0.4);
    points[THUMB_TIP] = points[INDEX_TIP] - Vec2::new(pinch, 0.0);
    points
}

fn load_config(path: Option<&String>) -> Result<SceneConfig> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            Ok(SceneConfig::from_json(&json)?)
        }
        None => Ok(SceneConfig::new().with_seed(2024)),
    }
}

fn add_photos(scene: &mut Scene, paths: &[String]) -> Result<()> {
    if paths.is_empty() {
        for color in [[200, 40, 40, 255], [40, 160, 60, 255], [230, 200, 90, 255]] {
            scene.add_photo_image(RgbaImage::from_pixel(64, 64, Rgba(color)))?;
        }
        return Ok(());
    }

    for path in paths {
        match scene.add_photo_file(path) {
            Ok(id) => log::info!("{} -> {}", path, id),
            Err(err) => log::warn!("Skipping {}: {}", path, err),
        }
    }
    Ok(())
}

fn summarize(scene: &Scene, instances: &mut Vec<InstanceRaw>) {
    scene.write_instances(instances);
    let focus = scene.focus_target().and_then(|id| scene.registry().get(id));
    match focus {
        Some(record) => log::info!(
            "t={:5.2}s {:?}: {} visible, focus {} at ({:.2}, {:.2}, {:.2}) scale {:.2}",
            scene.elapsed(),
            scene.mode(),
            instances.len(),
            record.id(),
            record.live().position.x,
            record.live().position.y,
            record.live().position.z,
            record.live().scale
        ),
        None => log::info!(
            "t={:5.2}s {:?}: {} visible",
            scene.elapsed(),
            scene.mode(),
            instances.len()
        ),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config_path = args.first().filter(|a| a.ends_with(".json"));
    let photo_args = if config_path.is_some() { &args[1..] } else { &args[..] };

    let mut config = load_config(config_path)?;
    config.options.gestures_enabled = true;

    let mut scene = Scene::new(config);
    scene.populate();
    add_photos(&mut scene, photo_args)?;

    let mut clock = FrameClock::new().with_fixed_step(Duration::from_secs_f32(1.0 / FPS));
    let mut instances = Vec::new();

    // Gesture path
    for &(seconds, cue) in SCRIPT {
        let frames = (seconds * FPS) as u32;
        for _ in 0..frames {
            let points = match cue {
                Cue::Empty => None,
                Cue::Hand { reach, pinch, palm_x } => Some(landmarks(reach, pinch, palm_x)),
            };
            // The camera delivers at half the render rate
            let video_time = (clock.frames() / 2) as f64 / 30.0;
            if let Some(event) = scene.handle_gesture_frame(video_time, points.as_deref()) {
                log::trace!("gesture {:?}", event);
            }

            scene.update(clock.tick().dt);
        }
        summarize(&scene, &mut instances);
    }

    // Pointer path
    scene.gesture_unavailable("demo script finished");
    let start = clock.wall_now();
    for offset in [Duration::ZERO, Duration::from_millis(150)] {
        let tap = PointerEvent::Tap {
            ndc: Vec2::new(0.95, 0.95),
            hit: None,
            at: start + offset,
        };
        if let Some(event) = scene.handle_pointer(tap) {
            log::info!("tap -> {:?}, now {:?}", event, scene.mode());
        }
    }
    for _ in 0..(2.0 * FPS) as u32 {
        scene.update(clock.tick().dt);
    }
    summarize(&scene, &mut instances);

    if let Some(&photo) = scene.registry().photo_ids().first() {
        scene.remove_photo(photo)?;
    }
    log::info!(
        "Done after {} frames, {} photos left",
        clock.frames(),
        scene.photos().len()
    );
    Ok(())
}
