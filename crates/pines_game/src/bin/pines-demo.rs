//! Headless Pines demo
//!
//! Builds a small procedural level and plays it with scripted input.
//!
//! Run with: cargo run -p pines_game --bin pines-demo -- [--audio] [--frames N] [--seed N] [--config PATH]

use glam::{Vec2, Vec3};
use pines_audio::{open_default_backend, ChannelPurpose};
use pines_game::prelude::*;
use pines_physics::StaticMesh;
use rand::rngs::StdRng;
use rand::SeedableRng;

const FRAME_TIME: f32 = 1.0 / 60.0;

struct Options {
    audio: bool,
    frames: u32,
    seed: u64,
    config: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            audio: false,
            frames: 60 * 180,
            seed: 7,
            config: None,
        }
    }
}

impl Options {
    fn from_args() -> std::result::Result<Self, String> {
        let mut options = Self::default();
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--audio" => options.audio = true,
                "--frames" => options.frames = parse_value(&arg, args.next())?,
                "--seed" => options.seed = parse_value(&arg, args.next())?,
                "--config" => options.config = Some(args.next().ok_or("--config needs a path")?),
                other => return Err(format!("unknown argument '{other}'")),
            }
        }
        Ok(options)
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> std::result::Result<T, String> {
    value
        .as_deref()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("{flag} needs a numeric value"))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match Options::from_args() {
        Ok(options) => options,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&options) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run(options: &Options) -> Result<()> {
    let mut config = match &options.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    config.audio.headless = !options.audio;

    let backend = open_default_backend(&config.audio);

    let (scene, meshes) = build_level();
    let mut session = PlaySession::new(config, scene, &meshes, backend, StdRng::seed_from_u64(options.seed))?;

    let mut outcome = Outcome::Playing;
    for frame in 0..options.frames {
        outcome = session.update(FRAME_TIME, &scripted_input(frame));

        if frame % 600 == 0 {
            let state = session.player_state();
            log::info!(
                "t={:>5.1}s health {:>5.1} stamina {:>5.1} pages {}/{} aggression {} static {:.2}",
                frame as f32 * FRAME_TIME,
                state.health,
                state.stamina,
                session.pages().collected(),
                session.pages().total(),
                session.antagonist().aggression(),
                session.static_intensity()
            );
        }
        if outcome != Outcome::Playing {
            break;
        }
    }

    log::info!(
        "Demo finished: {} ({} pages, ambience '{}')",
        outcome,
        session.pages().collected(),
        session.ambience().current_clip().unwrap_or("-")
    );
    Ok(())
}

/// Walk a slow circle, sprinting in bursts and pressing interact throughout
fn scripted_input(frame: u32) -> PlayerInput {
    let seconds = frame as f32 * FRAME_TIME;
    PlayerInput {
        forward: 1.0,
        right: 0.0,
        look: Vec2::new(0.004, 0.0),
        sprint: seconds % 10.0 < 3.0,
        jump: frame % 900 == 450,
        interact: true,
    }
}

/// Meadow with a tiled courtyard, a few walls and eight pages
fn build_level() -> (Scene, MeshLibrary) {
    let mut meshes = MeshLibrary::new();
    meshes.insert("meadow".into(), vec![StaticMesh::plane("grass_field", 80.0)]);
    meshes.insert(
        "courtyard".into(),
        vec![StaticMesh::cuboid("tile_floor", Vec3::new(6.0, 0.05, 6.0))],
    );
    meshes.insert(
        "wall".into(),
        vec![StaticMesh::cuboid("brick_wall", Vec3::new(4.0, 2.0, 0.25))],
    );

    let mut scene = Scene::new();
    scene.spawn(
        "meadow",
        Transform::default(),
        vec![Component::MeshRenderer(MeshRenderer {
            mesh: "meadow".into(),
            instances: Vec::new(),
        })],
    );
    scene.spawn(
        "courtyard",
        Transform::at(Vec3::new(0.0, 0.0, -20.0)),
        vec![Component::MeshRenderer(MeshRenderer {
            mesh: "courtyard".into(),
            instances: Vec::new(),
        })],
    );
    scene.spawn(
        "walls",
        Transform::default(),
        vec![Component::MeshRenderer(MeshRenderer {
            mesh: "wall".into(),
            instances: vec![
                Transform::at(Vec3::new(12.0, 2.0, -10.0)),
                Transform::at(Vec3::new(-12.0, 2.0, -10.0)),
                Transform::at(Vec3::new(0.0, 2.0, 14.0)),
                Transform::at(Vec3::new(20.0, 2.0, 5.0)).with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0)),
            ],
        })],
    );
    scene.spawn(
        "player",
        Transform::default(),
        vec![
            Component::Player,
            Component::AudioSource {
                purpose: ChannelPurpose::Footsteps,
            },
            Component::AudioSource {
                purpose: ChannelPurpose::Static,
            },
        ],
    );
    scene.spawn(
        "antagonist",
        Transform::at(Vec3::new(10.0, 1.0, -35.0)),
        vec![
            Component::Antagonist,
            Component::AudioSource {
                purpose: ChannelPurpose::Ambience,
            },
        ],
    );

    let spawn_points = (0..10)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / 10.0;
            Vec3::new(angle.cos() * 9.0, 1.2, angle.sin() * 9.0 - 4.0)
        })
        .collect();
    scene.spawn(
        "pages",
        Transform::default(),
        vec![
            Component::PageSpawner(PageSpawner {
                total_pages: 8,
                spawn_points,
            }),
            Component::AudioSource {
                purpose: ChannelPurpose::Stinger,
            },
        ],
    );

    (scene, meshes)
}
