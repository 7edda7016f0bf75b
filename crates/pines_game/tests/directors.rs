//! Audio directors against a headless backend

use approx::assert_relative_eq;
use glam::{Mat4, Vec3};
use pines_ai::PlayerState;
use pines_audio::{AudioChannel, ChannelPurpose, HeadlessBackend};
use pines_game::prelude::*;
use pines_physics::{PhysicsConfig, PhysicsWorld, StaticMesh};
use std::rc::Rc;

fn channel(purpose: ChannelPurpose) -> (AudioChannel, HeadlessBackend) {
    let backend = HeadlessBackend::new();
    (AudioChannel::new(purpose, Rc::new(backend.clone()), 1.0), backend)
}

fn walking(sprinting: bool) -> PlayerState {
    PlayerState {
        is_moving: true,
        is_sprinting: sprinting,
        ..PlayerState::default()
    }
}

#[test]
fn test_footsteps_keep_cadence_and_alternate() {
    let (channel, backend) = channel(ChannelPurpose::Footsteps);
    let mut footsteps = FootstepDirector::new(channel, FootstepConfig::default());
    let player = walking(false);

    let dt = 0.05;
    let mut steps = Vec::new();
    for frame in 0..140 {
        if let Some(clip) = footsteps.update(dt, &player, Surface::Grass) {
            steps.push((frame as f32 * dt, clip));
        }
    }

    assert!((8..=10).contains(&steps.len()), "{} steps", steps.len());
    for pair in steps.windows(2) {
        assert!(pair[1].0 - pair[0].0 >= 0.7 - 1e-3);
        assert_ne!(pair[0].1, pair[1].1);
    }
    assert_eq!(steps[0].1, "step1.wav");
    assert_eq!(backend.loads().len(), steps.len());
}

#[test]
fn test_sprinting_steps_faster() {
    let (channel, _) = channel(ChannelPurpose::Footsteps);
    let mut footsteps = FootstepDirector::new(channel, FootstepConfig::default());

    let count = |footsteps: &mut FootstepDirector, sprinting: bool| {
        let player = walking(sprinting);
        (0..200)
            .filter(|_| footsteps.update(0.05, &player, Surface::Grass).is_some())
            .count()
    };

    let walked = count(&mut footsteps, false);
    let sprinted = count(&mut footsteps, true);
    assert!(sprinted > walked);
}

#[test]
fn test_standing_still_is_silent() {
    let (channel, backend) = channel(ChannelPurpose::Footsteps);
    let mut footsteps = FootstepDirector::new(channel, FootstepConfig::default());
    let player = PlayerState::default();

    for _ in 0..100 {
        assert_eq!(footsteps.update(0.1, &player, Surface::Grass), None);
    }
    assert!(backend.loads().is_empty());
}

#[test]
fn test_alternation_is_per_surface() {
    let (channel, _) = channel(ChannelPurpose::Footsteps);
    let config = FootstepConfig {
        walk_interval: 0.1,
        ..FootstepConfig::default()
    };
    let mut footsteps = FootstepDirector::new(channel, config);
    let player = walking(false);

    assert_eq!(footsteps.update(0.2, &player, Surface::Grass), Some("step1.wav"));
    assert_eq!(footsteps.update(0.2, &player, Surface::Tile), Some("tilestep1.wav"));
    assert_eq!(footsteps.update(0.2, &player, Surface::Grass), Some("step2.wav"));
    assert_eq!(footsteps.update(0.2, &player, Surface::Tile), Some("tilestep2.wav"));
}

#[test]
fn test_surface_probe_ignores_capsule() {
    let mut physics = PhysicsWorld::new(PhysicsConfig::default());
    let tag = 7;
    physics
        .add_static_mesh(&StaticMesh::plane("courtyard_tile", 10.0), Mat4::IDENTITY, tag)
        .unwrap();
    physics.initialize_player_collider(Vec3::new(0.0, 1.0, 0.0), 0.4, 1.8).unwrap();
    physics.sync_query_pipeline();

    let mut surfaces = SurfaceRegistry::new();
    surfaces.register_mesh(tag, "courtyard_tile");

    assert_eq!(surfaces.classify(&physics, Vec3::new(0.0, 1.0, 0.0), 2.5), Surface::Tile);
    // Out of probe range and off the mesh both fall back to grass
    assert_eq!(surfaces.classify(&physics, Vec3::new(0.0, 5.0, 0.0), 2.5), Surface::Grass);
    assert_eq!(surfaces.classify(&physics, Vec3::new(30.0, 1.0, 0.0), 2.5), Surface::Grass);
}

#[test]
fn test_ambience_crossfades_with_aggression() {
    let (channel, backend) = channel(ChannelPurpose::Ambience);
    let mut ambient = AmbientDirector::new(channel);

    ambient.update(0.0, 1, 0, 20);
    assert_eq!(ambient.channel().current_clip(), Some("wind.wav"));
    assert!(!ambient.channel().is_crossfading());

    ambient.update(0.1, 10, 0, 20);
    assert_eq!(ambient.channel().current_clip(), Some("tension_3.wav"));
    assert!(ambient.channel().is_crossfading());

    // A change during the fade waits for it to finish
    for _ in 0..100 {
        ambient.update(0.05, 15, 0, 20);
        assert!(backend.live_voices().len() <= 2);
    }
    assert_eq!(ambient.channel().current_clip(), Some("tension_4.wav"));
    assert!(!ambient.channel().is_crossfading());
    assert_eq!(backend.playing_voices().len(), 1);
}

#[test]
fn test_unchanged_aggression_does_not_reload() {
    let (channel, backend) = channel(ChannelPurpose::Ambience);
    let mut ambient = AmbientDirector::new(channel);

    for _ in 0..50 {
        ambient.update(0.1, 6, 0, 20);
    }
    assert_eq!(backend.loads(), vec!["tension_2.wav".to_string()]);
}

#[test]
fn test_static_tracks_health_and_stops() {
    let (channel, backend) = channel(ChannelPurpose::Static);
    let mut noise = StaticDirector::new(channel);

    noise.update(0.0, 1.0);
    assert!(noise.channel().is_silent());

    noise.update(0.0, 0.5);
    assert_eq!(noise.channel().current_clip(), Some("static_medium.wav"));
    assert_relative_eq!(noise.channel().volume(), 0.5);

    noise.update(0.1, 0.05);
    assert_eq!(noise.channel().current_clip(), Some("static_heavy.wav"));

    noise.update(0.1, 1.0);
    assert!(noise.channel().is_silent());
    assert!(backend.live_voices().is_empty());
}
