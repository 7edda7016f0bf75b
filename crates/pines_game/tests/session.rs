//! Play session wiring and the frame loop, driven headless

use approx::assert_relative_eq;
use glam::Vec3;
use pines_ai::AntagonistConfig;
use pines_audio::HeadlessBackend;
use pines_game::prelude::*;
use pines_physics::StaticMesh;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::rc::Rc;

const DT: f32 = 1.0 / 60.0;

fn meshes() -> MeshLibrary {
    let mut meshes = MeshLibrary::new();
    meshes.insert("field".into(), vec![StaticMesh::plane("grass_field", 60.0)]);
    meshes.insert("figure".into(), vec![StaticMesh::cuboid("figure", Vec3::new(0.3, 1.0, 0.3))]);
    meshes
}

/// Config whose antagonist never gets a teleport opportunity during a test
fn quiet_config() -> GameConfig {
    GameConfig::default().with_antagonist(AntagonistConfig::default().with_teleport_cooldown(1000.0))
}

fn level(page_points: Vec<Vec3>) -> Scene {
    let mut scene = Scene::new();
    scene.spawn(
        "field",
        Transform::default(),
        vec![Component::MeshRenderer(MeshRenderer {
            mesh: "field".into(),
            instances: Vec::new(),
        })],
    );
    scene.spawn("player", Transform::default(), vec![Component::Player]);
    scene.spawn("antagonist", Transform::at(Vec3::new(0.0, 1.0, 50.0)), vec![Component::Antagonist]);
    if !page_points.is_empty() {
        scene.spawn(
            "pages",
            Transform::default(),
            vec![Component::PageSpawner(PageSpawner {
                total_pages: page_points.len() as u32,
                spawn_points: page_points,
            })],
        );
    }
    scene
}

fn session(config: GameConfig, scene: Scene) -> (PlaySession, HeadlessBackend) {
    let backend = HeadlessBackend::new();
    let session = PlaySession::new(config, scene, &meshes(), Rc::new(backend.clone()), StdRng::seed_from_u64(3))
        .unwrap();
    (session, backend)
}

fn settle(session: &mut PlaySession) {
    for _ in 0..180 {
        session.update(DT, &PlayerInput::default());
    }
}

/// Point the camera straight at `target`
fn aim_at(session: &mut PlaySession, target: Vec3) {
    let direction = (target - session.rig().eye()).normalize();
    let yaw = (-direction.x).atan2(-direction.z);
    let pitch = direction.y.asin();
    session.rig_mut().set_look(yaw, pitch);
}

fn interact() -> PlayerInput {
    PlayerInput {
        interact: true,
        ..PlayerInput::default()
    }
}

#[test]
fn test_missing_player_fails() {
    let mut scene = Scene::new();
    scene.spawn("antagonist", Transform::default(), vec![Component::Antagonist]);
    let result = PlaySession::new(
        GameConfig::default(),
        scene,
        &meshes(),
        Rc::new(HeadlessBackend::new()),
        StdRng::seed_from_u64(0),
    );
    assert!(matches!(result, Err(GameError::MissingEntity("player"))));
}

#[test]
fn test_missing_antagonist_fails() {
    let mut scene = Scene::new();
    scene.spawn("player", Transform::default(), vec![Component::Player]);
    let result = PlaySession::new(
        GameConfig::default(),
        scene,
        &meshes(),
        Rc::new(HeadlessBackend::new()),
        StdRng::seed_from_u64(0),
    );
    assert!(matches!(result, Err(GameError::MissingEntity("antagonist"))));
}

#[test]
fn test_capsule_lands_on_level() {
    let (mut session, _) = session(quiet_config(), level(Vec::new()));
    let start = session.rig().position();
    assert_relative_eq!(start.y, 2.0, epsilon = 1e-4);

    settle(&mut session);

    assert!(session.physics().is_grounded());
    let landed = session.rig().position();
    assert!(landed.y < start.y);
    assert!(landed.y > 0.0);
    // The scene follows the capsule
    let player = session.scene().get(session.player_entity()).unwrap();
    assert_eq!(player.transform.position, landed);
}

#[test]
fn test_ambience_starts_on_wind() {
    let (session, backend) = session(quiet_config(), level(Vec::new()));

    assert_eq!(session.ambience().current_clip(), Some("wind.wav"));
    let playing = backend.playing_voices();
    assert!(playing.iter().any(|v| v.clip == "wind.wav" && v.looping));
    assert!(session.static_channel().is_silent());
}

#[test]
fn test_far_antagonist_does_no_harm() {
    let (mut session, _) = session(quiet_config(), level(Vec::new()));
    settle(&mut session);

    let report = session.last_report().unwrap();
    assert_eq!(report.observation.detection, pines_ai::Detection::Neither);
    assert_eq!(session.player_state().health, 100.0);
    assert_eq!(session.outcome(), Outcome::Playing);
    assert_eq!(session.static_intensity(), 0.0);
}

#[test]
fn test_antagonist_mesh_is_render_only() {
    let mut scene = Scene::new();
    scene.spawn(
        "field",
        Transform::default(),
        vec![Component::MeshRenderer(MeshRenderer {
            mesh: "field".into(),
            instances: Vec::new(),
        })],
    );
    scene.spawn("player", Transform::default(), vec![Component::Player]);
    scene.spawn(
        "antagonist",
        Transform::at(Vec3::new(0.0, 1.0, -10.0)),
        vec![
            Component::Antagonist,
            Component::MeshRenderer(MeshRenderer {
                mesh: "figure".into(),
                instances: Vec::new(),
            }),
        ],
    );
    let (mut session, _) = session(quiet_config(), scene);
    assert_eq!(session.physics().static_body_count(), 1);

    settle(&mut session);

    let report = session.last_report().unwrap();
    assert!(report.observation.visible);
    assert_eq!(report.observation.detection, pines_ai::Detection::Looking);
    assert!(session.player_state().health < 100.0);
}

#[test]
fn test_antagonist_faces_player() {
    let (mut session, _) = session(quiet_config(), level(Vec::new()));
    session.update(DT, &PlayerInput::default());

    let body = *session.antagonist_body();
    let scene_yaw = session.scene().get(session.antagonist_entity()).unwrap().transform.rotation.y;
    assert_eq!(scene_yaw, body.yaw);
    // Player lies toward -Z from the antagonist
    let expected = 0.0f32.atan2(-1.0) + std::f32::consts::FRAC_PI_2;
    assert_relative_eq!(body.yaw, expected, epsilon = 0.05);
}

#[test]
fn test_page_pickup_through_session() {
    let near = Vec3::new(0.0, 1.2, -2.0);
    let far = Vec3::new(30.0, 1.2, 30.0);
    let (mut session, backend) = session(quiet_config(), level(vec![near, far]));
    assert_eq!(session.pages().total(), 2);
    assert_eq!(session.scene().iter_with(ComponentKind::Page).count(), 2);
    settle(&mut session);

    aim_at(&mut session, near);
    let outcome = session.update(DT, &interact());

    assert_eq!(outcome, Outcome::Playing);
    assert_eq!(session.pages().collected(), 1);
    assert_eq!(session.player_state().pages_collected, 1);
    assert_eq!(session.scene().iter_with(ComponentKind::Page).count(), 1);
    assert_relative_eq!(session.antagonist().state().teleport_cooldown, 900.0, epsilon = 1e-3);
    assert_eq!(session.stinger().current_clip(), Some("grab_page.wav"));
    assert!(backend.loads().iter().any(|clip| clip == "grab_page.wav"));

    // Same page cannot be collected twice
    session.update(DT, &interact());
    assert_eq!(session.pages().collected(), 1);
}

#[test]
fn test_collecting_every_page_wins() {
    let page = Vec3::new(0.0, 1.2, -2.0);
    let (mut session, _) = session(quiet_config(), level(vec![page]));
    settle(&mut session);

    aim_at(&mut session, page);
    assert_eq!(session.update(DT, &interact()), Outcome::Won);
    assert_eq!(session.outcome(), Outcome::Won);
}

#[test]
fn test_no_pages_never_wins() {
    let (mut session, _) = session(quiet_config(), level(Vec::new()));
    settle(&mut session);
    assert_eq!(session.pages().total(), 0);
    assert_eq!(session.outcome(), Outcome::Playing);
}

#[test]
fn test_death_is_terminal() {
    let (mut session, _) = session(quiet_config(), level(Vec::new()));
    session.update(DT, &PlayerInput::default());

    session.player_state_mut().health = 0.0;
    assert_eq!(session.update(DT, &PlayerInput::default()), Outcome::Died);

    // Nothing runs after the session ends
    let position = session.rig().position();
    session.player_state_mut().health = 50.0;
    for _ in 0..30 {
        assert_eq!(session.update(DT, &PlayerInput::walk_forward()), Outcome::Died);
    }
    assert_eq!(session.rig().position(), position);
    assert_eq!(session.player_state().health, 50.0);
}

#[test]
fn test_static_follows_health() {
    let (mut session, _) = session(quiet_config(), level(Vec::new()));
    session.update(DT, &PlayerInput::default());
    assert!(session.static_channel().is_silent());

    session.player_state_mut().health = 50.0;
    session.update(DT, &PlayerInput::default());
    assert_eq!(session.static_channel().current_clip(), Some("static_medium.wav"));
    assert_relative_eq!(session.static_intensity(), 0.5, epsilon = 0.01);

    session.player_state_mut().health = 100.0;
    session.update(DT, &PlayerInput::default());
    assert!(session.static_channel().is_silent());
}

#[test]
fn test_walking_plays_grass_steps() {
    let (mut session, backend) = session(quiet_config(), level(Vec::new()));
    settle(&mut session);

    for _ in 0..120 {
        session.update(DT, &PlayerInput::walk_forward());
    }

    let loads = backend.loads();
    assert!(loads.iter().any(|clip| clip == "step1.wav"));
    assert!(loads.iter().any(|clip| clip == "step2.wav"));
    assert!(!loads.iter().any(|clip| clip.starts_with("tilestep")));
    assert!(session.rig().position().z < -1.0);
}

#[test]
fn test_drop_releases_voices() {
    let (session, backend) = session(quiet_config(), level(Vec::new()));
    assert!(!backend.live_voices().is_empty());
    drop(session);
    assert!(backend.live_voices().is_empty());
}
