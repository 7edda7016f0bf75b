//! Audio directors
//!
//! Each director owns one channel and maps a game value to what that
//! channel should play. Directors only request a clip when their choice
//! changes, so an unchanged state never restarts a sound.

use crate::config::FootstepConfig;
use glam::Vec3;
use pines_ai::PlayerState;
use pines_audio::{AudioChannel, CrossfadeOutcome};
use pines_physics::{CollisionGroups, PhysicsWorld, RaycastOptions};
use std::collections::HashMap;

pub const AMBIENT_CROSSFADE: f32 = 2.0;
pub const AMBIENT_VOLUME: f32 = 0.15;
pub const STATIC_CROSSFADE: f32 = 1.0;

/// Ambience clip for an aggression value
pub fn ambient_clip(current: i32, min: i32, max: i32) -> &'static str {
    let value = current as f32;
    let max = max as f32;
    if value >= max * 0.75 {
        "tension_4.wav"
    } else if value >= max * 0.5 {
        "tension_3.wav"
    } else if value >= max * 0.25 {
        "tension_2.wav"
    } else if current > min + 1 {
        "tension_1.wav"
    } else {
        "wind.wav"
    }
}

/// A static layer and its volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticLevel {
    pub clip: &'static str,
    pub volume: f32,
}

/// Static layer for a health fraction; `None` at full health
pub fn static_level(health_fraction: f32) -> Option<StaticLevel> {
    if health_fraction >= 1.0 {
        None
    } else if health_fraction >= 0.75 {
        Some(StaticLevel {
            clip: "static_light.wav",
            volume: 0.2,
        })
    } else if health_fraction >= 0.10 {
        Some(StaticLevel {
            clip: "static_medium.wav",
            volume: 0.5,
        })
    } else {
        Some(StaticLevel {
            clip: "static_heavy.wav",
            volume: 0.5,
        })
    }
}

/// Start `clip` on `channel`: straight away when nothing plays, otherwise by
/// crossfade. Returns whether the request was taken; a busy channel is
/// retried on a later frame.
fn request(channel: &mut AudioChannel, clip: &str, volume: f32, fade: f32) -> bool {
    if channel.is_silent() {
        if channel.initialize_music(clip, true).is_ok() {
            channel.set_volume(volume);
            channel.play_music();
        }
        return true;
    }

    match channel.crossfade_to(clip, true, fade) {
        Ok(CrossfadeOutcome::Busy) => false,
        Ok(_) => {
            channel.set_volume(volume);
            true
        }
        // Already logged by the channel; do not retry every frame
        Err(_) => true,
    }
}

/// Tension bed driven by aggression
pub struct AmbientDirector {
    channel: AudioChannel,
    requested: Option<&'static str>,
}

impl AmbientDirector {
    pub fn new(channel: AudioChannel) -> Self {
        Self {
            channel,
            requested: None,
        }
    }

    pub fn channel(&self) -> &AudioChannel {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut AudioChannel {
        &mut self.channel
    }

    pub fn update(&mut self, delta_time: f32, current: i32, min: i32, max: i32) {
        self.channel.update_crossfade(delta_time);

        let clip = ambient_clip(current, min, max);
        if self.requested == Some(clip) {
            return;
        }
        if request(&mut self.channel, clip, AMBIENT_VOLUME, AMBIENT_CROSSFADE) {
            log::debug!("Ambience -> {} (aggression {})", clip, current);
            self.requested = Some(clip);
        }
    }
}

/// Static distortion driven by player health
pub struct StaticDirector {
    channel: AudioChannel,
    requested: Option<&'static str>,
}

impl StaticDirector {
    pub fn new(channel: AudioChannel) -> Self {
        Self {
            channel,
            requested: None,
        }
    }

    pub fn channel(&self) -> &AudioChannel {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut AudioChannel {
        &mut self.channel
    }

    pub fn update(&mut self, delta_time: f32, health_fraction: f32) {
        self.channel.update_crossfade(delta_time);

        match static_level(health_fraction) {
            None => {
                if self.requested.take().is_some() || !self.channel.is_silent() {
                    self.channel.stop_music();
                    log::debug!("Static silenced");
                }
            }
            Some(level) => {
                if self.requested == Some(level.clip) {
                    return;
                }
                if request(&mut self.channel, level.clip, level.volume, STATIC_CROSSFADE) {
                    log::debug!("Static -> {} (health {:.2})", level.clip, health_fraction);
                    self.requested = Some(level.clip);
                }
            }
        }
    }
}

/// Ground material under the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Surface {
    #[default]
    Grass,
    Tile,
}

impl Surface {
    /// Alternating step clips
    pub fn clips(&self) -> [&'static str; 2] {
        match self {
            Surface::Grass => ["step1.wav", "step2.wav"],
            Surface::Tile => ["tilestep1.wav", "tilestep2.wav"],
        }
    }
}

/// Surface of each registered static body, keyed by raycast tag
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    by_tag: HashMap<u128, Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: u128, surface: Surface) {
        self.by_tag.insert(tag, surface);
    }

    /// Register a submesh by name; names containing "tile" are tile
    pub fn register_mesh(&mut self, tag: u128, mesh_name: &str) {
        if mesh_name.to_ascii_lowercase().contains("tile") {
            self.register(tag, Surface::Tile);
        }
    }

    pub fn surface(&self, tag: u128) -> Surface {
        self.by_tag.get(&tag).copied().unwrap_or_default()
    }

    /// Probe straight down from `position`; no hit counts as grass
    pub fn classify(&self, physics: &PhysicsWorld, position: Vec3, probe: f32) -> Surface {
        let options = RaycastOptions::default()
            .with_max_distance(probe)
            .with_filter(CollisionGroups::level_only());

        physics
            .raycast_with(position, Vec3::NEG_Y, &options)
            .map_or(Surface::Grass, |hit| self.surface(hit.user_data))
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

/// Walking sounds on a fixed cadence
pub struct FootstepDirector {
    channel: AudioChannel,
    config: FootstepConfig,
    timer: f32,
    next_step: HashMap<Surface, usize>,
}

impl FootstepDirector {
    pub fn new(channel: AudioChannel, config: FootstepConfig) -> Self {
        Self {
            channel,
            config,
            timer: 0.0,
            next_step: HashMap::new(),
        }
    }

    pub fn channel(&self) -> &AudioChannel {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut AudioChannel {
        &mut self.channel
    }

    pub fn config(&self) -> &FootstepConfig {
        &self.config
    }

    /// Advance the cadence; returns the clip of a step taken this frame
    pub fn update(&mut self, delta_time: f32, player: &PlayerState, surface: Surface) -> Option<&'static str> {
        if !player.is_moving {
            self.timer = 0.0;
            return None;
        }

        self.timer += delta_time.max(0.0);
        let interval = if player.is_sprinting {
            self.config.sprint_interval
        } else {
            self.config.walk_interval
        };
        if self.timer < interval {
            return None;
        }
        self.timer = 0.0;

        let index = self.next_step.entry(surface).or_insert(0);
        let clip = surface.clips()[*index];
        *index = 1 - *index;

        // A failed load is logged by the channel; the cadence carries on
        let _ = self.channel.play_one_shot(clip, self.config.volume);
        Some(clip)
    }
}
