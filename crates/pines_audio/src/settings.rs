//! Audio settings

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a channel is used for. Each purpose owns exactly one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPurpose {
    /// Looping background bed (wind, tension layers)
    Ambience,
    /// Looping distortion tied to player health
    Static,
    /// One-shot walking sounds
    Footsteps,
    /// One-shot event sounds (page pickups)
    Stinger,
}

impl ChannelPurpose {
    /// All purposes, in creation order
    pub const ALL: [ChannelPurpose; 4] = [
        ChannelPurpose::Ambience,
        ChannelPurpose::Static,
        ChannelPurpose::Footsteps,
        ChannelPurpose::Stinger,
    ];

    /// Stable lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            ChannelPurpose::Ambience => "ambience",
            ChannelPurpose::Static => "static",
            ChannelPurpose::Footsteps => "footsteps",
            ChannelPurpose::Stinger => "stinger",
        }
    }
}

impl fmt::Display for ChannelPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mixer settings for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Directory clip names are resolved against
    pub sound_root: String,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Ambience channel gain
    pub ambience_volume: f32,
    /// Static channel gain
    pub static_volume: f32,
    /// Footstep channel gain
    pub footsteps_volume: f32,
    /// Stinger channel gain
    pub stinger_volume: f32,
    /// Never open an output device
    pub headless: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sound_root: "assets/sounds".to_string(),
            master_volume: 1.0,
            ambience_volume: 1.0,
            static_volume: 1.0,
            footsteps_volume: 1.0,
            stinger_volume: 1.0,
            headless: false,
        }
    }
}

impl AudioSettings {
    /// Settings that never touch an output device
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Default::default()
        }
    }

    /// Set master volume
    pub fn with_master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Set the clip directory
    pub fn with_sound_root(mut self, root: impl Into<String>) -> Self {
        self.sound_root = root.into();
        self
    }

    /// Output gain for a channel: master times the purpose's own volume
    pub fn gain_for(&self, purpose: ChannelPurpose) -> f32 {
        let purpose_volume = match purpose {
            ChannelPurpose::Ambience => self.ambience_volume,
            ChannelPurpose::Static => self.static_volume,
            ChannelPurpose::Footsteps => self.footsteps_volume,
            ChannelPurpose::Stinger => self.stinger_volume,
        };
        (self.master_volume * purpose_volume).clamp(0.0, 1.0)
    }
}
