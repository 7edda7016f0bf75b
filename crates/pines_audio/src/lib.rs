//! Pines Audio - crossfading audio channels
//!
//! This crate provides the logical sound channels the game drives every
//! frame: ambience, static, footsteps and stingers.
//!
//! # Features
//!
//! - Dual-slot channels with linear crossfades between clips
//! - Idempotent clip requests (the current clip is never restarted)
//! - One-shot stop-and-replace playback
//! - Pluggable output: rodio on a real device, headless for tests and servers
//!
//! # Example
//!
//! ```ignore
//! use pines_audio::prelude::*;
//!
//! let settings = AudioSettings::default();
//! let backend = open_default_backend(&settings);
//! let mut ambience = AudioChannel::new(ChannelPurpose::Ambience, backend, settings.gain_for(ChannelPurpose::Ambience));
//!
//! ambience.initialize_music("wind.wav", true)?;
//! ambience.set_volume(0.15);
//! ambience.play_music();
//!
//! // Later, every frame
//! ambience.crossfade_to("tension_1.wav", true, 2.0)?;
//! ambience.update_crossfade(delta_time);
//! ```

pub mod backend;
pub mod channel;
pub mod error;
pub mod settings;

pub mod prelude {
    pub use crate::backend::{open_default_backend, AudioBackend, HeadlessBackend, RodioBackend, Voice};
    pub use crate::channel::{AudioChannel, CrossfadeOutcome, SlotId};
    pub use crate::error::{AudioError, Result};
    pub use crate::settings::{AudioSettings, ChannelPurpose};
}

pub use prelude::*;
