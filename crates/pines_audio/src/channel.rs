//! Dual-slot audio channel with linear crossfades
//!
//! A channel owns two voice slots. One slot is active; during a crossfade
//! the active slot fades out while the other fades in, and the roles swap
//! when the fade completes. Only one crossfade runs at a time.

use crate::backend::{AudioBackend, Voice};
use crate::error::Result;
use crate::settings::ChannelPurpose;
use std::rc::Rc;

/// Remainders below this count as a finished fade (summed frame times drift)
const FADE_EPSILON: f32 = 1e-4;

/// One of the two voice slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    A,
    B,
}

impl SlotId {
    /// The other slot
    pub fn other(self) -> SlotId {
        match self {
            SlotId::A => SlotId::B,
            SlotId::B => SlotId::A,
        }
    }

    fn index(self) -> usize {
        match self {
            SlotId::A => 0,
            SlotId::B => 1,
        }
    }
}

/// What a crossfade request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossfadeOutcome {
    /// A fade to the new clip began
    Started,
    /// The clip is already current; nothing changed
    AlreadyCurrent,
    /// Another fade is running; nothing changed
    Busy,
}

#[derive(Default)]
struct Slot {
    voice: Option<Box<dyn Voice>>,
}

impl Slot {
    fn is_initialized(&self) -> bool {
        self.voice.is_some()
    }

    fn release(&mut self) {
        if let Some(mut voice) = self.voice.take() {
            voice.stop();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Crossfade {
    remaining: f32,
    total: f32,
}

impl Crossfade {
    /// Share of the fade still to go, 1 at the start and 0 at the end
    fn outgoing_weight(&self) -> f32 {
        if self.total <= 0.0 {
            0.0
        } else {
            (self.remaining / self.total).clamp(0.0, 1.0)
        }
    }
}

/// One logical sound channel
pub struct AudioChannel {
    purpose: ChannelPurpose,
    backend: Rc<dyn AudioBackend>,
    slots: [Slot; 2],
    active: SlotId,
    current_clip: Option<String>,
    looping: bool,
    /// Base target volume
    volume: f32,
    /// Output gain from the mixer settings
    gain: f32,
    fade: Option<Crossfade>,
}

impl AudioChannel {
    /// Create an empty channel
    pub fn new(purpose: ChannelPurpose, backend: Rc<dyn AudioBackend>, gain: f32) -> Self {
        Self {
            purpose,
            backend,
            slots: [Slot::default(), Slot::default()],
            active: SlotId::A,
            current_clip: None,
            looping: false,
            volume: 1.0,
            gain: gain.clamp(0.0, 1.0),
            fade: None,
        }
    }

    /// What this channel is used for
    pub fn purpose(&self) -> ChannelPurpose {
        self.purpose
    }

    /// Clip most recently requested (the incoming clip during a fade)
    pub fn current_clip(&self) -> Option<&str> {
        self.current_clip.as_deref()
    }

    /// Whether the current clip loops
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Slot currently holding the primary voice
    pub fn active_slot(&self) -> SlotId {
        self.active
    }

    /// Whether a crossfade is running
    pub fn is_crossfading(&self) -> bool {
        self.fade.is_some()
    }

    /// Base target volume
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Number of slots holding a voice
    pub fn initialized_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_initialized()).count()
    }

    /// Whether nothing is loaded in either slot
    pub fn is_silent(&self) -> bool {
        self.initialized_slots() == 0
    }

    /// Whether a non-looping clip in the active slot has finished
    pub fn is_finished(&self) -> bool {
        self.slot(self.active).voice.as_ref().map_or(true, |v| v.is_finished())
    }

    /// Interpolated volume of a slot, before output gain
    pub fn slot_volume(&self, slot: SlotId) -> f32 {
        if !self.slot(slot).is_initialized() {
            return 0.0;
        }
        match self.fade {
            Some(fade) if slot == self.active => self.volume * fade.outgoing_weight(),
            Some(fade) => self.volume * (1.0 - fade.outgoing_weight()),
            None if slot == self.active => self.volume,
            None => 0.0,
        }
    }

    /// Load `clip` into the active slot without starting it.
    ///
    /// A running fade is abandoned and its incoming voice released. On
    /// failure the channel is left as it was.
    pub fn initialize_music(&mut self, clip: &str, looping: bool) -> Result<()> {
        let voice = self.backend.load(clip, looping).map_err(|e| {
            log::warn!("[{}] {}", self.purpose, e);
            e
        })?;

        if self.fade.take().is_some() {
            let incoming = self.active.other();
            self.slot_mut(incoming).release();
        }

        let active = self.active;
        let slot = self.slot_mut(active);
        slot.release();
        slot.voice = Some(voice);

        self.current_clip = Some(clip.to_string());
        self.looping = looping;
        log::debug!("[{}] initialized '{}' (loop: {})", self.purpose, clip, looping);
        Ok(())
    }

    /// Start the active slot at the channel volume
    pub fn play_music(&mut self) {
        let volume = self.slot_volume(self.active) * self.gain;
        let active = self.active;
        match self.slot_mut(active).voice.as_mut() {
            Some(voice) => {
                voice.set_volume(volume);
                voice.play();
            }
            None => log::debug!("[{}] play requested with nothing loaded", self.purpose),
        }
    }

    /// Fade from the current clip to `clip` over `duration` seconds
    pub fn crossfade_to(&mut self, clip: &str, looping: bool, duration: f32) -> Result<CrossfadeOutcome> {
        if self.current_clip.as_deref() == Some(clip) {
            return Ok(CrossfadeOutcome::AlreadyCurrent);
        }
        if self.fade.is_some() {
            log::debug!("[{}] crossfade to '{}' ignored, fade in progress", self.purpose, clip);
            return Ok(CrossfadeOutcome::Busy);
        }

        let mut voice = self.backend.load(clip, looping).map_err(|e| {
            log::warn!("[{}] {}", self.purpose, e);
            e
        })?;
        voice.set_volume(0.0);
        voice.play();

        let incoming = self.active.other();
        let slot = self.slot_mut(incoming);
        slot.release();
        slot.voice = Some(voice);

        self.current_clip = Some(clip.to_string());
        self.looping = looping;
        self.fade = Some(Crossfade {
            remaining: duration.max(0.0),
            total: duration.max(0.0),
        });
        log::debug!("[{}] crossfading to '{}' over {:.2}s", self.purpose, clip, duration);

        if duration <= 0.0 {
            self.finish_crossfade();
        } else {
            self.apply_volumes();
        }
        Ok(CrossfadeOutcome::Started)
    }

    /// Advance a running fade. Must be called every frame.
    pub fn update_crossfade(&mut self, delta_time: f32) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };

        fade.remaining -= delta_time.max(0.0);
        if fade.remaining <= FADE_EPSILON {
            self.finish_crossfade();
        } else {
            self.apply_volumes();
        }
    }

    /// Set the base volume. During a fade this scales both ramps.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volumes();
    }

    /// Set the output gain
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
        self.apply_volumes();
    }

    /// Stop and release both slots; back to no clip with slot A active
    pub fn stop_music(&mut self) {
        for slot in &mut self.slots {
            slot.release();
        }
        self.active = SlotId::A;
        self.current_clip = None;
        self.looping = false;
        self.fade = None;
    }

    /// Same as [`stop_music`](Self::stop_music)
    pub fn uninitialize_music(&mut self) {
        self.stop_music();
    }

    /// Replace whatever plays with a single non-looping clip, no fade
    pub fn play_one_shot(&mut self, clip: &str, volume: f32) -> Result<()> {
        let voice = self.backend.load(clip, false).map_err(|e| {
            log::warn!("[{}] {}", self.purpose, e);
            e
        })?;

        self.stop_music();
        self.slots[SlotId::A.index()].voice = Some(voice);
        self.current_clip = Some(clip.to_string());
        self.volume = volume.clamp(0.0, 1.0);
        self.play_music();
        Ok(())
    }

    fn finish_crossfade(&mut self) {
        self.fade = None;
        let outgoing = self.active;
        self.slot_mut(outgoing).release();
        self.active = outgoing.other();
        self.apply_volumes();
    }

    fn apply_volumes(&mut self) {
        for id in [SlotId::A, SlotId::B] {
            let volume = self.slot_volume(id) * self.gain;
            if let Some(voice) = self.slot_mut(id).voice.as_mut() {
                voice.set_volume(volume);
            }
        }
    }

    fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.index()]
    }

    fn slot_mut(&mut self, id: SlotId) -> &mut Slot {
        &mut self.slots[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;
    use approx::assert_relative_eq;

    fn channel() -> (HeadlessBackend, AudioChannel) {
        let backend = HeadlessBackend::new();
        let channel = AudioChannel::new(ChannelPurpose::Ambience, Rc::new(backend.clone()), 1.0);
        (backend, channel)
    }

    #[test]
    fn test_initialize_does_not_play() {
        let (backend, mut channel) = channel();
        channel.initialize_music("wind.wav", true).unwrap();

        assert_eq!(channel.current_clip(), Some("wind.wav"));
        assert_eq!(channel.initialized_slots(), 1);
        assert!(backend.playing_voices().is_empty());

        channel.play_music();
        assert_eq!(backend.playing_voices().len(), 1);
    }

    #[test]
    fn test_initialize_replaces_active_slot() {
        let (backend, mut channel) = channel();
        channel.initialize_music("a.wav", true).unwrap();
        channel.initialize_music("b.wav", true).unwrap();

        let live = backend.live_voices();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].clip, "b.wav");
        assert_eq!(channel.active_slot(), SlotId::A);
    }

    #[test]
    fn test_fade_midpoint_volumes() {
        let (_backend, mut channel) = channel();
        channel.initialize_music("a.wav", true).unwrap();
        channel.set_volume(0.8);
        channel.play_music();

        channel.crossfade_to("b.wav", true, 2.0).unwrap();
        channel.update_crossfade(1.0);

        assert_relative_eq!(channel.slot_volume(SlotId::A), 0.4);
        assert_relative_eq!(channel.slot_volume(SlotId::B), 0.4);
    }

    #[test]
    fn test_set_volume_scales_running_fade() {
        let (_backend, mut channel) = channel();
        channel.initialize_music("a.wav", true).unwrap();
        channel.play_music();
        channel.crossfade_to("b.wav", true, 4.0).unwrap();
        channel.update_crossfade(1.0);

        channel.set_volume(0.5);
        assert_relative_eq!(channel.slot_volume(SlotId::A), 0.375);
        assert_relative_eq!(channel.slot_volume(SlotId::B), 0.125);
    }

    #[test]
    fn test_zero_duration_swaps_immediately() {
        let (backend, mut channel) = channel();
        channel.initialize_music("a.wav", true).unwrap();
        channel.play_music();

        assert_eq!(channel.crossfade_to("b.wav", true, 0.0).unwrap(), CrossfadeOutcome::Started);
        assert!(!channel.is_crossfading());
        assert_eq!(channel.active_slot(), SlotId::B);
        assert_eq!(backend.live_voices().len(), 1);
    }

    #[test]
    fn test_gain_applies_to_voice_not_logical_volume() {
        let backend = HeadlessBackend::new();
        let mut channel = AudioChannel::new(ChannelPurpose::Static, Rc::new(backend.clone()), 0.5);
        channel.initialize_music("static_light.wav", true).unwrap();
        channel.set_volume(0.2);
        channel.play_music();

        assert_relative_eq!(channel.slot_volume(SlotId::A), 0.2);
        assert_relative_eq!(backend.playing_voices()[0].volume, 0.1);
    }

    #[test]
    fn test_one_shot_replaces_and_does_not_loop() {
        let (backend, mut channel) = channel();
        channel.play_one_shot("step1.wav", 0.1).unwrap();
        channel.play_one_shot("step2.wav", 0.1).unwrap();

        let live = backend.live_voices();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].clip, "step2.wav");
        assert!(!live[0].looping);
        assert!(live[0].playing);
    }

    #[test]
    fn test_initialize_during_fade_abandons_it() {
        let (backend, mut channel) = channel();
        channel.initialize_music("a.wav", true).unwrap();
        channel.play_music();
        channel.crossfade_to("b.wav", true, 2.0).unwrap();

        channel.initialize_music("c.wav", true).unwrap();
        assert!(!channel.is_crossfading());
        assert_eq!(channel.initialized_slots(), 1);
        assert_eq!(backend.live_voices()[0].clip, "c.wav");
    }
}
