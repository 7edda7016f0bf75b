//! Output backends
//!
//! A channel never talks to rodio directly. It asks an [`AudioBackend`] to
//! load a clip and gets back a paused [`Voice`] it fully owns; dropping the
//! voice releases it.

use crate::error::{AudioError, Result};
use crate::settings::AudioSettings;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::rc::Rc;

/// One loaded clip, ready to play
pub trait Voice {
    /// Start or resume playback
    fn play(&mut self);
    /// Halt playback; the voice cannot be resumed afterwards
    fn stop(&mut self);
    /// Set output volume (already scaled by channel gain)
    fn set_volume(&mut self, volume: f32);
    /// Whether a non-looping clip has played to the end
    fn is_finished(&self) -> bool;
}

/// Source of voices
pub trait AudioBackend {
    /// Load `clip` into a new paused voice
    fn load(&self, clip: &str, looping: bool) -> Result<Box<dyn Voice>>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

// ==================== Rodio ====================

/// Plays through the default output device
pub struct RodioBackend {
    /// Output stream (must be kept alive)
    _stream: OutputStream,
    /// Stream handle for creating sinks
    stream_handle: OutputStreamHandle,
    /// Base path for audio files
    sound_root: String,
}

impl RodioBackend {
    /// Open the default output device
    pub fn new(sound_root: impl Into<String>) -> Result<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sound_root: sound_root.into(),
        })
    }

    /// Get full path for an audio file
    fn resolve_path(&self, path: &str) -> String {
        if self.sound_root.is_empty() || Path::new(path).is_absolute() {
            path.to_string()
        } else {
            format!("{}/{}", self.sound_root, path)
        }
    }
}

impl AudioBackend for RodioBackend {
    fn load(&self, clip: &str, looping: bool) -> Result<Box<dyn Voice>> {
        let full_path = self.resolve_path(clip);

        let file = File::open(&full_path).map_err(|_| AudioError::ClipNotFound {
            path: full_path.clone(),
        })?;

        let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
            path: full_path.clone(),
            message: e.to_string(),
        })?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;

        sink.pause();
        if looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }

        Ok(Box::new(RodioVoice { sink }))
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}

struct RodioVoice {
    sink: Sink,
}

impl Voice for RodioVoice {
    fn play(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

// ==================== Headless ====================

/// What a headless voice is currently doing
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSnapshot {
    /// Clip the voice was loaded with
    pub clip: String,
    /// Loop flag it was loaded with
    pub looping: bool,
    /// Whether play() was called and stop() was not
    pub playing: bool,
    /// Last volume set
    pub volume: f32,
}

#[derive(Default)]
struct HeadlessState {
    missing: HashSet<String>,
    loads: Vec<String>,
    voices: Vec<Option<VoiceSnapshot>>,
}

/// Backend that records requests instead of producing sound.
///
/// Clones share state, so a test can keep one clone and inspect what the
/// channels did with the other.
#[derive(Clone, Default)]
pub struct HeadlessBackend {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessBackend {
    /// Create an empty headless backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make future loads of `clip` fail as if the file were absent
    pub fn mark_missing(&self, clip: impl Into<String>) {
        self.state.borrow_mut().missing.insert(clip.into());
    }

    /// Every clip successfully loaded so far, in order
    pub fn loads(&self) -> Vec<String> {
        self.state.borrow().loads.clone()
    }

    /// Voices that have not been dropped yet
    pub fn live_voices(&self) -> Vec<VoiceSnapshot> {
        self.state.borrow().voices.iter().flatten().cloned().collect()
    }

    /// Voices currently playing
    pub fn playing_voices(&self) -> Vec<VoiceSnapshot> {
        self.live_voices().into_iter().filter(|v| v.playing).collect()
    }
}

impl AudioBackend for HeadlessBackend {
    fn load(&self, clip: &str, looping: bool) -> Result<Box<dyn Voice>> {
        let mut state = self.state.borrow_mut();
        if state.missing.contains(clip) {
            return Err(AudioError::ClipNotFound {
                path: clip.to_string(),
            });
        }

        state.loads.push(clip.to_string());
        state.voices.push(Some(VoiceSnapshot {
            clip: clip.to_string(),
            looping,
            playing: false,
            volume: 1.0,
        }));

        Ok(Box::new(HeadlessVoice {
            state: Rc::clone(&self.state),
            index: state.voices.len() - 1,
        }))
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}

struct HeadlessVoice {
    state: Rc<RefCell<HeadlessState>>,
    index: usize,
}

impl HeadlessVoice {
    fn with_snapshot(&self, f: impl FnOnce(&mut VoiceSnapshot)) {
        if let Some(Some(snapshot)) = self.state.borrow_mut().voices.get_mut(self.index) {
            f(snapshot);
        }
    }
}

impl Voice for HeadlessVoice {
    fn play(&mut self) {
        self.with_snapshot(|v| v.playing = true);
    }

    fn stop(&mut self) {
        self.with_snapshot(|v| v.playing = false);
    }

    fn set_volume(&mut self, volume: f32) {
        self.with_snapshot(|v| v.volume = volume);
    }

    fn is_finished(&self) -> bool {
        let state = self.state.borrow();
        match state.voices.get(self.index) {
            Some(Some(v)) => !v.looping && !v.playing,
            _ => true,
        }
    }
}

impl Drop for HeadlessVoice {
    fn drop(&mut self) {
        if let Some(slot) = self.state.borrow_mut().voices.get_mut(self.index) {
            *slot = None;
        }
    }
}

/// Open the output the settings ask for, falling back to headless when no
/// device is available
pub fn open_default_backend(settings: &AudioSettings) -> Rc<dyn AudioBackend> {
    if settings.headless {
        log::info!("Audio running headless");
        return Rc::new(HeadlessBackend::new());
    }

    match RodioBackend::new(settings.sound_root.clone()) {
        Ok(backend) => {
            log::info!("Audio output opened (sound root '{}')", settings.sound_root);
            Rc::new(backend)
        }
        Err(e) => {
            log::warn!("{}; continuing without sound", e);
            Rc::new(HeadlessBackend::new())
        }
    }
}
