//! Crossfade behaviour of a channel over simulated frames

use approx::assert_abs_diff_eq;
use pines_audio::prelude::*;
use std::rc::Rc;

const DT: f32 = 1.0 / 60.0;

fn playing(clip: &str, volume: f32) -> (HeadlessBackend, AudioChannel) {
    let backend = HeadlessBackend::new();
    let mut channel = AudioChannel::new(ChannelPurpose::Ambience, Rc::new(backend.clone()), 1.0);
    channel.initialize_music(clip, true).unwrap();
    channel.set_volume(volume);
    channel.play_music();
    (backend, channel)
}

#[test]
fn test_volumes_sum_to_target_throughout_fade() {
    let (_backend, mut channel) = playing("a.wav", 0.15);
    channel.crossfade_to("b.wav", true, 2.0).unwrap();

    // Start of fade: old slot full, new slot silent
    assert_abs_diff_eq!(channel.slot_volume(SlotId::A), 0.15, epsilon = 1e-6);
    assert_abs_diff_eq!(channel.slot_volume(SlotId::B), 0.0, epsilon = 1e-6);

    while channel.is_crossfading() {
        let sum = channel.slot_volume(SlotId::A) + channel.slot_volume(SlotId::B);
        assert_abs_diff_eq!(sum, 0.15, epsilon = 1e-5);
        channel.update_crossfade(DT);
    }

    // End of fade: new slot full, old slot gone
    assert_abs_diff_eq!(channel.slot_volume(SlotId::B), 0.15, epsilon = 1e-6);
    assert_abs_diff_eq!(channel.slot_volume(SlotId::A), 0.0, epsilon = 1e-6);
}

#[test]
fn test_two_second_fade_ends_on_new_clip() {
    let (backend, mut channel) = playing("a.wav", 1.0);
    channel.crossfade_to("b.wav", true, 2.0).unwrap();

    for _ in 0..120 {
        channel.update_crossfade(DT);
    }

    assert_eq!(channel.current_clip(), Some("b.wav"));
    assert_eq!(channel.initialized_slots(), 1);
    assert!(!channel.is_crossfading());

    let live = backend.live_voices();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].clip, "b.wav");
    assert!(live[0].playing);
}

#[test]
fn test_request_for_current_clip_changes_nothing() {
    let (backend, mut channel) = playing("a.wav", 1.0);
    channel.crossfade_to("b.wav", true, 2.0).unwrap();
    channel.update_crossfade(0.5);
    let before = (channel.slot_volume(SlotId::A), channel.slot_volume(SlotId::B));

    let outcome = channel.crossfade_to("b.wav", true, 2.0).unwrap();

    assert_eq!(outcome, CrossfadeOutcome::AlreadyCurrent);
    assert_eq!(channel.active_slot(), SlotId::A);
    assert_eq!((channel.slot_volume(SlotId::A), channel.slot_volume(SlotId::B)), before);
    assert_eq!(backend.loads().len(), 2);
}

#[test]
fn test_second_fade_rejected_while_busy() {
    let (backend, mut channel) = playing("a.wav", 1.0);
    channel.crossfade_to("b.wav", true, 2.0).unwrap();

    let outcome = channel.crossfade_to("c.wav", true, 2.0).unwrap();

    assert_eq!(outcome, CrossfadeOutcome::Busy);
    assert_eq!(channel.current_clip(), Some("b.wav"));
    assert_eq!(backend.live_voices().len(), 2);
    assert!(!backend.loads().contains(&"c.wav".to_string()));
}

#[test]
fn test_missing_clip_leaves_channel_untouched() {
    let (backend, mut channel) = playing("a.wav", 0.5);
    backend.mark_missing("gone.wav");

    assert!(channel.crossfade_to("gone.wav", true, 1.0).is_err());
    assert!(channel.initialize_music("gone.wav", true).is_err());

    assert_eq!(channel.current_clip(), Some("a.wav"));
    assert_eq!(channel.active_slot(), SlotId::A);
    assert!(!channel.is_crossfading());
    assert_eq!(channel.slot_volume(SlotId::A), 0.5);
    assert_eq!(backend.playing_voices().len(), 1);
}

#[test]
fn test_stop_mid_fade_releases_both_slots() {
    let (backend, mut channel) = playing("a.wav", 1.0);
    channel.crossfade_to("b.wav", true, 2.0).unwrap();
    channel.update_crossfade(0.7);

    channel.stop_music();

    assert_eq!(channel.initialized_slots(), 0);
    assert_eq!(channel.active_slot(), SlotId::A);
    assert_eq!(channel.current_clip(), None);
    assert!(!channel.is_crossfading());
    assert!(backend.live_voices().is_empty());
}

#[test]
fn test_fades_chain_across_slots() {
    let (_backend, mut channel) = playing("a.wav", 1.0);

    channel.crossfade_to("b.wav", true, 1.0).unwrap();
    channel.update_crossfade(1.0);
    assert_eq!(channel.active_slot(), SlotId::B);

    channel.crossfade_to("c.wav", true, 1.0).unwrap();
    channel.update_crossfade(1.0);
    assert_eq!(channel.active_slot(), SlotId::A);
    assert_eq!(channel.current_clip(), Some("c.wav"));
    assert_eq!(channel.initialized_slots(), 1);
}

#[test]
fn test_fade_stalls_without_updates() {
    let (_backend, mut channel) = playing("a.wav", 1.0);
    channel.crossfade_to("b.wav", true, 1.0).unwrap();
    channel.update_crossfade(0.25);
    let volume = channel.slot_volume(SlotId::B);

    // No update_crossfade calls: nothing moves
    assert_eq!(channel.slot_volume(SlotId::B), volume);
    assert!(channel.is_crossfading());
}
