//! PCM routing, ducking and navigation mixing through the engine

mod helpers;

use carlink_audio::audio::AudioFrame;
use carlink_common::events::AudioEvent;
use carlink_common::protocol::AudioCommand;
use carlink_common::LogicalChannel;
use helpers::*;

/// Fade-in length in samples for the harness (1 ms at 48 kHz stereo)
const RAMP_SAMPLES: usize = 96;

#[test]
fn test_cold_start_music_dropped() {
    let mut t = TestEngine::new();
    t.send(music(&constant(1000, 64)));

    assert!(t.sinks.created_keys().is_empty());
    assert_eq!(t.sinks.total_samples(), 0);
    assert_eq!(t.engine.stats().frames_dropped, 1);
    assert!(t.drain_events().is_empty());
}

#[test]
fn test_armed_but_not_started_music_dropped() {
    let mut t = TestEngine::new();
    t.command(AudioCommand::MediaOpen);
    t.send(music(&constant(1000, 8)));
    assert!(t.sinks.created_keys().is_empty());
}

#[test]
fn test_fade_in_completes_after_exact_sample_count() {
    let mut t = TestEngine::new();
    t.command(AudioCommand::MediaStart);

    t.send(music(&constant(1000, RAMP_SAMPLES - 1)));
    let state = t.engine.fade_state();
    assert_eq!(state.remaining_samples, 1);
    assert!(state.current_level < 1.0);

    t.send(music(&constant(1000, 1)));
    let state = t.engine.fade_state();
    assert_eq!(state.remaining_samples, 0);
    assert_eq!(state.current_level, 1.0);
    assert_eq!(state.target_level, 1.0);

    let out = t.sinks.samples(MEDIA_KEY);
    assert_eq!(out.len(), RAMP_SAMPLES);
    assert!(out.windows(2).all(|w| w[0] <= w[1]), "fade-in must not fall");
    assert!(out[0] > 0 && out[0] < 1000);
    assert_eq!(out[RAMP_SAMPLES - 1], 1000);
}

#[test]
fn test_fade_in_spans_frames_in_any_chunking() {
    for chunk in [1, 7, 32, 95] {
        let mut t = TestEngine::new();
        t.command(AudioCommand::MediaStart);

        let mut processed = 0;
        while processed < RAMP_SAMPLES {
            let n = chunk.min(RAMP_SAMPLES - processed);
            t.send(music(&constant(1000, n)));
            processed += n;
            let state = t.engine.fade_state();
            assert!(state.current_level <= state.target_level);
            if processed < RAMP_SAMPLES {
                assert!(state.current_level < 1.0, "chunk {} finished early", chunk);
            }
        }

        assert_eq!(t.engine.fade_state().current_level, 1.0);
        assert_eq!(t.engine.fade_state().remaining_samples, 0);
    }
}

#[test]
fn test_voice_session_silences_music_then_ramps_back() {
    let mut t = TestEngine::new();
    t.start_media_steady();

    t.command(AudioCommand::VoiceAssistantStart);
    t.send(music(&constant(1000, 16)));
    assert!(t.engine.flags().media_active);
    assert_eq!(t.sinks.samples(MEDIA_KEY), vec![0; 16]);
    t.sinks.clear_samples();

    t.command(AudioCommand::VoiceAssistantStop);
    t.send(music(&constant(1000, 8)));
    let out = t.sinks.samples(MEDIA_KEY);
    assert_eq!(out.len(), 8);
    assert!(out[0] < 100, "ramp must restart from silence, got {}", out[0]);
    assert!(out.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(t.engine.fade_state().remaining_samples, (RAMP_SAMPLES - 8) as u64);
}

#[test]
fn test_ramp_frozen_while_muted() {
    let mut t = TestEngine::new();
    t.command(AudioCommand::MediaStart);
    t.send(music(&constant(1000, 10)));
    let mid_ramp = t.engine.fade_state();

    t.command(AudioCommand::CallStart);
    t.send(music(&constant(1000, 10)));
    // CallStart drops the ramp to silence; muted frames do not advance it
    assert_eq!(t.engine.fade_state().remaining_samples, 0);
    assert_eq!(t.engine.fade_state().current_level, 0.0);
    assert!(mid_ramp.remaining_samples > 0);
}

#[test]
fn test_navigation_passthrough_over_silent_music() {
    let mut t = TestEngine::new();
    t.start_media_steady();
    t.command(AudioCommand::NavigationStart);

    t.send(navigation(&[100, 100, -100, -100]));
    assert_eq!(t.engine.queued_navigation_samples(), 4);
    assert!(t.sinks.samples(MEDIA_KEY).is_empty());

    t.send(music(&[0, 0, 0, 0]));
    assert_eq!(t.sinks.samples(MEDIA_KEY), vec![100, 100, -100, -100]);
    assert_eq!(t.engine.queued_navigation_samples(), 0);
}

#[test]
fn test_navigation_round_trip_under_any_chunking() {
    let nav: Vec<i16> = (1..=250).map(|i| i as i16 * 3).collect();

    for (push, pull) in [(1, 1), (7, 64), (50, 3), (250, 250), (13, 17)] {
        let mut t = TestEngine::new();
        t.start_media_steady();
        t.command(AudioCommand::NavigationStart);

        for chunk in nav.chunks(push) {
            t.send(navigation(chunk));
        }
        let mut pulled = 0;
        while pulled < nav.len() + pull {
            t.send(music(&constant(0, pull)));
            pulled += pull;
        }

        let out = t.sinks.samples(MEDIA_KEY);
        assert_eq!(&out[..nav.len()], &nav[..], "push {} pull {}", push, pull);
        assert!(out[nav.len()..].iter().all(|s| *s == 0));
    }
}

#[test]
fn test_navigation_mixed_on_top_of_music() {
    let mut t = TestEngine::new();
    t.start_media_steady();
    t.command(AudioCommand::NavigationStart);
    t.send(navigation(&[200, 200]));
    t.send(music(&[1000, 1000, 1000, 1000]));

    assert_eq!(t.sinks.samples(MEDIA_KEY), vec![1200, 1200, 1000, 1000]);
}

#[test]
fn test_navigation_start_discards_stale_queue() {
    let mut t = TestEngine::new();
    t.start_media_steady();
    t.command(AudioCommand::NavigationStart);
    t.send(navigation(&[5, 5, 5]));

    t.command(AudioCommand::NavigationStart);
    assert_eq!(t.engine.queued_navigation_samples(), 0);
}

#[test]
fn test_navigation_without_music_goes_to_own_sink() {
    let mut t = TestEngine::new();
    t.command(AudioCommand::NavigationStart);
    t.send(navigation(&[10, -10]));

    assert_eq!(t.sinks.samples(MEDIA_KEY), vec![10, -10]);
    assert_eq!(t.engine.queued_navigation_samples(), 0);
    assert_eq!(t.engine.last_sink(LogicalChannel::Navigation), Some(MEDIA_KEY));
}

#[test]
fn test_voice_payload_without_session_dropped() {
    let mut t = TestEngine::new();
    t.start_media_steady();

    t.send(generic_voice(&[1, 2, 3]));
    t.send(voice_assistant(&[1, 2, 3]));
    t.send(call(&[1, 2, 3]));

    assert!(!t.engine.has_sink(VOICE_KEY));
    assert!(!t.engine.has_sink(NARROW_VOICE_KEY));
    assert_eq!(t.engine.stats().frames_dropped, 3);
}

#[test]
fn test_voice_frames_play_during_their_session() {
    let mut t = TestEngine::new();

    t.command(AudioCommand::VoiceAssistantStart);
    t.send(voice_assistant(&[7, 8]));
    t.send(generic_voice(&[9]));
    assert_eq!(t.sinks.samples(VOICE_KEY), vec![7, 8, 9]);
    assert_eq!(
        t.engine.last_sink(LogicalChannel::VoiceAssistant),
        Some(VOICE_KEY)
    );

    t.command(AudioCommand::VoiceAssistantStop);
    assert!(!t.engine.has_sink(VOICE_KEY));

    t.command(AudioCommand::CallStart);
    t.send(call(&[4, 4]));
    assert_eq!(t.sinks.samples(NARROW_VOICE_KEY), vec![4, 4]);
}

#[test]
fn test_generic_other_payload_follows_call() {
    let mut t = TestEngine::new();
    t.command(AudioCommand::CallStart);
    t.send(AudioFrame::pcm(1, OTHER_DECODE, vec![3, 3]));

    assert_eq!(
        t.engine.last_sink(LogicalChannel::Call).map(|k| k.sample_rate),
        Some(24_000)
    );
}

#[test]
fn test_unknown_decode_type_dropped_without_sink() {
    let mut t = TestEngine::new();
    t.start_media_steady();
    let sinks_before = t.engine.active_sink_count();

    t.send(AudioFrame::pcm(1, 42, vec![1, 2, 3, 4]));
    assert_eq!(t.engine.active_sink_count(), sinks_before);
    assert_eq!(t.engine.stats().frames_dropped, 1);
}

#[test]
fn test_empty_frame_ignored() {
    let mut t = TestEngine::new();
    t.start_media_steady();
    let written = t.engine.stats().samples_written;

    t.send(music(&[]));
    assert_eq!(t.engine.stats().samples_written, written);
    assert_eq!(t.engine.stats().frames_dropped, 0);
}

#[test]
fn test_format_announced_once_per_session() {
    let mut t = TestEngine::new();
    t.send(music(&[1, 2]));
    assert!(t.drain_events().is_empty(), "dropped frames announce nothing");

    t.start_media_steady();
    t.send(music(&[1, 2]));
    t.send(navigation(&[1, 2]));

    let formats: Vec<_> = t
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, AudioEvent::AudioFormatKnown { .. }))
        .collect();
    assert_eq!(formats.len(), 1);
    match &formats[0] {
        AudioEvent::AudioFormatKnown {
            codec,
            sample_rate,
            channels,
            bit_depth,
            ..
        } => {
            assert_eq!(codec, "PCM");
            assert_eq!((*sample_rate, *channels, *bit_depth), (48_000, 2, 16));
        }
        other => panic!("unexpected event {:?}", other),
    }

    t.engine.reset();
    t.start_media_steady();
    let again = t
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, AudioEvent::AudioFormatKnown { .. }))
        .count();
    assert_eq!(again, 1);
}

#[test]
fn test_channel_volume_scales_output() {
    let mut t = TestEngine::new();
    t.engine.set_volume(LogicalChannel::Call, 0.5);
    t.command(AudioCommand::CallStart);
    t.send(call(&[10_000, -10_000]));

    // 0.5 -> -30 dB -> 0.0316
    assert_eq!(t.sinks.samples(NARROW_VOICE_KEY), vec![316, -316]);
}

#[test]
fn test_zero_volume_is_silence() {
    let mut t = TestEngine::new();
    t.start_media_steady();
    t.engine.set_volume(LogicalChannel::Music, 0.0);
    t.send(music(&[i16::MAX, i16::MIN]));
    assert_eq!(t.sinks.samples(MEDIA_KEY), vec![0, 0]);
}

#[test]
fn test_set_volume_events_and_threshold() {
    let mut t = TestEngine::new();
    t.engine.set_volume(LogicalChannel::Navigation, 0.25);
    t.engine.set_volume(LogicalChannel::Navigation, 0.2504);
    t.engine.set_volume(LogicalChannel::Navigation, 7.0);

    let volumes: Vec<_> = t
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            AudioEvent::VolumeChanged {
                channel, volume, ..
            } => Some((channel, volume)),
            _ => None,
        })
        .collect();

    assert_eq!(
        volumes,
        vec![
            (LogicalChannel::Navigation, 0.25),
            (LogicalChannel::Navigation, 1.0),
        ]
    );
    assert_eq!(t.engine.volume(LogicalChannel::Navigation), 1.0);
}

#[test]
fn test_gain_hint_ducks_music() {
    let mut t = TestEngine::new();
    t.start_media_steady();

    t.send(music_with_hint(&[1000, 1000, 1000, 1000], 0.5, 0.0));
    assert_eq!(t.sinks.samples(MEDIA_KEY), vec![500, 500, 500, 500]);
    assert_eq!(t.engine.duck_state().current_level, 0.5);

    t.command(AudioCommand::MediaStop);
    assert_eq!(t.engine.duck_state().current_level, 1.0);
}

#[test]
fn test_gain_hint_ramps_back_up() {
    let mut t = TestEngine::new();
    t.start_media_steady();
    t.send(music_with_hint(&[1000; 4], 0.0, 0.0));
    t.sinks.clear_samples();

    // 1 ms at 48 kHz stereo = 96 samples back to full level
    t.send(music_with_hint(&constant(1000, 96), 1.0, 1.0));
    let out = t.sinks.samples(MEDIA_KEY);
    assert!(out[0] < 50);
    assert!(out.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(out[95], 1000);
}

#[test]
fn test_sink_failure_does_not_stop_engine() {
    let mut t = TestEngine::new();
    t.sinks.fail_create(VOICE_KEY);
    t.command(AudioCommand::VoiceAssistantStart);

    t.send(voice_assistant(&[1, 1]));
    assert!(!t.engine.has_sink(VOICE_KEY));

    t.send(voice_assistant(&[2, 2]));
    assert_eq!(t.sinks.samples(VOICE_KEY), vec![2, 2]);
}

#[test]
fn test_music_and_call_sinks_coexist() {
    let mut t = TestEngine::new();
    t.start_media_steady();
    t.command(AudioCommand::CallStart);
    t.send(call(&[1]));
    t.send(music(&[1000]));

    assert_eq!(t.engine.active_sink_count(), 2);
    assert_eq!(t.sinks.samples(MEDIA_KEY), vec![0]);

    t.command(AudioCommand::CallStop);
    assert!(!t.engine.has_sink(NARROW_VOICE_KEY));
    assert!(t.engine.has_sink(MEDIA_KEY));
}
