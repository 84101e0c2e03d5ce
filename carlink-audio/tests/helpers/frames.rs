//! Frame builders

use carlink_audio::audio::{AudioFrame, GainHint, PcmFrame, PlayerKey};
use carlink_common::protocol::{stream_type, AudioCommand};

/// 48 kHz stereo media
pub const MEDIA_DECODE: u32 = 4;
/// 16 kHz mono voice
pub const VOICE_DECODE: u32 = 5;
/// 8 kHz mono voice
pub const NARROW_VOICE_DECODE: u32 = 3;
/// 24 kHz mono, neither media nor voice
pub const OTHER_DECODE: u32 = 6;

pub const MEDIA_KEY: PlayerKey = PlayerKey {
    sample_rate: 48_000,
    channels: 2,
};
pub const VOICE_KEY: PlayerKey = PlayerKey {
    sample_rate: 16_000,
    channels: 1,
};
pub const NARROW_VOICE_KEY: PlayerKey = PlayerKey {
    sample_rate: 8_000,
    channels: 1,
};

pub fn command(command: AudioCommand) -> AudioFrame {
    AudioFrame::command(stream_type::GENERIC, command.code())
}

/// Generic-stream media frame (classified as Music)
pub fn music(samples: &[i16]) -> AudioFrame {
    AudioFrame::pcm(stream_type::GENERIC, MEDIA_DECODE, samples.to_vec())
}

/// Navigation frame in the media format
pub fn navigation(samples: &[i16]) -> AudioFrame {
    AudioFrame::pcm(stream_type::NAVIGATION, MEDIA_DECODE, samples.to_vec())
}

/// Voice-coded frame claimed as voice assistant
pub fn voice_assistant(samples: &[i16]) -> AudioFrame {
    AudioFrame::pcm(stream_type::VOICE_ASSISTANT, VOICE_DECODE, samples.to_vec())
}

/// Voice-coded frame claimed as call audio
pub fn call(samples: &[i16]) -> AudioFrame {
    AudioFrame::pcm(stream_type::CALL, NARROW_VOICE_DECODE, samples.to_vec())
}

/// Voice-coded frame on the generic stream
pub fn generic_voice(samples: &[i16]) -> AudioFrame {
    AudioFrame::pcm(stream_type::GENERIC, VOICE_DECODE, samples.to_vec())
}

/// Music frame carrying a duck hint
pub fn music_with_hint(samples: &[i16], level: f32, duration_ms: f32) -> AudioFrame {
    AudioFrame::Data(PcmFrame {
        stream_type: stream_type::GENERIC,
        decode_type: MEDIA_DECODE,
        gain_hint: Some(GainHint { level, duration_ms }),
        samples: samples.to_vec(),
    })
}

/// Constant-valued buffer
pub fn constant(value: i16, len: usize) -> Vec<i16> {
    vec![value; len]
}
