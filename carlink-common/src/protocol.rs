//! Head-unit audio protocol tables
//!
//! Stable integer codes carried by the phone-mirroring transport: audio
//! control commands, stream types, and the decode-type → PCM format table.
//! The codes are a wire contract and must not be renumbered.

use serde::{Deserialize, Serialize};

/// Semantic audio role of a PCM stream, independent of its physical sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalChannel {
    /// Media playback (the default channel)
    Music,

    /// Turn-by-turn navigation prompts, may be mixed into Music
    Navigation,

    /// Voice assistant session audio
    VoiceAssistant,

    /// Phone call audio
    Call,
}

impl LogicalChannel {
    /// All channels in a stable order
    pub fn all() -> &'static [LogicalChannel] {
        &[
            LogicalChannel::Music,
            LogicalChannel::Navigation,
            LogicalChannel::VoiceAssistant,
            LogicalChannel::Call,
        ]
    }

    /// Whether this channel belongs to a voice session (assistant or call)
    pub fn is_voice(&self) -> bool {
        matches!(self, LogicalChannel::VoiceAssistant | LogicalChannel::Call)
    }
}

impl std::fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalChannel::Music => write!(f, "music"),
            LogicalChannel::Navigation => write!(f, "navigation"),
            LogicalChannel::VoiceAssistant => write!(f, "voice_assistant"),
            LogicalChannel::Call => write!(f, "call"),
        }
    }
}

/// Stream type codes as claimed by frame metadata
pub mod stream_type {
    /// Generic stream; the decode type decides media vs voice
    pub const GENERIC: u32 = 1;
    /// Navigation prompts
    pub const NAVIGATION: u32 = 2;
    /// Voice assistant
    pub const VOICE_ASSISTANT: u32 = 3;
    /// Phone call
    pub const CALL: u32 = 4;
}

/// Audio control commands carried by command frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCommand {
    MediaOpen,
    MediaOpenStop,
    InputConfig,
    CallStart,
    CallStop,
    NavigationStart,
    NavigationStop,
    VoiceAssistantStart,
    VoiceAssistantStop,
    MediaStart,
    MediaStop,
    AttentionStart,
    AttentionStop,
    AttentionRinging,
    TurnByTurnStart,
    TurnByTurnStop,
}

impl AudioCommand {
    /// Decode a wire command code; unknown codes yield None
    pub fn from_code(code: u32) -> Option<Self> {
        let command = match code {
            1 => AudioCommand::MediaOpen,
            2 => AudioCommand::MediaOpenStop,
            3 => AudioCommand::InputConfig,
            4 => AudioCommand::CallStart,
            5 => AudioCommand::CallStop,
            6 => AudioCommand::NavigationStart,
            7 => AudioCommand::NavigationStop,
            8 => AudioCommand::VoiceAssistantStart,
            9 => AudioCommand::VoiceAssistantStop,
            10 => AudioCommand::MediaStart,
            11 => AudioCommand::MediaStop,
            12 => AudioCommand::AttentionStart,
            13 => AudioCommand::AttentionStop,
            14 => AudioCommand::AttentionRinging,
            15 => AudioCommand::TurnByTurnStart,
            16 => AudioCommand::TurnByTurnStop,
            _ => return None,
        };
        Some(command)
    }

    /// Wire code for this command
    pub fn code(&self) -> u32 {
        match self {
            AudioCommand::MediaOpen => 1,
            AudioCommand::MediaOpenStop => 2,
            AudioCommand::InputConfig => 3,
            AudioCommand::CallStart => 4,
            AudioCommand::CallStop => 5,
            AudioCommand::NavigationStart => 6,
            AudioCommand::NavigationStop => 7,
            AudioCommand::VoiceAssistantStart => 8,
            AudioCommand::VoiceAssistantStop => 9,
            AudioCommand::MediaStart => 10,
            AudioCommand::MediaStop => 11,
            AudioCommand::AttentionStart => 12,
            AudioCommand::AttentionStop => 13,
            AudioCommand::AttentionRinging => 14,
            AudioCommand::TurnByTurnStart => 15,
            AudioCommand::TurnByTurnStop => 16,
        }
    }
}

/// How a decode type's payload should be treated by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadClass {
    /// Wideband stereo media (music)
    Media,

    /// Narrowband mono telephony / assistant speech
    Voice,

    /// Anything else
    Other,
}

/// PCM format described by a decode type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Interleaved channel count
    pub channels: u16,

    /// Bits per sample (always 16 on this transport)
    pub bit_depth: u16,

    /// Sample encoding name
    pub format_name: &'static str,
}

/// Codec name announced for every decode type
pub const PCM_CODEC: &str = "PCM";

/// Look up the PCM format for a decode type code
pub fn decode_format(decode_type: u32) -> Option<AudioFormat> {
    let (sample_rate, channels) = match decode_type {
        1 | 2 => (44_100, 2),
        3 => (8_000, 1),
        4 => (48_000, 2),
        5 => (16_000, 1),
        6 => (24_000, 1),
        7 => (16_000, 2),
        _ => return None,
    };

    Some(AudioFormat {
        sample_rate,
        channels,
        bit_depth: 16,
        format_name: "S16LE",
    })
}

/// Classify a decode type's payload as media, voice or other
pub fn payload_class(decode_type: u32) -> PayloadClass {
    match decode_type {
        1 | 2 | 4 => PayloadClass::Media,
        3 | 5 => PayloadClass::Voice,
        _ => PayloadClass::Other,
    }
}
