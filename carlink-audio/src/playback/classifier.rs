//! Stream classification
//!
//! Maps a frame's claimed stream type and decode type onto the logical
//! channel it plays on. Classification never drops: a voice-coded payload
//! with no voice session still answers Music here, and the engine decides
//! whether to discard it.

use carlink_common::protocol::{payload_class, stream_type, PayloadClass};
use carlink_common::LogicalChannel;

/// Decide the logical channel for a PCM frame
///
/// # Arguments
/// * `stream_type` - Stream type code from the frame metadata
/// * `decode_type` - Decode type code (selects the PCM format)
/// * `voice_assistant_active` - A voice assistant session is open
/// * `phone_call_active` - A phone call is open
pub fn classify(
    stream_type: u32,
    decode_type: u32,
    voice_assistant_active: bool,
    phone_call_active: bool,
) -> LogicalChannel {
    match stream_type {
        stream_type::NAVIGATION => LogicalChannel::Navigation,
        stream_type::VOICE_ASSISTANT => LogicalChannel::VoiceAssistant,
        stream_type::CALL => LogicalChannel::Call,
        stream_type::GENERIC => match payload_class(decode_type) {
            PayloadClass::Media => LogicalChannel::Music,
            PayloadClass::Voice | PayloadClass::Other => {
                voice_session_channel(voice_assistant_active, phone_call_active)
            }
        },
        _ => LogicalChannel::Music,
    }
}

/// Voice session owning a generic stream, falling back to Music
fn voice_session_channel(voice_assistant_active: bool, phone_call_active: bool) -> LogicalChannel {
    if voice_assistant_active {
        LogicalChannel::VoiceAssistant
    } else if phone_call_active {
        LogicalChannel::Call
    } else {
        LogicalChannel::Music
    }
}
