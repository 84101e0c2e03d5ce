//! Frame capture replay
//!
//! Captures are JSON Lines: one `AudioFrame` per line. Blank lines and
//! lines starting with `#` are skipped.
//!
//! ```text
//! {"kind":"command","stream_type":1,"command":10}
//! {"kind":"data","stream_type":1,"decode_type":4,"samples":[0,0,120,-120]}
//! ```

use crate::audio::AudioFrame;
use crate::error::{Error, Result};
use carlink_common::protocol::decode_format;
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Parse one capture line; None for blank and comment lines
pub fn parse_line(line: &str) -> Result<Option<AudioFrame>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| Error::Replay(format!("Invalid frame: {}", e)))
}

/// Parse every frame from a reader
pub fn parse_frames<R: BufRead>(reader: R) -> Result<Vec<AudioFrame>> {
    let mut frames = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| Error::Replay(format!("Line {}: {}", line_no, e)))?;
        let frame = parse_line(&line).map_err(|e| Error::Replay(format!("Line {}: {}", line_no, e)))?;
        if let Some(frame) = frame {
            frames.push(frame);
        }
    }

    Ok(frames)
}

/// Load a capture file
pub fn load_frames(path: &Path) -> Result<Vec<AudioFrame>> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Replay(format!("Failed to open {:?}: {}", path, e)))?;
    let frames = parse_frames(std::io::BufReader::new(file))?;
    debug!("Loaded {} frames from {:?}", frames.len(), path);
    Ok(frames)
}

/// Playback time covered by a data frame
///
/// None for commands, empty frames and unknown decode types.
pub fn frame_duration(frame: &AudioFrame) -> Option<Duration> {
    let AudioFrame::Data(pcm) = frame else {
        return None;
    };
    if pcm.samples.is_empty() {
        return None;
    }

    let format = decode_format(pcm.decode_type)?;
    let per_second = format.sample_rate as f64 * format.channels as f64;
    Some(Duration::from_secs_f64(pcm.samples.len() as f64 / per_second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let input = "# capture\n\n{\"kind\":\"command\",\"stream_type\":1,\"command\":10}\n";
        let frames = parse_frames(input.as_bytes()).unwrap();
        assert_eq!(frames, vec![AudioFrame::command(1, 10)]);
    }

    #[test]
    fn test_error_names_line() {
        let input = "{\"kind\":\"command\",\"stream_type\":1,\"command\":10}\nnot json\n";
        let err = parse_frames(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"), "{}", err);
    }

    #[test]
    fn test_gain_hint_parsed() {
        let frame = parse_line(
            r#"{"kind":"data","stream_type":1,"decode_type":4,"gain_hint":{"level":0.2,"duration_ms":50},"samples":[1]}"#,
        )
        .unwrap()
        .unwrap();

        let AudioFrame::Data(pcm) = frame else {
            panic!("expected data frame");
        };
        assert_eq!(pcm.gain_hint.unwrap().level, 0.2);
    }

    #[test]
    fn test_frame_duration() {
        // 960 samples of 48 kHz stereo = 10 ms
        let frame = AudioFrame::pcm(1, 4, vec![0; 960]);
        assert_eq!(frame_duration(&frame), Some(Duration::from_millis(10)));
        assert_eq!(frame_duration(&AudioFrame::command(1, 10)), None);
        assert_eq!(frame_duration(&AudioFrame::pcm(1, 99, vec![0; 4])), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"kind\":\"command\",\"stream_type\":1,\"command\":1}}").unwrap();
        writeln!(file, "{{\"kind\":\"data\",\"stream_type\":2,\"decode_type\":5,\"samples\":[5,6]}}")
            .unwrap();

        let frames = load_frames(file.path()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], AudioFrame::pcm(2, 5, vec![5, 6]));
    }
}
