//! Microphone capture using cpal
//!
//! Same thread ownership model as the output sinks: the cpal input stream
//! lives on a `DeviceThread`, and captured audio goes straight to the
//! registered callback as little-endian 16-bit mono PCM.

use crate::audio::device::{DeviceStatus, DeviceThread};
use crate::audio::types::samples_to_bytes;
use crate::audio::{Microphone, MicrophoneCallback};
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use tracing::{debug, error, info};

/// Default input device capturing mono PCM at a fixed rate
pub struct CpalMicrophone {
    sample_rate: u32,
    device: DeviceThread,
}

impl CpalMicrophone {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            device: DeviceThread::new("microphone"),
        }
    }

    pub fn status(&self) -> DeviceStatus {
        self.device.status()
    }
}

impl Microphone for CpalMicrophone {
    fn start(&mut self, callback: MicrophoneCallback) -> Result<()> {
        if self.device.is_active() {
            debug!("Microphone already running");
            return Ok(());
        }

        // A previous attempt that failed to open is replaced
        self.device.stop();

        let sample_rate = self.sample_rate;
        self.device
            .spawn(move || open_stream(sample_rate, callback))
            .map_err(|e| Error::AudioInput(e.to_string()))?;

        info!("Microphone capture starting at {}Hz", self.sample_rate);
        Ok(())
    }

    fn stop(&mut self) {
        if self.device.status() != DeviceStatus::Stopped {
            self.device.stop();
            info!("Microphone capture stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.device.is_active()
    }
}

fn open_stream(sample_rate: u32, callback: MicrophoneCallback) -> Result<Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| Error::AudioInput("No default input device found".to_string()))?;

    let (config, sample_format) = capture_config(&device, sample_rate)?;
    debug!(
        "Microphone config: sample_rate={}, channels={}, format={:?}",
        config.sample_rate.0, config.channels, sample_format
    );

    let stream = match sample_format {
        SampleFormat::I16 => build_stream::<i16>(&device, &config, callback, |s| s)?,
        SampleFormat::F32 => build_stream::<f32>(&device, &config, callback, |s| {
            (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
        })?,
        SampleFormat::U16 => {
            build_stream::<u16>(&device, &config, callback, |s| (s as i32 - 32768) as i16)?
        }
        sample_format => {
            return Err(Error::AudioInput(format!(
                "Unsupported sample format: {:?}",
                sample_format
            )));
        }
    };

    stream
        .play()
        .map_err(|e| Error::AudioInput(format!("Failed to start capture: {}", e)))?;

    Ok(stream)
}

/// Find a mono config at the requested rate
fn capture_config(device: &Device, sample_rate: u32) -> Result<(StreamConfig, SampleFormat)> {
    let chosen = device
        .supported_input_configs()
        .map_err(|e| Error::AudioInput(format!("Failed to get device configs: {}", e)))?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate().0 <= sample_rate
                && c.max_sample_rate().0 >= sample_rate
        })
        .ok_or_else(|| {
            Error::AudioInput(format!("Microphone does not support {}Hz mono", sample_rate))
        })?;

    let sample_format = chosen.sample_format();
    let config = chosen.with_sample_rate(cpal::SampleRate(sample_rate)).config();
    Ok((config, sample_format))
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut callback: MicrophoneCallback,
    convert: fn(T) -> i16,
) -> Result<Stream>
where
    T: cpal::SizedSample + Send + 'static,
{
    let mut scratch: Vec<i16> = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                scratch.clear();
                scratch.extend(data.iter().map(|s| convert(*s)));
                callback(&samples_to_bytes(&scratch));
            },
            move |err| {
                error!("Microphone stream error: {}", err);
            },
            None,
        )
        .map_err(|e| Error::AudioInput(format!("Failed to build capture stream: {}", e)))
}
