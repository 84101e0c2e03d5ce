//! Audio output using cpal
//!
//! Each `CpalSink` plays one PlayerKey's stream on the default output
//! device. The stream lives on a `DeviceThread`; the engine talks to it
//! only through the lock-free ring buffer, so neither `start` nor `stop`
//! waits on the device.

use crate::audio::device::{DeviceStatus, DeviceThread};
use crate::audio::ring_buffer::{SampleConsumer, SampleProducer, SampleRingBuffer};
use crate::audio::{AudioSink, PlayerKey, SinkFactory};
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use tracing::{debug, error, info, trace};

/// List available audio output devices
pub fn list_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();

    let devices: Vec<String> = host
        .output_devices()
        .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
        .filter_map(|device| device.name().ok())
        .collect();

    debug!("Found {} output devices", devices.len());
    Ok(devices)
}

/// Hardware sink for one (sample rate, channel count) pair
pub struct CpalSink {
    key: PlayerKey,
    buffer_ms: u64,
    device: DeviceThread,
    producer: Option<SampleProducer>,
    discarded: u64,
}

impl CpalSink {
    pub fn new(key: PlayerKey, buffer_ms: u64) -> Self {
        Self {
            key,
            buffer_ms,
            device: DeviceThread::new(format!("sink-{}", key)),
            producer: None,
            discarded: 0,
        }
    }

    pub fn status(&self) -> DeviceStatus {
        self.device.status()
    }
}

impl AudioSink for CpalSink {
    fn start(&mut self) -> Result<()> {
        if self.producer.is_some() {
            return Ok(());
        }

        let (producer, consumer) =
            SampleRingBuffer::for_duration(self.key.sample_rate, self.key.channels, self.buffer_ms)
                .split();

        let key = self.key;
        self.device.spawn(move || open_stream(key, consumer))?;
        self.producer = Some(producer);
        self.discarded = 0;

        info!("Audio sink {} starting", self.key);
        Ok(())
    }

    fn write(&mut self, samples: &[i16]) -> Result<()> {
        let producer = self
            .producer
            .as_mut()
            .ok_or_else(|| Error::InvalidState(format!("Sink {} not started", self.key)))?;

        if self.device.status() == DeviceStatus::Failed {
            // Open failure was already logged by the device thread
            self.discarded += samples.len() as u64;
            trace!("Sink {} unavailable, discarded {} samples", self.key, self.discarded);
            return Ok(());
        }

        producer.push(samples);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.producer = None;
        if self.device.status() != DeviceStatus::Stopped {
            self.device.stop();
            info!("Audio sink {} stopped", self.key);
        }
        Ok(())
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn open_stream(key: PlayerKey, consumer: SampleConsumer) -> Result<Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?;

    let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    let (config, sample_format) = matching_config(&device, key)?;

    debug!(
        "Output {} on '{}': format={:?}, buffer_size={:?}",
        key, name, sample_format, config.buffer_size
    );

    let stream = match sample_format {
        SampleFormat::I16 => build_stream::<i16>(&device, &config, consumer, |s| s)?,
        SampleFormat::F32 => {
            build_stream::<f32>(&device, &config, consumer, |s| s as f32 / 32768.0)?
        }
        SampleFormat::U16 => {
            build_stream::<u16>(&device, &config, consumer, |s| (s as i32 + 32768) as u16)?
        }
        sample_format => {
            return Err(Error::AudioOutput(format!(
                "Unsupported sample format: {:?}",
                sample_format
            )));
        }
    };

    stream
        .play()
        .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

    Ok(stream)
}

/// Find a device config that plays `key` natively
///
/// No resampling happens anywhere in the pipeline, so the device must
/// accept the stream's rate and channel count as-is.
fn matching_config(device: &Device, key: PlayerKey) -> Result<(StreamConfig, SampleFormat)> {
    let supported = device
        .supported_output_configs()
        .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?;

    let mut candidates: Vec<_> = supported
        .filter(|c| {
            c.channels() == key.channels
                && c.min_sample_rate().0 <= key.sample_rate
                && c.max_sample_rate().0 >= key.sample_rate
        })
        .collect();

    // Prefer i16, which needs no conversion
    candidates.sort_by_key(|c| match c.sample_format() {
        SampleFormat::I16 => 0,
        SampleFormat::F32 => 1,
        _ => 2,
    });

    let chosen = candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::AudioOutput(format!("Device does not support {}", key)))?;

    let sample_format = chosen.sample_format();
    let config = chosen
        .with_sample_rate(cpal::SampleRate(key.sample_rate))
        .config();
    Ok((config, sample_format))
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut consumer: SampleConsumer,
    convert: fn(i16) -> T,
) -> Result<Stream>
where
    T: cpal::SizedSample + Send + 'static,
{
    let mut scratch: Vec<i16> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if scratch.len() < data.len() {
                    scratch.resize(data.len(), 0);
                }
                let scratch = &mut scratch[..data.len()];
                consumer.pop_into(scratch);
                for (out, sample) in data.iter_mut().zip(scratch.iter()) {
                    *out = convert(*sample);
                }
            },
            move |err| {
                error!("Audio output stream error: {}", err);
            },
            None,
        )
        .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))
}

/// Creates a `CpalSink` per PlayerKey on the default output device
pub struct CpalSinkFactory {
    buffer_ms: u64,
}

impl CpalSinkFactory {
    pub fn new(buffer_ms: u64) -> Self {
        Self { buffer_ms }
    }
}

impl SinkFactory for CpalSinkFactory {
    fn create(&mut self, key: PlayerKey) -> Result<Box<dyn AudioSink>> {
        debug!("Creating cpal sink for {}", key);
        Ok(Box::new(CpalSink::new(key, self.buffer_ms)))
    }
}
