//! Lock-free sample ring buffer between the engine and a cpal callback
//!
//! Single producer (the engine's `AudioSink::write`), single consumer (the
//! real-time output callback). Neither side ever takes a lock:
//! - a full buffer drops the newest samples and counts an overrun
//! - an empty buffer yields silence and counts an underrun

use ringbuf::{traits::*, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Smallest buffer we will allocate, in samples
const MIN_CAPACITY: usize = 256;

/// Lock-free ring buffer of interleaved i16 samples
pub struct SampleRingBuffer {
    buffer: HeapRb<i16>,

    /// Samples the callback wanted but the buffer did not have
    underruns: Arc<AtomicU64>,

    /// Samples the engine wrote but the buffer could not hold
    overruns: Arc<AtomicU64>,
}

impl SampleRingBuffer {
    /// Create a buffer holding `capacity` samples (at least 256)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        debug!("Creating sample ring buffer with capacity: {} samples", capacity);

        Self {
            buffer: HeapRb::new(capacity),
            underruns: Arc::new(AtomicU64::new(0)),
            overruns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Buffer sized for `buffer_ms` of audio at the given rate and channel count
    pub fn for_duration(sample_rate: u32, channels: u16, buffer_ms: u64) -> Self {
        let samples = sample_rate as u64 * channels as u64 * buffer_ms / 1000;
        Self::new(samples as usize)
    }

    /// Split into producer and consumer halves
    pub fn split(self) -> (SampleProducer, SampleConsumer) {
        let (prod, cons) = self.buffer.split();

        let producer = SampleProducer {
            producer: prod,
            overruns: Arc::clone(&self.overruns),
        };

        let consumer = SampleConsumer {
            consumer: cons,
            underruns: Arc::clone(&self.underruns),
        };

        (producer, consumer)
    }
}

/// Producer half (engine side)
pub struct SampleProducer {
    producer: ringbuf::HeapProd<i16>,
    overruns: Arc<AtomicU64>,
}

impl SampleProducer {
    /// Push as many samples as fit; returns the number accepted
    pub fn push(&mut self, samples: &[i16]) -> usize {
        let pushed = self.producer.push_slice(samples);
        let dropped = samples.len() - pushed;

        if dropped > 0 {
            let events = self.overruns.fetch_add(1, Ordering::Relaxed) + 1;
            if events % 1000 == 0 {
                warn!(
                    "Sample ring buffer overrun (total: {}, last dropped {} samples)",
                    events, dropped
                );
            }
        }

        pushed
    }

    /// Current fill level in samples
    pub fn occupied_len(&self) -> usize {
        self.producer.occupied_len()
    }

    /// Total overrun events so far
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }
}

/// Consumer half (audio callback side)
pub struct SampleConsumer {
    consumer: ringbuf::HeapCons<i16>,
    underruns: Arc<AtomicU64>,
}

impl SampleConsumer {
    /// Fill `out` from the buffer, padding any shortfall with silence
    ///
    /// Returns the number of real samples copied.
    pub fn pop_into(&mut self, out: &mut [i16]) -> usize {
        let popped = self.consumer.pop_slice(out);

        if popped < out.len() {
            out[popped..].fill(0);
            let events = self.underruns.fetch_add(1, Ordering::Relaxed) + 1;
            if events % 1000 == 0 {
                trace!("Sample ring buffer underrun (total: {})", events);
            }
        }

        popped
    }

    /// Total underrun events so far
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_from_duration() {
        let (producer, _consumer) = SampleRingBuffer::for_duration(48_000, 2, 200).split();
        assert_eq!(producer.occupied_len(), 0);

        // 48000 * 2 * 0.2 = 19200 samples fit without overrun
        let mut producer = producer;
        assert_eq!(producer.push(&vec![1; 19_200]), 19_200);
        assert_eq!(producer.overruns(), 0);
    }

    #[test]
    fn test_overrun_drops_newest() {
        let (mut producer, mut consumer) = SampleRingBuffer::new(MIN_CAPACITY).split();

        let input: Vec<i16> = (0..300).collect();
        assert_eq!(producer.push(&input), MIN_CAPACITY);
        assert_eq!(producer.overruns(), 1);

        let mut out = vec![0; MIN_CAPACITY];
        assert_eq!(consumer.pop_into(&mut out), MIN_CAPACITY);
        assert_eq!(out[0], 0);
        assert_eq!(out[MIN_CAPACITY - 1], (MIN_CAPACITY - 1) as i16);
    }

    #[test]
    fn test_underrun_pads_silence() {
        let (mut producer, mut consumer) = SampleRingBuffer::new(MIN_CAPACITY).split();
        producer.push(&[7, 8, 9]);

        let mut out = [1i16; 6];
        assert_eq!(consumer.pop_into(&mut out), 3);
        assert_eq!(out, [7, 8, 9, 0, 0, 0]);
        assert_eq!(consumer.underruns(), 1);
    }
}
