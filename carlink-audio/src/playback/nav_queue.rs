//! Navigation-mix queue
//!
//! Navigation prompts that arrive while Music is playing are not written to
//! their own sink. They are queued here and drained sample by sample into
//! the Music frames that follow, so the prompt plays over the music on the
//! Music sink.

use std::collections::VecDeque;

/// FIFO of navigation PCM with a read offset into the front buffer
#[derive(Debug, Default)]
pub struct NavMixQueue {
    buffers: VecDeque<Vec<i16>>,

    /// Samples of the front buffer already consumed
    offset: usize,

    /// Total unconsumed samples across all buffers
    remaining: usize,
}

impl NavMixQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy samples onto the tail; empty input is ignored
    pub fn push(&mut self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }
        self.buffers.push_back(samples.to_vec());
        self.remaining += samples.len();
    }

    /// Take the next queued sample, or 0 when the queue is empty
    pub fn next_sample(&mut self) -> i16 {
        let Some(front) = self.buffers.front() else {
            return 0;
        };

        let sample = front[self.offset];
        self.offset += 1;
        self.remaining -= 1;

        if self.offset >= front.len() {
            self.buffers.pop_front();
            self.offset = 0;
        }

        sample
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
        self.offset = 0;
        self.remaining = 0;
    }

    /// Unconsumed samples
    pub fn len_samples(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Buffers still held (the front one may be partly consumed)
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }
}
