//! Transport boundary
//!
//! The link to the phone is owned elsewhere; the audio session only needs
//! to bring it up and down (`Transport`) and to push microphone audio back
//! out while a voice session is open (`Uplink`).

use crate::Result;
use futures::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Session-level link to the phone
pub trait Transport: Send + Sync + 'static {
    fn open(&self) -> BoxFuture<'static, Result<()>>;

    fn close(&self) -> BoxFuture<'static, Result<()>>;
}

/// Microphone-to-phone direction of the link
pub trait Uplink: Send + Sync {
    fn send_microphone_audio(&self, samples: &[i16]) -> Result<()>;
}

/// Transport with nothing behind it, for offline replay
#[derive(Debug, Default)]
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    fn open(&self) -> BoxFuture<'static, Result<()>> {
        async {
            info!("Offline transport opened");
            Ok(())
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'static, Result<()>> {
        async {
            info!("Offline transport closed");
            Ok(())
        }
        .boxed()
    }
}

/// Uplink that discards audio, counting what it was given
#[derive(Debug, Default)]
pub struct DiscardUplink {
    samples_sent: AtomicU64,
}

impl DiscardUplink {
    pub fn samples_sent(&self) -> u64 {
        self.samples_sent.load(Ordering::Relaxed)
    }
}

impl Uplink for DiscardUplink {
    fn send_microphone_audio(&self, samples: &[i16]) -> Result<()> {
        self.samples_sent
            .fetch_add(samples.len() as u64, Ordering::Relaxed);
        debug!("Discarded {} microphone samples", samples.len());
        Ok(())
    }
}
