//! Scripted transport for session tests

use carlink_audio::error::{Error, Result};
use carlink_audio::transport::Transport;
use futures::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Transport whose open/close take a fixed time and may be told to fail
#[derive(Default)]
pub struct ScriptedTransport {
    inner: Arc<ScriptInner>,
}

#[derive(Default)]
struct ScriptInner {
    opens: AtomicUsize,
    closes: AtomicUsize,
    fail_open: AtomicBool,
    fail_close: AtomicBool,
}

/// Simulated link latency for open and close
pub const LINK_LATENCY: Duration = Duration::from_millis(20);

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opens(&self) -> usize {
        self.inner.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    pub fn fail_open(&self, fail: bool) {
        self.inner.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.inner.fail_close.store(fail, Ordering::SeqCst);
    }
}

impl Transport for ScriptedTransport {
    fn open(&self) -> BoxFuture<'static, Result<()>> {
        let inner = Arc::clone(&self.inner);
        async move {
            inner.opens.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(LINK_LATENCY).await;
            if inner.fail_open.load(Ordering::SeqCst) {
                return Err(Error::Transport("open refused".to_string()));
            }
            Ok(())
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'static, Result<()>> {
        let inner = Arc::clone(&self.inner);
        async move {
            inner.closes.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(LINK_LATENCY).await;
            if inner.fail_close.load(Ordering::SeqCst) {
                return Err(Error::Transport("close timed out".to_string()));
            }
            Ok(())
        }
        .boxed()
    }
}
