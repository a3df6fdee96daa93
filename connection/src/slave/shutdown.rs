use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Stops a running stream from any thread.
///
/// `cancel` raises the interrupt flag and shuts the socket down, so a blocked read returns at once.
/// Safe to call repeatedly and before streaming starts.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    interrupted: Arc<AtomicBool>,
    stream: Arc<Mutex<Option<TcpStream>>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        ShutdownHandle::default()
    }

    pub fn cancel(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        if let Some(stream) = self.lock().as_ref() {
            debug!("shutting down the binlog socket");
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Clears the flag so the stream can be started again.
    pub fn reset(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
    }

    /// Registers the socket of a new session. Shut at once if a cancel came first.
    pub(crate) fn attach(&self, stream: TcpStream) {
        let mut guard = self.lock();
        if self.is_interrupted() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        *guard = Some(stream);
    }

    pub(crate) fn detach(&self) {
        self.lock().take();
    }

    /// Sleeps `duration` in short slices. false when interrupted meanwhile.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_interrupted() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<TcpStream>> {
        self.stream.lock().unwrap_or_else(|e| e.into_inner())
    }
}
