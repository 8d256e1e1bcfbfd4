// Erase-percentage scanning, off the UI thread.
// Visual: the "ERASED: xx.xx%" readout in the HUD updates shortly after you
// lift the mouse button, without the window stalling on big masks.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::mask::MaskSnapshot;

/// Count pixels whose alpha byte is zero.
pub fn count_erased(pixels: &[u32]) -> usize {
    pixels.iter().filter(|&&p| p >> 24 == 0).count()
}

/// Percent of fully erased pixels, in [0, 100]. An empty buffer is 0%.
pub fn scan_percent(pixels: &[u32]) -> f32 {
    if pixels.is_empty() {
        return 0.0;
    }
    let erased = count_erased(pixels);
    (erased as f64 / pixels.len() as f64 * 100.0) as f32
}

/// Single-slot percent listener.
pub type PercentListener = Box<dyn FnMut(f32)>;

/// Runs one scan per request on its own worker thread and hands results back
/// to the owning thread, which delivers them to the listener in [`dispatch`].
///
/// Scans are never merged or cancelled: every scheduled scan reports exactly
/// once, possibly out of order with respect to other scans.
///
/// [`dispatch`]: ErasePercentTracker::dispatch
pub struct ErasePercentTracker {
    tx: Sender<f32>,
    rx: Receiver<f32>,
    in_flight: usize,
    next_id: u64,
    listener: Option<PercentListener>,
}

impl ErasePercentTracker {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, in_flight: 0, next_id: 0, listener: None }
    }

    /// Replace the listener; the previous one (if any) is dropped.
    pub fn set_listener(&mut self, listener: impl FnMut(f32) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Scans scheduled but not yet delivered through `dispatch`.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a background scan of `snapshot`.
    pub fn schedule_scan(&mut self, snapshot: MaskSnapshot) {
        let id = self.next_id;
        self.next_id += 1;
        let tx = self.tx.clone();
        let fallback = snapshot.clone(); // shares the pixel Arc

        let spawned = thread::Builder::new().name(format!("erase-scan-{id}")).spawn(move || {
            let percent = snapshot.erase_percent();
            tracing::debug!(scan = id, percent, width = snapshot.width(), height = snapshot.height(), "scan finished");
            // receiver lives as long as the tracker; a closed channel just means nobody is listening anymore
            let _ = tx.send(percent);
        });

        if let Err(err) = spawned {
            // every scan must report, so fall back to scanning inline
            tracing::warn!(?err, scan = id, "could not spawn scan thread, scanning inline");
            let _ = self.tx.send(fallback.erase_percent());
        }
        self.in_flight += 1;
    }

    /// Deliver every finished scan to the listener. Never blocks.
    /// Returns how many results were delivered.
    pub fn dispatch(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            match self.rx.try_recv() {
                Ok(percent) => {
                    self.deliver(percent);
                    delivered += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }

    /// Like [`dispatch`](Self::dispatch), but waits up to `timeout` for all
    /// in-flight scans to report.
    pub fn dispatch_blocking(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut delivered = self.dispatch();
        while self.in_flight > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(percent) => {
                    self.deliver(percent);
                    delivered += 1;
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        delivered
    }

    fn deliver(&mut self, percent: f32) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Some(listener) = self.listener.as_mut() {
            listener(percent);
        }
    }
}

impl Default for ErasePercentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErasePercentTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasePercentTracker")
            .field("in_flight", &self.in_flight)
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}
