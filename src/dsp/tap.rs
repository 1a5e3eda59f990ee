//! Sample stream tap
//!
//! First pipeline stage: sits in the sample path and forwards buffers to a
//! replaceable listener. Replacing or clearing the listener does not require
//! pipeline reconstruction; with no listener attached buffers pass through
//! untouched.

use std::sync::Mutex;

use crossbeam_channel::Sender;
use tracing::trace;

use super::ComplexBuffer;

/// Tap over the complex sample stream with a swappable listener.
pub struct SampleTap {
    listener: Mutex<Option<Sender<ComplexBuffer>>>,
}

impl SampleTap {
    pub fn new() -> Self {
        Self {
            listener: Mutex::new(None),
        }
    }

    /// Installs the listener, replacing any previous one.
    pub fn set_listener(&self, listener: Sender<ComplexBuffer>) {
        *self.listener.lock().expect("tap listener lock poisoned") = Some(listener);
    }

    /// Removes the listener; subsequent buffers are dropped at the tap.
    pub fn remove_listener(&self) {
        *self.listener.lock().expect("tap listener lock poisoned") = None;
    }

    pub fn has_listener(&self) -> bool {
        self.listener
            .lock()
            .expect("tap listener lock poisoned")
            .is_some()
    }

    /// Called on the sampling thread for every buffer. Full downstream
    /// queues drop the buffer rather than blocking the sample path.
    pub fn receive(&self, buffer: ComplexBuffer) {
        let listener = self.listener.lock().expect("tap listener lock poisoned");
        if let Some(tx) = listener.as_ref() {
            if tx.try_send(buffer).is_err() {
                trace!("tap listener queue full, dropping buffer");
            }
        }
    }
}

impl Default for SampleTap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use rustfft::num_complex::Complex;

    fn buffer(len: usize) -> ComplexBuffer {
        vec![Complex::new(0.5, -0.5); len]
    }

    #[test]
    fn test_forwards_to_listener() {
        let tap = SampleTap::new();
        let (tx, rx) = bounded(4);

        tap.set_listener(tx);
        tap.receive(buffer(16));

        assert_eq!(rx.recv().unwrap().len(), 16);
    }

    #[test]
    fn test_no_listener_drops_buffer() {
        let tap = SampleTap::new();
        // Must not panic or block.
        tap.receive(buffer(16));
        assert!(!tap.has_listener());
    }

    #[test]
    fn test_removed_listener_receives_nothing() {
        let tap = SampleTap::new();
        let (tx, rx) = bounded(4);

        tap.set_listener(tx);
        tap.remove_listener();
        tap.receive(buffer(8));

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let tap = SampleTap::new();
        let (tx, rx) = bounded(1);

        tap.set_listener(tx);
        tap.receive(buffer(8));
        tap.receive(buffer(8));

        assert_eq!(rx.try_recv().unwrap().len(), 8);
        assert!(rx.try_recv().is_err());
    }
}
