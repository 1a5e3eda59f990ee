//! Source event bus - typed request/notification messages and broadcast
//!
//! Requests flow from the control surface down to the attached processing
//! chain; notifications flow from the chain out to registered listeners.
//! Delivery is at-most-once per broadcast, in registration order, on the
//! broadcasting thread. There is no persistence or replay: a listener sees
//! only events broadcast after it attached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::TunerSelect;

/// Control requests sent to the attached processing chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceRequest {
    /// Set the squelch threshold to an absolute value in dB.
    SetSquelchThreshold(f64),
    /// Ask the chain to re-broadcast the current squelch threshold.
    CurrentSquelchThreshold,
}

/// Telemetry notifications broadcast by the processing chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceNotification {
    /// Measured channel power in dB.
    ChannelPower(f64),
    /// Squelch threshold now in effect, in dB.
    SquelchThreshold(f64),
}

/// A bus message between the control layer and the active processing chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceEvent {
    Request {
        request: SourceRequest,
        tuner: Option<TunerSelect>,
    },
    Notification {
        notification: SourceNotification,
        tuner: Option<TunerSelect>,
    },
}

impl SourceEvent {
    pub fn set_squelch_threshold(threshold: f64) -> Self {
        Self::Request {
            request: SourceRequest::SetSquelchThreshold(threshold),
            tuner: None,
        }
    }

    pub fn request_current_squelch_threshold() -> Self {
        Self::Request {
            request: SourceRequest::CurrentSquelchThreshold,
            tuner: None,
        }
    }

    pub fn channel_power(power_db: f64) -> Self {
        Self::Notification {
            notification: SourceNotification::ChannelPower(power_db),
            tuner: None,
        }
    }

    pub fn squelch_threshold(threshold_db: f64) -> Self {
        Self::Notification {
            notification: SourceNotification::SquelchThreshold(threshold_db),
            tuner: None,
        }
    }

    /// Numeric payload carried by the event, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Request {
                request: SourceRequest::SetSquelchThreshold(v),
                ..
            } => Some(*v),
            Self::Request {
                request: SourceRequest::CurrentSquelchThreshold,
                ..
            } => None,
            Self::Notification {
                notification: SourceNotification::ChannelPower(v),
                ..
            }
            | Self::Notification {
                notification: SourceNotification::SquelchThreshold(v),
                ..
            } => Some(*v),
        }
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, Self::Notification { .. })
    }
}

/// Handle for detaching a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

/// Listener list with FIFO at-most-once delivery.
///
/// Attach and detach are safe to call from the control thread while the
/// sampling thread is broadcasting; the listener table is locked for the
/// duration of each broadcast.
pub struct Broadcaster<T> {
    listeners: Mutex<Vec<(ListenerId, Box<dyn Fn(&T) + Send>)>>,
    next_id: AtomicUsize,
}

impl<T> Broadcaster<T> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    pub fn add_listener(&self, listener: impl Fn(&T) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .expect("listener table lock poisoned")
            .push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.listeners
            .lock()
            .expect("listener table lock poisoned")
            .retain(|(listener_id, _)| *listener_id != id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .expect("listener table lock poisoned")
            .len()
    }

    pub fn broadcast(&self, item: &T) {
        let listeners = self.listeners.lock().expect("listener table lock poisoned");
        for (_, listener) in listeners.iter() {
            listener(item);
        }
    }
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}
