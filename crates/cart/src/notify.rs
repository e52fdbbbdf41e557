//! User-facing notifications raised by cart actions.
//!
//! Web UIs show these as toasts. The store only decides *what* to say; the
//! [`Notifier`] implementation decides how the customer sees it.

use std::sync::{Arc, Mutex};

/// Outcome message for a user-initiated cart action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The action succeeded.
    Success(String),
    /// The action was rejected and the cart is unchanged.
    Failure(String),
}

impl Notification {
    /// The message text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(msg) | Self::Failure(msg) => msg,
        }
    }

    /// Returns `true` for [`Notification::Failure`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Sink for user-facing notifications.
pub trait Notifier {
    /// Deliver a notification. Must not panic.
    fn notify(&self, notification: Notification);
}

/// Default notifier: emits notifications as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(msg) => tracing::info!(notification = %msg, "Cart notification"),
            Notification::Failure(msg) => tracing::warn!(notification = %msg, "Cart notification"),
        }
    }
}

/// Notifier that records everything it receives.
///
/// Clones share the same log, so a handle kept outside the store sees what
/// the store emitted.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Drain and return everything received so far.
    #[must_use]
    pub fn take(&self) -> Vec<Notification> {
        self.log
            .lock()
            .map(|mut log| std::mem::take(&mut *log))
            .unwrap_or_default()
    }

    /// Number of failures received so far.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.notifications()
            .iter()
            .filter(|n| n.is_failure())
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut log) = self.log.lock() {
            log.push(notification);
        }
    }
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}
