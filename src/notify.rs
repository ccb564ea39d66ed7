//! Transient user notifications ("toasts").

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast { level: ToastLevel::Success, message: message.to_owned() });
    }

    fn error(&self, message: &str) {
        self.notify(Toast { level: ToastLevel::Error, message: message.to_owned() });
    }
}

/// Buffers toasts until the front end drains and displays them.
#[derive(Default)]
pub struct ToastQueue {
    pending: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).push(toast);
    }
}
