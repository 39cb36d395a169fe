//! User-visible notifications.
//!
//! The store and coordinators report outcomes through a [`NotificationSink`];
//! the presentation layer drains the receiving end of the channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A single toast-style notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub timestamp: String,
}

/// Sending half of the notification channel.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    sender: mpsc::UnboundedSender<Notification>,
}

impl NotificationSink {
    /// Creates a sink and the receiver the presentation layer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn notify(
        &self,
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        let notification = Notification {
            level,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        };
        // Receiver may be gone during shutdown; nothing to do then.
        let _ = self.sender.send(notification);
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, title, message);
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, title, message);
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, title, message);
    }
}

impl Notification {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_are_delivered_in_order() {
        let (sink, mut receiver) = NotificationSink::channel();
        sink.error("Upload failed", "boom");
        sink.success("Uploaded", "3 files");

        let first = receiver.try_recv().unwrap();
        assert_eq!(first.level, NotificationLevel::Error);
        assert!(first.created_at().is_some());
        assert_eq!(receiver.try_recv().unwrap().title, "Uploaded");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (sink, receiver) = NotificationSink::channel();
        drop(receiver);
        sink.info("ignored", "no receiver");
    }
}
