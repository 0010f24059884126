//! Transient user notifications.
//!
//! At most one notification is live at a time. Showing a new one replaces the current one
//! outright, which also restarts the dismissal timer. The clock is always passed in so the
//! state transitions stay deterministic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: DateTime<Utc>,
    pub ttl_ms: u64,
}

impl Notification {
    /// Instant at which the notification is dismissed.
    pub fn expires_at(&self) -> DateTime<Utc> {
        // Capped at one day so the signed conversion cannot overflow.
        let ttl = self.ttl_ms.min(86_400_000) as i64;
        self.shown_at
            .checked_add_signed(Duration::milliseconds(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}

/// Holder for the single live notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifier {
    ttl_ms: u64,
    current: Option<Notification>,
}

impl Notifier {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            current: None,
        }
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Returns a notifier showing `message`, superseding whatever was shown before.
    pub fn show(self, message: impl Into<String>, kind: NotificationKind, now: DateTime<Utc>) -> Self {
        let message = message.into();
        tracing::debug!(?kind, %message, "notification shown");
        Self {
            ttl_ms: self.ttl_ms,
            current: Some(Notification {
                message,
                kind,
                shown_at: now,
                ttl_ms: self.ttl_ms,
            }),
        }
    }

    /// The notification to display at `now`, if it has not yet been dismissed.
    pub fn visible(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.current.as_ref().filter(|n| n.is_visible_at(now))
    }

    /// Last notification shown, whether or not it has expired.
    pub fn last(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_NOTIFICATION_TTL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_762_905_600_000 + ms)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn notification_is_dismissed_after_ttl() {
        let notifier = Notifier::new(3000).show("承認・完了しました", NotificationKind::Success, at(0));
        assert!(notifier.visible(at(2999)).is_some());
        assert!(notifier.visible(at(3000)).is_none());
        assert!(notifier.last().is_some());
    }

    #[test]
    fn newer_notification_supersedes_older_one() {
        let notifier = Notifier::new(3000)
            .show("一時保存しました", NotificationKind::Info, at(0))
            .show("承認・完了しました", NotificationKind::Success, at(2000));

        let shown = notifier.visible(at(4000)).expect("newer notification still visible");
        assert_eq!(shown.message, "承認・完了しました");
        assert_eq!(shown.kind, NotificationKind::Success);
        assert!(notifier.visible(at(5000)).is_none());
    }

    #[test]
    fn empty_notifier_shows_nothing() {
        assert!(Notifier::default().visible(at(0)).is_none());
        assert_eq!(Notifier::default().ttl_ms(), 3000);
    }
}
