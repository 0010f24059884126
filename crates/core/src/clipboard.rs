//! Clipboard hand-off.
//!
//! Writing to a clipboard is the host's job. Core only defines the sink contract and how the
//! outcome is reported back as a notification.

use crate::constants::{MSG_COPIED, MSG_COPY_FAILED};
use crate::notification::{NotificationKind, Notifier};
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Destination for plain UTF-8 text.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-memory sink; keeps the last text written.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_owned());
        Ok(())
    }
}

/// Sink writing to any `std::io::Write`, e.g. stdout piped into a platform clipboard tool.
pub struct WriterClipboard<W: std::io::Write> {
    writer: W,
}

impl<W: std::io::Write> WriterClipboard<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: std::io::Write> ClipboardSink for WriterClipboard<W> {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes `text` to `sink` and reports the outcome through `notifier`.
///
/// Failure is not propagated: it is logged and surfaces as an info notification.
pub fn copy_text_to(
    sink: &mut dyn ClipboardSink,
    text: &str,
    notifier: Notifier,
    now: DateTime<Utc>,
) -> Notifier {
    match sink.write_text(text) {
        Ok(()) => notifier.show(MSG_COPIED, NotificationKind::Success, now),
        Err(e) => {
            tracing::error!("Failed to copy: {}", e);
            notifier.show(MSG_COPY_FAILED, NotificationKind::Info, now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenClipboard;

    impl ClipboardSink for BrokenClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("permission denied".into()))
        }
    }

    #[test]
    fn successful_copy_raises_success_notification() {
        let mut sink = MemoryClipboard::new();
        let now = Utc::now();
        let notifier = copy_text_to(&mut sink, "本文", Notifier::default(), now);

        assert_eq!(sink.contents(), Some("本文"));
        let shown = notifier.visible(now).expect("notification visible");
        assert_eq!(shown.message, MSG_COPIED);
        assert_eq!(shown.kind, NotificationKind::Success);
    }

    #[test]
    fn failed_copy_raises_info_notification() {
        let now = Utc::now();
        let notifier = copy_text_to(&mut BrokenClipboard, "本文", Notifier::default(), now);

        let shown = notifier.visible(now).expect("notification visible");
        assert_eq!(shown.message, MSG_COPY_FAILED);
        assert_eq!(shown.kind, NotificationKind::Info);
    }

    #[test]
    fn writer_clipboard_appends_newline() {
        let mut sink = WriterClipboard::new(Vec::new());
        sink.write_text("abc").expect("write succeeds");
        assert_eq!(sink.into_inner(), b"abc\n");
    }
}
