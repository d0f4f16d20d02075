//! Derivation export to the OS clipboard.
//!
//! Joins the ordered derivation steps into one text blob and hands it to a
//! clipboard backend. Success shows a transient "Copied!" flag; failure
//! shows a distinct flag. Neither outcome propagates an error and nothing
//! is retried.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

/// How long the copy feedback stays visible.
pub const FEEDBACK_DURATION: Duration = Duration::from_millis(2000);

/// Steps are separated by one blank line in the exported blob.
pub const STEP_SEPARATOR: &str = "\n\n";

pub trait ClipboardBackend: Send {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Backend writing to the system clipboard. The handle is created per copy;
/// on some platforms a long-lived handle holds the selection hostage.
pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFeedback {
    Idle,
    Copied { until: Instant },
    Failed { until: Instant },
}

pub struct ClipboardExporter {
    backend: Box<dyn ClipboardBackend>,
    feedback: CopyFeedback,
}

impl ClipboardExporter {
    pub fn new(backend: Box<dyn ClipboardBackend>) -> Self {
        Self {
            backend,
            feedback: CopyFeedback::Idle,
        }
    }

    /// Join the steps and request a clipboard write.
    pub fn copy_steps(&mut self, steps: &[String], now: Instant) {
        let blob = steps.join(STEP_SEPARATOR);
        self.copy_text(&blob, now);
    }

    pub fn copy_text(&mut self, text: &str, now: Instant) {
        let until = now + FEEDBACK_DURATION;
        self.feedback = match self.backend.set_text(text) {
            Ok(()) => CopyFeedback::Copied { until },
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                CopyFeedback::Failed { until }
            }
        };
    }

    /// Revert expired feedback. Returns true when the flag changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let until = match self.feedback {
            CopyFeedback::Copied { until } | CopyFeedback::Failed { until } => until,
            CopyFeedback::Idle => return false,
        };
        if now >= until {
            self.feedback = CopyFeedback::Idle;
            true
        } else {
            false
        }
    }

    pub fn feedback(&self) -> CopyFeedback {
        self.feedback
    }

    /// Label for the copy affordance, when feedback is active.
    pub fn label(&self) -> Option<&'static str> {
        match self.feedback {
            CopyFeedback::Idle => None,
            CopyFeedback::Copied { .. } => Some("Copied!"),
            CopyFeedback::Failed { .. } => Some("Copy failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::{Arc, Mutex};

    struct FakeClipboard {
        written: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl FakeClipboard {
        fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    written: Arc::clone(&written),
                    fail: false,
                },
                written,
            )
        }
    }

    impl ClipboardBackend for FakeClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                bail!("no clipboard");
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn steps_are_joined_with_blank_lines() {
        let (backend, written) = FakeClipboard::new();
        let mut exporter = ClipboardExporter::new(Box::new(backend));
        let steps = vec!["step one".to_string(), "step two".to_string()];
        exporter.copy_steps(&steps, Instant::now());
        assert_eq!(written.lock().unwrap().as_slice(), ["step one\n\nstep two"]);
        assert!(matches!(exporter.feedback(), CopyFeedback::Copied { .. }));
        assert_eq!(exporter.label(), Some("Copied!"));
    }

    #[test]
    fn single_step_has_no_separator() {
        let (backend, written) = FakeClipboard::new();
        let mut exporter = ClipboardExporter::new(Box::new(backend));
        exporter.copy_steps(&["only".to_string()], Instant::now());
        assert_eq!(written.lock().unwrap().as_slice(), ["only"]);
    }

    #[test]
    fn copied_flag_reverts_after_the_window() {
        let (backend, _) = FakeClipboard::new();
        let mut exporter = ClipboardExporter::new(Box::new(backend));
        let start = Instant::now();
        exporter.copy_text("x", start);

        // Still visible just before the deadline.
        assert!(!exporter.tick(start + FEEDBACK_DURATION - Duration::from_millis(1)));
        assert!(matches!(exporter.feedback(), CopyFeedback::Copied { .. }));

        assert!(exporter.tick(start + FEEDBACK_DURATION));
        assert_eq!(exporter.feedback(), CopyFeedback::Idle);
        assert_eq!(exporter.label(), None);
    }

    #[test]
    fn failure_sets_the_distinct_flag_without_propagating() {
        let (mut backend, written) = FakeClipboard::new();
        backend.fail = true;
        let mut exporter = ClipboardExporter::new(Box::new(backend));
        exporter.copy_text("x", Instant::now());
        assert!(matches!(exporter.feedback(), CopyFeedback::Failed { .. }));
        assert_eq!(exporter.label(), Some("Copy failed"));
        assert!(written.lock().unwrap().is_empty());
    }
}
