use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::core::classifier::{ClassifyTicket, UndoTicket};
use crate::core::mover::{RelocateResponse, ReverseResponse};
use crate::core::MoverError;
use crate::state::Settings;

/// Result of a mover call made on the worker thread
pub enum JobMessage {
    Classified(ClassifyTicket, Result<RelocateResponse, MoverError>),
    Undone(UndoTicket, Result<ReverseResponse, MoverError>),
}

/// Background mover call tracking
#[derive(Default)]
pub struct JobState {
    /// Channel receiver for the running job, if any
    pub(crate) receiver: Option<Receiver<JobMessage>>,
}

impl JobState {
    pub fn new() -> Self {
        Self { receiver: None }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// A single message shown in the corner toast
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub tone: Tone,
    pub shown_at: Instant,
}

impl Notification {
    const LIFETIME: Duration = Duration::from_secs(4);

    pub fn new(message: impl Into<String>, tone: Tone) -> Self {
        Self {
            message: message.into(),
            tone,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= Self::LIFETIME
    }
}

/// UI-related state for dialogs
#[derive(Default)]
pub struct UIState {
    /// Working copy edited by the settings window; `Some` while it is open
    pub settings_draft: Option<Settings>,
    /// Name typed into the "new label" field
    pub new_label_name: String,
    pub notification: Option<Notification>,
}

impl UIState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, message: impl Into<String>, tone: Tone) {
        self.notification = Some(Notification::new(message, tone));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_replaces_previous_message() {
        let mut ui = UIState::new();
        ui.notify("first", Tone::Info);
        ui.notify("second", Tone::Error);

        let notification = ui.notification.unwrap();
        assert_eq!(notification.message, "second");
        assert_eq!(notification.tone, Tone::Error);
        assert!(!notification.is_expired());
    }

    #[test]
    fn test_job_state_idle_by_default() {
        assert!(!JobState::new().is_running());
    }
}
