use crate::domain::ports::{Presenter, SuccessView};
use crate::domain::validation::Field;
use std::io::Write;
use std::sync::Mutex;

/// Writes workflow output to a terminal.
///
/// Status and success text go to stdout, errors to stderr. Announcements are
/// screen-reader text and, like focus changes, are only echoed when `verbose`
/// is set.
pub struct ConsolePresenter {
    verbose: bool,
}

impl ConsolePresenter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Presenter for ConsolePresenter {
    fn show_status(&self, message: &str) {
        println!("{}", message);
    }

    fn show_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn announce(&self, message: &str) {
        if self.verbose {
            println!("[announce] {}", message);
        }
    }

    fn focus_field(&self, field: Field) {
        if self.verbose {
            println!("[focus] {}", field.id());
        }
    }

    fn show_success(&self, view: &SuccessView) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not worth failing a completed registration over.
        let _ = writeln!(out, "{}", view.payment_summary);
        let _ = writeln!(out, "{}: {}", view.transaction_label, view.payment_id);
        let _ = writeln!(out, "{}", view.email_status);
    }
}

/// Everything a [`RecordingPresenter`] was asked to show, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Status(String),
    Error(String),
    Announcement(String),
    Focus(Field),
    Success(SuccessView),
}

/// Captures presenter calls instead of rendering them.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PresenterEvent::Status(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn last_success(&self) -> Option<SuccessView> {
        self.events().into_iter().rev().find_map(|event| match event {
            PresenterEvent::Success(view) => Some(view),
            _ => None,
        })
    }

    fn push(&self, event: PresenterEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Presenter for RecordingPresenter {
    fn show_status(&self, message: &str) {
        self.push(PresenterEvent::Status(message.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.push(PresenterEvent::Error(message.to_string()));
    }

    fn announce(&self, message: &str) {
        self.push(PresenterEvent::Announcement(message.to_string()));
    }

    fn focus_field(&self, field: Field) {
        self.push(PresenterEvent::Focus(field));
    }

    fn show_success(&self, view: &SuccessView) {
        self.push(PresenterEvent::Success(view.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_keeps_order() {
        let presenter = RecordingPresenter::new();
        presenter.show_status("one");
        presenter.focus_field(Field::Email);
        presenter.show_status("two");

        assert_eq!(presenter.statuses(), vec!["one", "two"]);
        assert_eq!(presenter.events()[1], PresenterEvent::Focus(Field::Email));
        assert!(presenter.last_success().is_none());
    }
}
