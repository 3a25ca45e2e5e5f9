use rfd::{MessageButtons, MessageDialog, MessageLevel};

/// Blocking, user-facing notification channel.
pub trait Notifier {
    /// Shows `message` and returns once the user has acknowledged it.
    fn alert(&mut self, message: &str);
}

/// Native error dialog.
#[derive(Debug, Clone)]
pub struct DialogNotifier {
    title: String,
}

impl DialogNotifier {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Default for DialogNotifier {
    fn default() -> Self {
        Self::new("canvas")
    }
}

impl Notifier for DialogNotifier {
    fn alert(&mut self, message: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(self.title.as_str())
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
