//! User-facing notifications and navigation.

use crate::constants::{NAME_COLOR, OK_COLOR, WARN_COLOR};
use url::Url;

/// A follow-up the user may take from a notification.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct NotificationAction {
    pub(crate) label: String,
    pub(crate) url: Url,
}

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum NotificationKind {
    Success,
    Info,
}

/// A short, toast-style message.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Notification {
    pub(crate) kind: NotificationKind,
    pub(crate) message: String,
    pub(crate) action: Option<NotificationAction>,
}

impl Notification {
    pub(crate) fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            action: None,
        }
    }

    pub(crate) fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
            action: None,
        }
    }

    pub(crate) fn with_action(mut self, label: impl Into<String>, url: Url) -> Self {
        self.action = Some(NotificationAction {
            label: label.into(),
            url,
        });
        self
    }
}

/// Sink for notifications and navigation requests.
pub(crate) trait Notifier: Send + Sync {
    /// Shows `notification` to the user.
    fn notify(&self, notification: Notification);

    /// Asks the user's environment to navigate to `url`.
    fn open_url(&self, url: &Url);
}

/// A [Notifier] that prints to the terminal.
#[derive(Default, Debug, Clone, Copy)]
pub(crate) struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let color = match notification.kind {
            NotificationKind::Success => OK_COLOR,
            NotificationKind::Info => WARN_COLOR,
        };
        println!("{}", color.paint(notification.message));
        if let Some(action) = notification.action {
            println!("  {}: {}", action.label, NAME_COLOR.paint(action.url.as_str()));
        }
    }

    fn open_url(&self, url: &Url) {
        println!("  Branch: {}", NAME_COLOR.paint(url.as_str()));
    }
}
