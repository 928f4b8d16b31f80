//! Desktop notification sink backed by `notify-rust`.

use super::{NotificationSink, NotifyError};
use notify_rust::{Notification, Timeout};
use std::time::Duration;

const APP_NAME: &str = "taskdesk";

/// Sends notifications through the host OS notification service.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl NotificationSink for DesktopNotifier {
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Result<(), NotifyError> {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(message)
            .timeout(Timeout::Milliseconds(millis))
            .show()
            .map(|_| ())
            .map_err(|err| NotifyError(err.to_string()))
    }
}
