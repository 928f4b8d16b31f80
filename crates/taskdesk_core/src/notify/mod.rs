//! Startup reminder for tasks due today.
//!
//! # Responsibility
//! - Ask the store for today's pending tasks once per launch.
//! - Hand a single newline-joined reminder to the OS notification sink.
//!
//! # Invariants
//! - No notification is requested when nothing is due.
//! - Sink failures are logged and swallowed; they never abort startup.

mod desktop;

pub use desktop::DesktopNotifier;

use crate::repo::task_repo::{RepoResult, TaskRepository};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Headline of the startup reminder.
pub const REMINDER_TITLE: &str = "Today's tasks \u{1f552}";
/// Display timeout used when configuration does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivery failure reported by a notification sink.
#[derive(Debug)]
pub struct NotifyError(pub String);

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification delivery failed: {}", self.0)
    }
}

impl Error for NotifyError {}

/// OS notification collaborator.
pub trait NotificationSink {
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Result<(), NotifyError>;
}

/// Current local calendar day.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Sends one reminder listing every pending task due on `today`.
///
/// Returns the number of tasks listed in the reminder (`0` means no
/// notification was requested).
///
/// # Errors
/// - Repository errors propagate; sink errors do not.
pub fn notify_due_today<R, N>(
    repo: &R,
    sink: &N,
    today: NaiveDate,
    timeout: Duration,
) -> RepoResult<usize>
where
    R: TaskRepository + ?Sized,
    N: NotificationSink + ?Sized,
{
    let titles = repo.due_today(today)?;
    if titles.is_empty() {
        info!("event=due_reminder module=notify status=skipped due_count=0");
        return Ok(0);
    }

    let message = titles.join("\n");
    match sink.notify(REMINDER_TITLE, &message, timeout) {
        Ok(()) => info!(
            "event=due_reminder module=notify status=ok due_count={} timeout_s={}",
            titles.len(),
            timeout.as_secs()
        ),
        Err(err) => warn!(
            "event=due_reminder module=notify status=error due_count={} error={}",
            titles.len(),
            err
        ),
    }
    Ok(titles.len())
}
