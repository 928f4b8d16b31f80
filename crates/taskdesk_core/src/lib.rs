//! Core domain logic for TaskDesk.
//! This crate owns the task store, the controller and the startup reminder;
//! presentation crates only implement `TaskView`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, ResolvedConfig};
pub use logging::{init_logging, LoggingError};
pub use model::task::{Task, TaskCounts, TaskFilter, TaskId, TaskInput, TaskValidationError};
pub use notify::{
    local_today, notify_due_today, DesktopNotifier, NotificationSink, NotifyError,
};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::task_controller::{
    ActionOutcome, ActionWarning, SelectionError, TaskController, TaskView, UserAction,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
