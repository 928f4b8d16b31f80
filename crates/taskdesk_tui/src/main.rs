//! TaskDesk entry point.
//!
//! # Responsibility
//! - Load config, start logging, open the task store.
//! - Send the due-today reminder once, then hand control to the window.

mod app;
mod input;
mod render;

use log::{error, info, warn};
use std::error::Error;
use taskdesk_core::db::open_db;
use taskdesk_core::{
    core_version, init_logging, local_today, notify_due_today, AppConfig, DesktopNotifier,
    SqliteTaskRepository, TaskController,
};

use app::TuiView;

fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?.resolve()?;

    // The window still works without file logs
    if let Err(err) = init_logging(&config) {
        eprintln!("taskdesk: file logging disabled: {err}");
    }
    info!("event=app_start module=tui status=ok version={}", core_version());

    let conn = open_db(&config.database_path)?;
    let repo = SqliteTaskRepository::try_new(&conn)?;

    if let Err(err) = notify_due_today(
        &repo,
        &DesktopNotifier,
        local_today(),
        config.notification_timeout,
    ) {
        warn!("event=due_reminder module=tui status=error error={err}");
    }

    let mut controller = TaskController::new(repo, TuiView::new());
    controller.refresh()?;

    let result = app::run(&mut controller);
    if let Err(err) = &result {
        error!("event=app_exit module=tui status=error error={err}");
    }
    result
}
