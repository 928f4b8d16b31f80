//! Terminal window state and event loop.
//!
//! `TuiView` is the presentation half of the controller pair: it keeps the
//! transient rendering of the last query, the input fields and the marks.

use std::collections::HashSet;
use std::error::Error;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::{error, info};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use taskdesk_core::{
    ActionWarning, RepoError, Task, TaskController, TaskCounts, TaskFilter, TaskId, TaskRepository,
    TaskView, UserAction,
};

use crate::input;
use crate::render;

/// Which widget receives typed keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Title,
    DueDate,
    List,
}

/// Modal dialog contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub heading: String,
    pub message: String,
}

/// Presentation state for the task window
#[derive(Debug)]
pub struct TuiView {
    pub title_input: String,
    pub date_input: String,
    pub focus: Focus,
    /// Filter of the rows currently shown
    pub filter: TaskFilter,
    pub rows: Vec<Task>,
    pub counts: TaskCounts,
    /// Index into `rows`; `None` until the user moves into the list
    pub cursor: Option<usize>,
    /// Ids explicitly marked with Space
    pub marked: HashSet<TaskId>,
    pub warning: Option<Warning>,
    pub should_quit: bool,
}

impl Default for TuiView {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiView {
    pub fn new() -> Self {
        TuiView {
            title_input: String::new(),
            date_input: String::new(),
            focus: Focus::Title,
            filter: TaskFilter::default(),
            rows: Vec::new(),
            counts: TaskCounts::default(),
            cursor: None,
            marked: HashSet::new(),
            warning: None,
            should_quit: false,
        }
    }

    /// Operand for complete/delete/edit.
    ///
    /// Marked rows in display order when any are marked, else the cursor row.
    pub fn selection(&self) -> Vec<TaskId> {
        if !self.marked.is_empty() {
            return self
                .rows
                .iter()
                .filter(|task| self.marked.contains(&task.id))
                .map(|task| task.id)
                .collect();
        }
        self.cursor
            .and_then(|idx| self.rows.get(idx))
            .map(|task| vec![task.id])
            .unwrap_or_default()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.cursor = None;
            return;
        }
        let last = self.rows.len() - 1;
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(idx) => idx.saturating_add_signed(delta).min(last),
        });
    }

    /// Toggle the mark on the cursor row
    pub fn toggle_mark(&mut self) {
        if self.cursor.is_none() {
            self.move_cursor(0);
        }
        let Some(task) = self.cursor.and_then(|idx| self.rows.get(idx)) else {
            return;
        };
        let id = task.id;
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Title => Focus::DueDate,
            Focus::DueDate => Focus::List,
            Focus::List => Focus::Title,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Focus::Title => Focus::List,
            Focus::DueDate => Focus::Title,
            Focus::List => Focus::DueDate,
        };
    }

    pub fn show_storage_error(&mut self, err: &RepoError) {
        self.warning = Some(Warning {
            heading: "Storage error".to_string(),
            message: capitalize(&err.to_string()),
        });
    }

    /// The input field that has focus, if any
    pub fn active_input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Title => Some(&mut self.title_input),
            Focus::DueDate => Some(&mut self.date_input),
            Focus::List => None,
        }
    }
}

impl TaskView for TuiView {
    fn show_tasks(&mut self, filter: TaskFilter, tasks: &[Task], counts: TaskCounts) {
        self.filter = filter;
        self.rows = tasks.to_vec();
        self.counts = counts;
        self.marked.clear();
        self.cursor = match self.cursor {
            _ if self.rows.is_empty() => None,
            Some(idx) => Some(idx.min(self.rows.len() - 1)),
            None => None,
        };
    }

    fn clear_inputs(&mut self) {
        self.title_input.clear();
        self.date_input.clear();
    }

    fn show_warning(&mut self, warning: &ActionWarning) {
        self.warning = Some(Warning {
            heading: warning.heading().to_string(),
            message: capitalize(&warning.to_string()),
        });
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Puts the terminal back in cooked mode on the main screen when dropped
struct TerminalGuard {
    restore: fn(),
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard {
            restore: restore_terminal,
        };
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the task window until the user quits.
///
/// The terminal is restored on every exit path.
pub fn run<R: TaskRepository>(
    controller: &mut TaskController<R, TuiView>,
) -> Result<(), Box<dyn Error>> {
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    // Restore the terminal before the default hook prints the panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    info!("event=ui_start module=tui status=ok");
    let result = run_event_loop(&mut terminal, controller);

    drop(guard);
    terminal.show_cursor()?;

    match &result {
        Ok(()) => info!("event=ui_stop module=tui status=ok"),
        Err(err) => error!("event=ui_stop module=tui status=error error={err}"),
    }
    result
}

fn run_event_loop<R: TaskRepository>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut TaskController<R, TuiView>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, controller.view()))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = input::handle_key(controller.view_mut(), key) {
                        apply_action(controller, action);
                    }
                }
            }
        }

        if controller.view().should_quit {
            return Ok(());
        }
    }
}

/// Dispatch one action. A store failure ends that action only; the window
/// stays open with the typed input intact and shows the error.
pub fn apply_action<R: TaskRepository>(
    controller: &mut TaskController<R, TuiView>,
    action: UserAction,
) {
    if let Err(err) = controller.dispatch(action) {
        error!("event=task_action module=tui status=error error={err}");
        controller.view_mut().show_storage_error(&err);
    }
}
