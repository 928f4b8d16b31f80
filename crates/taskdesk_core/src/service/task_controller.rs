//! Task controller: user actions in, store mutations and view refreshes out.
//!
//! # Responsibility
//! - Validate raw input from the view before it reaches storage.
//! - Apply add/edit/complete/delete/filter actions through the repository.
//! - Refresh the view under the current filter after every applied action.
//!
//! # Invariants
//! - A rejected action (validation or selection) performs no mutation and
//!   no refresh; the view only receives a warning.
//! - Repository errors are returned to the caller untouched.
//! - Edit targets the first id of the selection only.

use crate::model::task::{Task, TaskCounts, TaskFilter, TaskId, TaskInput, TaskValidationError};
use crate::repo::task_repo::{RepoResult, TaskRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Action needs at least one selected task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    NothingSelected,
}

impl Display for SelectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingSelected => write!(f, "no task is selected"),
        }
    }
}

impl Error for SelectionError {}

/// Recoverable rejection surfaced to the user as a blocking dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionWarning {
    Validation(TaskValidationError),
    Selection(SelectionError),
}

impl ActionWarning {
    /// Short dialog heading.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid input",
            Self::Selection(_) => "Nothing selected",
        }
    }
}

impl Display for ActionWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Selection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ActionWarning {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Selection(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for ActionWarning {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SelectionError> for ActionWarning {
    fn from(value: SelectionError) -> Self {
        Self::Selection(value)
    }
}

/// Result of a controller action that did not hit a storage error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Mutation (if any) applied and view refreshed.
    Applied,
    /// Rejected before reaching storage; warning already shown.
    Rejected(ActionWarning),
}

/// Gesture emitted by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Add {
        title: String,
        due_date: String,
    },
    Edit {
        selection: Vec<TaskId>,
        title: String,
        due_date: String,
    },
    Complete {
        selection: Vec<TaskId>,
    },
    Delete {
        selection: Vec<TaskId>,
    },
    FilterChanged(TaskFilter),
}

/// Presentation surface driven by the controller.
pub trait TaskView {
    /// Replaces the rendered rows with the latest query result.
    fn show_tasks(&mut self, filter: TaskFilter, tasks: &[Task], counts: TaskCounts);
    /// Empties the title and due-date input fields.
    fn clear_inputs(&mut self);
    /// Shows a blocking warning dialog.
    fn show_warning(&mut self, warning: &ActionWarning);
}

/// Mediates between view gestures and the task repository.
pub struct TaskController<R: TaskRepository, V: TaskView> {
    repo: R,
    view: V,
    filter: TaskFilter,
}

impl<R: TaskRepository, V: TaskView> TaskController<R, V> {
    /// Creates a controller with the `all` filter. Does not render.
    pub fn new(repo: R, view: V) -> Self {
        Self {
            repo,
            view,
            filter: TaskFilter::default(),
        }
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Routes a view gesture to the matching action.
    pub fn dispatch(&mut self, action: UserAction) -> RepoResult<ActionOutcome> {
        match action {
            UserAction::Add { title, due_date } => self.on_add(&title, &due_date),
            UserAction::Edit {
                selection,
                title,
                due_date,
            } => self.on_edit(&selection, &title, &due_date),
            UserAction::Complete { selection } => self.on_complete(&selection),
            UserAction::Delete { selection } => self.on_delete(&selection),
            UserAction::FilterChanged(filter) => self.on_filter_change(filter),
        }
    }

    /// Adds a pending task from raw input.
    pub fn on_add(&mut self, title: &str, due_date: &str) -> RepoResult<ActionOutcome> {
        let input = match TaskInput::parse(title, due_date) {
            Ok(input) => input,
            Err(err) => return Ok(self.reject("add", err.into())),
        };

        let id = self.repo.create_task(&input.title, &input.due_date)?;
        info!("event=task_add module=controller status=ok task_id={id}");
        self.view.clear_inputs();
        self.refresh()?;
        Ok(ActionOutcome::Applied)
    }

    /// Overwrites title and due date of the first selected task.
    pub fn on_edit(
        &mut self,
        selection: &[TaskId],
        title: &str,
        due_date: &str,
    ) -> RepoResult<ActionOutcome> {
        let Some(&target) = selection.first() else {
            return Ok(self.reject("edit", SelectionError::NothingSelected.into()));
        };
        let input = match TaskInput::parse(title, due_date) {
            Ok(input) => input,
            Err(err) => return Ok(self.reject("edit", err.into())),
        };

        self.repo
            .update_task(target, &input.title, &input.due_date)?;
        info!(
            "event=task_edit module=controller status=ok task_id={target} selected={}",
            selection.len()
        );
        self.view.clear_inputs();
        self.refresh()?;
        Ok(ActionOutcome::Applied)
    }

    /// Marks every selected task done.
    pub fn on_complete(&mut self, selection: &[TaskId]) -> RepoResult<ActionOutcome> {
        if selection.is_empty() {
            return Ok(self.reject("complete", SelectionError::NothingSelected.into()));
        }

        let changed = self.repo.mark_done(selection)?;
        info!(
            "event=task_complete module=controller status=ok selected={} changed={changed}",
            selection.len()
        );
        self.refresh()?;
        Ok(ActionOutcome::Applied)
    }

    /// Deletes every selected task.
    pub fn on_delete(&mut self, selection: &[TaskId]) -> RepoResult<ActionOutcome> {
        if selection.is_empty() {
            return Ok(self.reject("delete", SelectionError::NothingSelected.into()));
        }

        let removed = self.repo.delete_tasks(selection)?;
        info!(
            "event=task_delete module=controller status=ok selected={} removed={removed}",
            selection.len()
        );
        self.refresh()?;
        Ok(ActionOutcome::Applied)
    }

    /// Switches the active filter and re-renders.
    pub fn on_filter_change(&mut self, filter: TaskFilter) -> RepoResult<ActionOutcome> {
        self.filter = filter;
        self.refresh()?;
        Ok(ActionOutcome::Applied)
    }

    /// Re-queries the store under the current filter and pushes rows to the view.
    pub fn refresh(&mut self) -> RepoResult<()> {
        let tasks = self.repo.list_tasks(self.filter)?;
        let counts = self.repo.counts()?;
        self.view.show_tasks(self.filter, &tasks, counts);
        Ok(())
    }

    fn reject(&mut self, action: &'static str, warning: ActionWarning) -> ActionOutcome {
        warn!("event=task_{action} module=controller status=rejected reason={warning}");
        self.view.show_warning(&warning);
        ActionOutcome::Rejected(warning)
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionOutcome, ActionWarning, SelectionError, TaskController, TaskView};
    use crate::model::task::{Task, TaskCounts, TaskFilter, TaskId, TaskValidationError};
    use crate::repo::task_repo::{RepoResult, TaskRepository};
    use chrono::NaiveDate;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingRepo {
        calls: RefCell<Vec<String>>,
    }

    impl TaskRepository for RecordingRepo {
        fn list_tasks(&self, filter: TaskFilter) -> RepoResult<Vec<Task>> {
            self.calls.borrow_mut().push(format!("list:{filter}"));
            Ok(Vec::new())
        }

        fn create_task(&self, title: &str, due_date: &str) -> RepoResult<TaskId> {
            self.calls
                .borrow_mut()
                .push(format!("create:{title}:{due_date}"));
            Ok(1)
        }

        fn update_task(&self, id: TaskId, title: &str, due_date: &str) -> RepoResult<()> {
            self.calls
                .borrow_mut()
                .push(format!("update:{id}:{title}:{due_date}"));
            Ok(())
        }

        fn mark_done(&self, ids: &[TaskId]) -> RepoResult<usize> {
            self.calls.borrow_mut().push(format!("done:{ids:?}"));
            Ok(ids.len())
        }

        fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize> {
            self.calls.borrow_mut().push(format!("delete:{ids:?}"));
            Ok(ids.len())
        }

        fn due_today(&self, _today: NaiveDate) -> RepoResult<Vec<String>> {
            Ok(Vec::new())
        }

        fn counts(&self) -> RepoResult<TaskCounts> {
            Ok(TaskCounts::default())
        }
    }

    #[derive(Default)]
    struct RecordingView {
        refreshes: Vec<TaskFilter>,
        cleared: usize,
        warnings: Vec<ActionWarning>,
    }

    impl TaskView for RecordingView {
        fn show_tasks(&mut self, filter: TaskFilter, _tasks: &[Task], _counts: TaskCounts) {
            self.refreshes.push(filter);
        }

        fn clear_inputs(&mut self) {
            self.cleared += 1;
        }

        fn show_warning(&mut self, warning: &ActionWarning) {
            self.warnings.push(warning.clone());
        }
    }

    fn controller() -> TaskController<RecordingRepo, RecordingView> {
        TaskController::new(RecordingRepo::default(), RecordingView::default())
    }

    #[test]
    fn add_trims_input_then_clears_and_refreshes() {
        let mut controller = controller();
        let outcome = controller.on_add("  Buy milk ", " 2024-01-01").unwrap();

        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(
            *controller.repo().calls.borrow(),
            vec!["create:Buy milk:2024-01-01", "list:all"]
        );
        assert_eq!(controller.view().cleared, 1);
        assert_eq!(controller.view().refreshes, vec![TaskFilter::All]);
    }

    #[test]
    fn blank_title_never_reaches_store() {
        let mut controller = controller();
        let outcome = controller.on_add("   ", "").unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Rejected(ActionWarning::Validation(TaskValidationError::EmptyTitle))
        );
        assert!(controller.repo().calls.borrow().is_empty());
        assert_eq!(controller.view().warnings.len(), 1);
        assert_eq!(controller.view().cleared, 0);
        assert!(controller.view().refreshes.is_empty());
    }

    #[test]
    fn edit_checks_selection_before_title() {
        let mut controller = controller();
        let outcome = controller.on_edit(&[], "", "").unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Rejected(ActionWarning::Selection(SelectionError::NothingSelected))
        );
    }

    #[test]
    fn edit_targets_first_selected_only() {
        let mut controller = controller();
        controller.on_edit(&[7, 3], "Renamed", "").unwrap();
        assert_eq!(controller.repo().calls.borrow()[0], "update:7:Renamed:");
    }

    #[test]
    fn complete_and_delete_require_selection() {
        let mut controller = controller();
        assert!(matches!(
            controller.on_complete(&[]).unwrap(),
            ActionOutcome::Rejected(ActionWarning::Selection(_))
        ));
        assert!(matches!(
            controller.on_delete(&[]).unwrap(),
            ActionOutcome::Rejected(ActionWarning::Selection(_))
        ));
        assert!(controller.repo().calls.borrow().is_empty());
        assert_eq!(controller.view().warnings.len(), 2);
    }

    #[test]
    fn refresh_uses_current_filter_after_change() {
        let mut controller = controller();
        controller.on_filter_change(TaskFilter::Done).unwrap();
        controller.on_complete(&[1, 2]).unwrap();

        assert_eq!(controller.filter(), TaskFilter::Done);
        assert_eq!(
            controller.view().refreshes,
            vec![TaskFilter::Done, TaskFilter::Done]
        );
        assert!(controller
            .repo()
            .calls
            .borrow()
            .contains(&"done:[1, 2]".to_string()));
    }
}
