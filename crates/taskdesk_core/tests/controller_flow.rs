use taskdesk_core::db::open_db_in_memory;
use taskdesk_core::{
    ActionOutcome, ActionWarning, SelectionError, SqliteTaskRepository, Task, TaskController,
    TaskCounts, TaskFilter, TaskValidationError, TaskView, UserAction,
};

#[derive(Default)]
struct ScreenView {
    filter: TaskFilter,
    rows: Vec<Task>,
    counts: TaskCounts,
    title_input: String,
    date_input: String,
    warnings: Vec<ActionWarning>,
}

impl TaskView for ScreenView {
    fn show_tasks(&mut self, filter: TaskFilter, tasks: &[Task], counts: TaskCounts) {
        self.filter = filter;
        self.rows = tasks.to_vec();
        self.counts = counts;
    }

    fn clear_inputs(&mut self) {
        self.title_input.clear();
        self.date_input.clear();
    }

    fn show_warning(&mut self, warning: &ActionWarning) {
        self.warnings.push(warning.clone());
    }
}

fn titles(view: &ScreenView) -> Vec<&str> {
    view.rows.iter().map(|task| task.title.as_str()).collect()
}

#[test]
fn add_scenario_renders_rows_in_due_date_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut controller = TaskController::new(repo, ScreenView::default());

    controller.view_mut().title_input = "Buy milk".to_string();
    controller.on_add("Buy milk", "2024-01-01").unwrap();
    controller.on_add("Pay rent", "").unwrap();

    let view = controller.view();
    assert_eq!(titles(view), vec!["Pay rent", "Buy milk"]);
    assert!(view.title_input.is_empty());
    assert_eq!(view.counts.total, 2);
}

#[test]
fn empty_title_adds_no_row_and_warns() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut controller = TaskController::new(repo, ScreenView::default());
    controller.view_mut().date_input = "2024-01-01".to_string();

    let outcome = controller.on_add("", "2024-01-01").unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Rejected(ActionWarning::Validation(TaskValidationError::EmptyTitle))
    );
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(controller.view().date_input, "2024-01-01");
}

#[test]
fn malformed_due_date_is_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut controller = TaskController::new(repo, ScreenView::default());

    let outcome = controller.on_add("Buy milk", "next friday").unwrap();

    assert!(matches!(
        outcome,
        ActionOutcome::Rejected(ActionWarning::Validation(
            TaskValidationError::InvalidDueDate(_)
        ))
    ));
    assert!(controller.view().rows.is_empty());
}

#[test]
fn complete_then_filter_pending_hides_task() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut controller = TaskController::new(repo, ScreenView::default());
    controller.on_add("Buy milk", "").unwrap();
    controller.on_add("Pay rent", "").unwrap();
    let milk = controller.view().rows[0].id;

    controller
        .dispatch(UserAction::Complete {
            selection: vec![milk],
        })
        .unwrap();
    controller
        .dispatch(UserAction::FilterChanged(TaskFilter::Pending))
        .unwrap();

    assert_eq!(controller.view().filter, TaskFilter::Pending);
    assert_eq!(titles(controller.view()), vec!["Pay rent"]);

    controller.on_filter_change(TaskFilter::Done).unwrap();
    assert_eq!(titles(controller.view()), vec!["Buy milk"]);
}

#[test]
fn mutations_refresh_under_current_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut controller = TaskController::new(repo, ScreenView::default());
    controller.on_filter_change(TaskFilter::Done).unwrap();

    controller.on_add("Buy milk", "").unwrap();

    assert!(controller.view().rows.is_empty());
    assert_eq!(controller.view().counts.pending, 1);
}

#[test]
fn edit_applies_to_first_selected_task_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut controller = TaskController::new(repo, ScreenView::default());
    controller.on_add("first", "").unwrap();
    controller.on_add("second", "").unwrap();
    let selection: Vec<_> = controller.view().rows.iter().map(|t| t.id).collect();

    controller
        .dispatch(UserAction::Edit {
            selection: selection.clone(),
            title: " renamed ".to_string(),
            due_date: "2024-02-02".to_string(),
        })
        .unwrap();

    let rows = &controller.view().rows;
    assert_eq!(rows.len(), 2);
    let renamed = rows.iter().find(|t| t.id == selection[0]).unwrap();
    assert_eq!(renamed.title, "renamed");
    assert_eq!(renamed.due_date, "2024-02-02");
    let untouched = rows.iter().find(|t| t.id == selection[1]).unwrap();
    assert_eq!(untouched.title, "second");
}

#[test]
fn delete_without_selection_warns_and_keeps_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut controller = TaskController::new(repo, ScreenView::default());
    controller.on_add("Buy milk", "").unwrap();

    let outcome = controller
        .dispatch(UserAction::Delete { selection: vec![] })
        .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Rejected(ActionWarning::Selection(SelectionError::NothingSelected))
    );
    assert_eq!(controller.view().rows.len(), 1);
    assert_eq!(controller.view().warnings.len(), 1);
}

#[test]
fn delete_selected_tasks_removes_all_of_them() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut controller = TaskController::new(repo, ScreenView::default());
    controller.on_add("a", "").unwrap();
    controller.on_add("b", "").unwrap();
    controller.on_add("c", "").unwrap();
    let selection: Vec<_> = controller.view().rows[..2].iter().map(|t| t.id).collect();

    controller.on_delete(&selection).unwrap();

    assert_eq!(titles(controller.view()), vec!["c"]);
}
