//! Key handling: translate key presses into view edits or controller actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskdesk_core::{TaskFilter, UserAction};

use crate::app::{Focus, TuiView};

/// Handle one key press. Returns an action for the controller when the key
/// is a task gesture; view-only keys are applied in place.
pub fn handle_key(view: &mut TuiView, key: KeyEvent) -> Option<UserAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        view.should_quit = true;
        return None;
    }

    // Modal dialog swallows everything but dismissal
    if view.warning.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            view.warning = None;
        }
        return None;
    }

    match key.code {
        KeyCode::Tab => {
            view.focus_next();
            return None;
        }
        KeyCode::BackTab => {
            view.focus_prev();
            return None;
        }
        KeyCode::Char('e') if ctrl => return Some(edit_action(view)),
        _ => {}
    }

    match view.focus {
        Focus::Title | Focus::DueDate => handle_input_key(view, key, ctrl),
        Focus::List => handle_list_key(view, key),
    }
}

fn handle_input_key(view: &mut TuiView, key: KeyEvent, ctrl: bool) -> Option<UserAction> {
    match key.code {
        KeyCode::Enter => Some(UserAction::Add {
            title: view.title_input.clone(),
            due_date: view.date_input.clone(),
        }),
        KeyCode::Esc => {
            view.focus = Focus::List;
            None
        }
        KeyCode::Backspace => {
            if let Some(field) = view.active_input_mut() {
                field.pop();
            }
            None
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(field) = view.active_input_mut() {
                field.push(c);
            }
            None
        }
        _ => None,
    }
}

fn handle_list_key(view: &mut TuiView, key: KeyEvent) -> Option<UserAction> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view.move_cursor(-1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view.move_cursor(1);
            None
        }
        KeyCode::Char(' ') => {
            view.toggle_mark();
            None
        }
        KeyCode::Char('a') | KeyCode::Char('i') => {
            view.focus = Focus::Title;
            None
        }
        KeyCode::Char('e') => Some(edit_action(view)),
        KeyCode::Char('c') => Some(UserAction::Complete {
            selection: view.selection(),
        }),
        KeyCode::Char('d') | KeyCode::Delete => Some(UserAction::Delete {
            selection: view.selection(),
        }),
        KeyCode::Char('f') => Some(UserAction::FilterChanged(view.filter.next())),
        KeyCode::Char('1') => Some(UserAction::FilterChanged(TaskFilter::All)),
        KeyCode::Char('2') => Some(UserAction::FilterChanged(TaskFilter::Pending)),
        KeyCode::Char('3') => Some(UserAction::FilterChanged(TaskFilter::Done)),
        KeyCode::Char('q') | KeyCode::Esc => {
            view.should_quit = true;
            None
        }
        _ => None,
    }
}

fn edit_action(view: &TuiView) -> UserAction {
    UserAction::Edit {
        selection: view.selection(),
        title: view.title_input.clone(),
        due_date: view.date_input.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::handle_key;
    use crate::app::{Focus, TuiView, Warning};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use taskdesk_core::{Task, TaskCounts, TaskFilter, TaskView, UserAction};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(view: &mut TuiView, text: &str) {
        for c in text.chars() {
            assert_eq!(handle_key(view, press(KeyCode::Char(c))), None);
        }
    }

    fn list_view() -> TuiView {
        let mut view = TuiView::new();
        let rows = [1, 2].map(|id| Task {
            id,
            title: format!("task {id}"),
            due_date: String::new(),
            done: false,
        });
        view.show_tasks(TaskFilter::All, &rows, TaskCounts::default());
        view.focus = Focus::List;
        view
    }

    #[test]
    fn typing_then_enter_emits_add() {
        let mut view = TuiView::new();
        type_text(&mut view, "Buy milkk");
        handle_key(&mut view, press(KeyCode::Backspace));
        handle_key(&mut view, press(KeyCode::Tab));
        type_text(&mut view, "2024-01-01");

        let action = handle_key(&mut view, press(KeyCode::Enter));

        assert_eq!(
            action,
            Some(UserAction::Add {
                title: "Buy milk".to_string(),
                due_date: "2024-01-01".to_string(),
            })
        );
    }

    #[test]
    fn list_letters_are_commands_not_text() {
        let mut view = list_view();
        handle_key(&mut view, press(KeyCode::Down));
        let action = handle_key(&mut view, press(KeyCode::Char('c')));

        assert_eq!(action, Some(UserAction::Complete { selection: vec![1] }));
        assert!(view.title_input.is_empty());
    }

    #[test]
    fn delete_without_cursor_emits_empty_selection() {
        let mut view = list_view();
        let action = handle_key(&mut view, press(KeyCode::Char('d')));
        assert_eq!(action, Some(UserAction::Delete { selection: vec![] }));
    }

    #[test]
    fn ctrl_e_edits_from_input_field() {
        let mut view = list_view();
        handle_key(&mut view, press(KeyCode::Down));
        handle_key(&mut view, press(KeyCode::Down));
        handle_key(&mut view, press(KeyCode::Char('a')));
        type_text(&mut view, "Renamed");

        let action = handle_key(&mut view, ctrl('e'));

        assert_eq!(
            action,
            Some(UserAction::Edit {
                selection: vec![2],
                title: "Renamed".to_string(),
                due_date: String::new(),
            })
        );
    }

    #[test]
    fn filter_keys_cycle_and_pick() {
        let mut view = list_view();
        assert_eq!(
            handle_key(&mut view, press(KeyCode::Char('f'))),
            Some(UserAction::FilterChanged(TaskFilter::Pending))
        );
        assert_eq!(
            handle_key(&mut view, press(KeyCode::Char('3'))),
            Some(UserAction::FilterChanged(TaskFilter::Done))
        );
    }

    #[test]
    fn warning_blocks_input_until_dismissed() {
        let mut view = list_view();
        view.warning = Some(Warning {
            heading: "Nothing selected".to_string(),
            message: "No task is selected".to_string(),
        });

        assert_eq!(handle_key(&mut view, press(KeyCode::Char('d'))), None);
        assert!(view.warning.is_some());
        assert_eq!(handle_key(&mut view, press(KeyCode::Enter)), None);
        assert!(view.warning.is_none());
        assert!(!view.should_quit);
    }

    #[test]
    fn quit_keys() {
        let mut view = list_view();
        handle_key(&mut view, press(KeyCode::Char('q')));
        assert!(view.should_quit);

        let mut view = TuiView::new();
        handle_key(&mut view, ctrl('c'));
        assert!(view.should_quit);
    }

    #[test]
    fn esc_in_input_moves_to_list() {
        let mut view = TuiView::new();
        handle_key(&mut view, press(KeyCode::Esc));
        assert_eq!(view.focus, Focus::List);
        assert!(!view.should_quit);
    }
}
