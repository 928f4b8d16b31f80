//! Drawing of the task window.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use taskdesk_core::{Task, TaskFilter};

use crate::app::{Focus, TuiView, Warning};

const DONE_COLOR: Color = Color::Rgb(0x5c, 0xb8, 0x5c);
const PENDING_COLOR: Color = Color::Rgb(0xf0, 0xad, 0x4e);
const SELECTED_BG: Color = Color::Rgb(0x33, 0x7a, 0xb7);
const FOCUS_COLOR: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;

const KEY_HINTS: &str =
    "Tab focus  Enter add  ^E/e edit  Space mark  c done  d delete  f filter  q quit";

/// Main render function
pub fn render(frame: &mut Frame, view: &TuiView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input fields
            Constraint::Min(3),    // task table
            Constraint::Length(1), // filter bar
            Constraint::Length(1), // status row
        ])
        .split(frame.area());

    render_inputs(frame, view, chunks[0]);
    render_table(frame, view, chunks[1]);
    render_filter_bar(frame, view, chunks[2]);
    render_status_row(frame, view, chunks[3]);

    if let Some(warning) = &view.warning {
        render_warning(frame, warning, frame.area());
    }
}

fn render_inputs(frame: &mut Frame, view: &TuiView, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let fields = [
        (Focus::Title, " Title ", view.title_input.as_str(), halves[0]),
        (
            Focus::DueDate,
            " Due date (YYYY-MM-DD) ",
            view.date_input.as_str(),
            halves[1],
        ),
    ];

    for (focus, label, text, rect) in fields {
        let focused = view.focus == focus && view.warning.is_none();
        let border_style = if focused {
            Style::default().fg(FOCUS_COLOR)
        } else {
            Style::default().fg(MUTED)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(label);
        frame.render_widget(Paragraph::new(text).block(block), rect);

        if focused {
            frame.set_cursor_position((input_cursor_x(rect, text), rect.y.saturating_add(1)));
        }
    }
}

/// Column just past the typed text, kept inside the field border
fn input_cursor_x(rect: Rect, text: &str) -> u16 {
    let typed = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    let max_x = rect.x.saturating_add(rect.width.saturating_sub(2));
    rect.x.saturating_add(1).saturating_add(typed).min(max_x)
}

fn render_table(frame: &mut Frame, view: &TuiView, area: Rect) {
    let header = Row::new(["", "#", "Title", "Due date", "Status"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|task| task_row(task, view.marked.contains(&task.id)))
        .collect();

    let border_style = if view.focus == Focus::List {
        Style::default().fg(FOCUS_COLOR)
    } else {
        Style::default().fg(MUTED)
    };
    let title = format!(" Tasks: {} ", filter_label(view.filter));
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(12),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    )
    .row_highlight_style(Style::default().bg(SELECTED_BG).fg(Color::White));

    let mut state = TableState::default().with_selected(view.cursor);
    frame.render_stateful_widget(table, area, &mut state);
}

fn task_row(task: &Task, marked: bool) -> Row<'static> {
    let (status, color) = if task.done {
        ("done", DONE_COLOR)
    } else {
        ("pending", PENDING_COLOR)
    };
    Row::new(vec![
        Cell::from(if marked { "\u{25cf}" } else { " " }),
        Cell::from(task.id.to_string()),
        Cell::from(task.title.clone()),
        Cell::from(task.due_date.clone()),
        Cell::from(status),
    ])
    .style(Style::default().fg(color))
}

fn render_filter_bar(frame: &mut Frame, view: &TuiView, area: Rect) {
    let mut spans = vec![Span::styled(" Filter: ", Style::default().fg(MUTED))];
    for (idx, filter) in TaskFilter::ALL.into_iter().enumerate() {
        let marker = if filter == view.filter { "(\u{2022})" } else { "( )" };
        let style = if filter == view.filter {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(
            format!("{marker} {} {}  ", idx + 1, filter_label(filter)),
            style,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_row(frame: &mut Frame, view: &TuiView, area: Rect) {
    let counts = view.counts;
    let text = format!(
        " {} tasks \u{b7} {} pending \u{b7} {} done   {KEY_HINTS}",
        counts.total, counts.pending, counts.done
    );
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(MUTED)),
        area,
    );
}

fn render_warning(frame: &mut Frame, warning: &Warning, area: Rect) {
    let popup = centered_rect(46, 7, area);
    let lines = vec![
        Line::from(""),
        Line::from(format!(" {}", warning.message)),
        Line::from(""),
        Line::from(Span::styled(
            " Press Enter to dismiss",
            Style::default().fg(MUTED),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PENDING_COLOR))
        .title(format!(" {} ", warning.heading));
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        popup,
    );
}

fn filter_label(filter: TaskFilter) -> &'static str {
    match filter {
        TaskFilter::All => "All",
        TaskFilter::Pending => "Pending",
        TaskFilter::Done => "Done",
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
