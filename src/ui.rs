use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, PageStatus};
use crate::widgets::{command_line, UiColors};

/// Rows above the list: prompt, help label, status bar.
pub const HEADER_ROWS: u16 = 3;

const HELP_LABEL: &str =
    "Type to filter, UP/DOWN move, RET/TAB select, DEL remove, C-f favorite, ESC quit";

/// How many commands fit on one page of a terminal `rows` tall.
pub fn page_capacity(rows: u16) -> usize {
    rows.saturating_sub(HEADER_ROWS) as usize
}

/// Status bar text for the current page.
pub fn status_text(status: &PageStatus) -> String {
    format!(
        " - view:{} (C-/) - regex:{} (C-e) - case:{} (C-t) - page {}/{} -",
        status.view,
        if status.regex_mode { "on" } else { "off" },
        if status.case_sensitive {
            "sensitive"
        } else {
            "insensitive"
        },
        status.page,
        status.total_pages,
    )
}

/// Main render function called from the event loop.
pub fn render(frame: &mut Frame, app: &App) {
    let colors = UiColors::from_palette(&app.palette());
    let area = frame.area();

    // Top-level vertical layout:
    //   [search prompt]
    //   [help label / prompt / error]
    //   [status bar]
    //   [history page]
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new("").style(Style::default().bg(colors.bg)),
        area,
    );
    render_prompt(frame, app, outer[0], &colors);
    render_label(frame, app, outer[1], &colors);
    render_status(frame, app, outer[2], &colors);
    render_commands(frame, app, outer[3], &colors);
}

/// Render the search prompt with a trailing cursor.
fn render_prompt(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let line = Line::from(vec![
        Span::styled(">>> ", Style::default().fg(colors.accent)),
        Span::styled(
            app.search_text().to_string(),
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "▏",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help label, or the delete prompt / regex error in its place.
fn render_label(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let line = if let Some(command) = &app.pending_delete {
        Line::from(Span::styled(
            format!("Do you want to delete all occurrences of {command}? y/n"),
            Style::default()
                .fg(colors.bg)
                .bg(colors.error)
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some(message) = &app.filter_error {
        Line::from(Span::styled(
            message.clone(),
            Style::default()
                .fg(colors.error)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(HELP_LABEL, Style::default().fg(colors.muted)))
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar.
fn render_status(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let text = status_text(&app.current_page_status());
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(colors.text),
    )))
    .style(Style::default().bg(colors.bar_bg));
    frame.render_widget(paragraph, area);
}

/// Render the visible page of commands.
fn render_commands(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let width = area.width as usize;
    let selected = app.selected_index();
    let lines: Vec<Line> = app
        .current_page_commands()
        .iter()
        .enumerate()
        .map(|(i, command)| {
            command_line(
                command,
                i == selected,
                app.is_favorite(command),
                &app.matched_spans_for(command),
                width,
                colors,
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
