//! Users table screen: search bar, table, edit and delete dialogs.
//!
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use crate::app::users::delete_prompt;
use crate::app::{AppState, FormField, InputMode};
use crate::ui::components::{centered_rect, field_line};

pub fn render_search_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let editing = app.input_mode == InputMode::Search;
    let query = app.users.query();
    let text = if query.is_empty() && !editing {
        "Search by email... (/ to type, Enter to search, c to clear)".to_string()
    } else if editing {
        format!("{query}_")
    } else {
        query.to_string()
    };
    let border = if editing { app.theme.highlight_fg } else { app.theme.border };
    let style = if query.is_empty() && !editing { app.theme.muted } else { app.theme.text };
    let p = Paragraph::new(text).style(Style::default().fg(style)).block(
        Block::default().title("Search").borders(Borders::ALL).border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let records = app.users.records();
    let start = (app.selected_user_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(records.len());
    let slice = records.get(start..end).unwrap_or_default();

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.selected_user_index {
            Style::default().fg(app.theme.highlight_fg).bg(app.theme.highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(u.id.to_string()),
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            Cell::from(u.phone.clone().unwrap_or_else(|| "-".to_string())),
            Cell::from(u.age.to_string()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(25),
        Constraint::Percentage(35),
        Constraint::Percentage(20),
        Constraint::Length(5),
    ];
    let header = Row::new(vec!["ID", "NAME", "EMAIL", "PHONE", "AGE"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let title = if app.users.is_searching() {
        format!("Search results ({})", records.len())
    } else {
        format!("Users List ({})", records.len())
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(Style::default().fg(app.theme.border)))
        .column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_edit_modal(f: &mut Frame, area: Rect, app: &AppState, focused: usize) {
    let rect = centered_rect(60, 10, area);
    let draft = app.users.edit_draft();
    let id = app.users.editing().map(|u| u.id).unwrap_or_default();
    let values = [&draft.name, &draft.email, &draft.phone, &draft.age];
    let mut lines: Vec<String> = FormField::ALL
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (field, value))| field_line(field.label(), value, i == focused))
        .collect();
    lines.push(String::new());
    let hint = if app.is_pending() { "Updating..." } else { "Enter: update  Tab: next field  Esc: cancel" };
    lines.push(hint.to_string());

    let p = Paragraph::new(lines.join("\n")).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title(format!("Edit User #{id}"))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn render_delete_modal(f: &mut Frame, area: Rect, app: &AppState, email: &str, selected: usize) {
    let rect = centered_rect(60, 7, area);
    let yes = if selected == 0 { "[Yes]" } else { " Yes " };
    let no = if selected == 1 { "[No]" } else { " No " };
    let body = format!("{}\n\n  {yes}    {no}", delete_prompt(email));
    let p = Paragraph::new(body)
        .wrap(ratatui::widgets::Wrap { trim: false })
        .block(
            Block::default()
                .title("Confirm delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.error)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
