//! Shared UI components (status bar, message banner, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, format_action};
use crate::app::{ActiveTab, AppState, InputMode, StatusKind};

/// One form row: `▶ Label: value`.
pub fn field_line(label: &str, value: &str, focused: bool) -> String {
    let marker = if focused { "▶" } else { " " };
    let cursor = if focused { "_" } else { "" };
    format!("{marker} {label:<14} {value}{cursor}")
}

/// Render the outcome banner of the active tab, colored by [`StatusKind`].
pub fn render_message_banner(f: &mut Frame, area: Rect, app: &AppState) {
    let status = match app.active_tab {
        ActiveTab::Users => app.users.status(),
        ActiveTab::Register => app.register.status(),
    };
    let (text, color) = match status {
        Some(s) => {
            let color = match s.kind {
                StatusKind::Success => app.theme.success,
                StatusKind::Info => app.theme.info,
                StatusKind::Error => app.theme.error,
            };
            (s.text.clone(), color)
        }
        None => (String::new(), app.theme.border),
    };
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(color))
        .block(Block::default().title("Message").borders(Borders::ALL).border_style(Style::default().fg(color)));
    f.render_widget(p, area);
}

/// Render the bottom status bar with mode, pending state and counts.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Form => "FORM",
        InputMode::Modal => "MODAL",
    };
    let activity = if app.is_pending() { "  Loading..." } else { "" };
    let view = if app.users.is_searching() { "search results" } else { "all users" };
    let msg = format!(
        "mode: {mode}  users:{} ({view})  rows/page:{}{activity}",
        app.users.records().len(),
        app.rows_per_page,
    );
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect { x, y, width: width.min(area.width), height: height.min(area.height) }
}

/// Render the help dialog listing the active key bindings.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(40);
    let height = 22u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let section = |title: &str| Line::from(Span::styled(title.to_string(), Style::default().add_modifier(Modifier::BOLD)));
    let mut lines: Vec<Line> = vec![section("Key bindings (normal mode):")];
    for action in [
        KeyAction::SwitchTab,
        KeyAction::StartSearch,
        KeyAction::ClearSearch,
        KeyAction::Refresh,
        KeyAction::EnterAction,
        KeyAction::DeleteSelection,
        KeyAction::MoveUp,
        KeyAction::MoveDown,
        KeyAction::PageUp,
        KeyAction::PageDown,
        KeyAction::OpenHelp,
        KeyAction::Quit,
    ] {
        let keys = app.keymap.keys_for(action).join(", ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {:>16} │ ", format_action(action))),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(section("Forms and dialogs:"));
    lines.push(Line::raw("  Tab / Down, Shift+Tab / Up  move between fields"));
    lines.push(Line::raw("  Enter                       submit (edit dialog, Save row)"));
    lines.push(Line::raw("  Esc                         leave the form or close the dialog"));
    lines.push(Line::raw("  Empty fields in the edit dialog are left unchanged on the server"));

    let p = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().title("Help").borders(Borders::ALL).border_style(Style::default().fg(app.theme.border)));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
