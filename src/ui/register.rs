use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, FormField, InputMode};
use crate::ui::components::field_line;

/// Render the registration form; the row after the last field is the submit button.
pub fn render_form(f: &mut Frame, area: Rect, app: &AppState) {
    let active = app.input_mode == InputMode::Form;
    let draft = app.register.draft();
    let values = [&draft.name, &draft.email, &draft.phone, &draft.age];

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Personal Information", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            "Use a permanent address where you can receive mail.",
            Style::default().fg(app.theme.muted),
        )),
        Line::raw(""),
    ];
    for (i, (field, value)) in FormField::ALL.iter().zip(values).enumerate() {
        lines.push(Line::raw(field_line(field.label(), value, active && i == app.register_field)));
    }
    lines.push(Line::raw(""));

    let submit_focused = active && app.register_field == FormField::ALL.len();
    let label = if app.is_pending() { "[ Saving... ]" } else { "[ Save ]" };
    let style = if submit_focused {
        Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(app.theme.text)
    };
    lines.push(Line::from(Span::styled(label, style)));
    if !active {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Press Enter to fill in the form, Esc to leave it",
            Style::default().fg(app.theme.muted),
        )));
    }

    let border = if active { app.theme.highlight_fg } else { app.theme.border };
    let p = Paragraph::new(lines).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Registration Form")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}
