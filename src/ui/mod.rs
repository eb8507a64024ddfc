pub mod components;
pub mod register;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{ActiveTab, AppState, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(f.area());

    let mut tabs: Vec<Span> = vec![Span::raw("BUE System   ")];
    for tab in [ActiveTab::Register, ActiveTab::Users] {
        let style = if tab == app.active_tab {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted)
        };
        tabs.push(Span::styled(format!("[{}]", tab.title()), style));
        tabs.push(Span::raw("  "));
    }
    tabs.push(Span::raw("Tab: switch; ?: help; q: quit"));
    let header = Paragraph::new(Line::from(tabs))
        .block(
            Block::default()
                .title("bue-admin")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(header, root[0]);

    match app.active_tab {
        ActiveTab::Users => {
            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(3)])
                .split(root[1]);
            users::render_search_bar(f, body[0], app);
            users::render_users_table(f, body[1], app);
        }
        ActiveTab::Register => register::render_form(f, root[1], app),
    }

    components::render_message_banner(f, root[2], app);
    components::render_status_bar(f, root[3], app);

    if let Some(modal) = app.modal.clone() {
        match modal {
            ModalState::EditUser { field } => users::render_edit_modal(f, f.area(), app, field),
            ModalState::DeleteConfirm { email, selected, .. } => {
                users::render_delete_modal(f, f.area(), app, &email, selected)
            }
            ModalState::Help { scroll } => components::render_help_modal(f, f.area(), app, scroll),
        }
    }
}
