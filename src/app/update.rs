use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{UserApi, UserService};
use crate::app::keymap::KeyAction;
use crate::app::{ActiveTab, AppState, FormField, InputMode, Keymap, ModalState, OpOutcome, Theme};
use crate::config::Settings;
use crate::ui;

/// Work the key handler asks the loop to run against a controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Refresh,
    Search(String),
    ClearSearch,
    /// Issued only after the confirm dialog was answered with yes.
    Delete { id: i64, email: String },
    SubmitEdit,
    Register,
}

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    shutdown: CancellationToken,
) -> Result<()> {
    let api: Arc<dyn UserApi> = Arc::new(UserService::new(settings).context("build user service")?);
    let theme = Theme::load_or_init(&settings.theme_path);
    let keymap = Keymap::load_or_init(&settings.keymap_path);
    let mut app = AppState::new(api, theme, keymap, &shutdown);
    info!(base_url = %settings.base_url, "client started");

    let mut events = EventStream::new();
    run_command(terminal, &mut app, &mut events, &shutdown, Command::Refresh).await?;

    loop {
        terminal.draw(|f| ui::render(f, &mut app))?;

        let key = tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => key,
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Err(err).context("read terminal event"),
                None => break,
            },
        };
        match handle_key(&mut app, key) {
            Some(Command::Quit) => break,
            Some(cmd) => {
                let outcome = run_command(terminal, &mut app, &mut events, &shutdown, cmd).await?;
                if outcome == OpOutcome::Cancelled {
                    break;
                }
            }
            None => {}
        }
    }

    app.users.shutdown();
    app.register.shutdown();
    Ok(())
}

/// Draw a loading frame, then await the command.
///
/// Keys are still read while the request runs. A quit key cancels `shutdown`,
/// which aborts the request; every other key is discarded.
async fn run_command(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut AppState,
    events: &mut EventStream,
    shutdown: &CancellationToken,
    cmd: Command,
) -> Result<OpOutcome> {
    app.in_flight = true;
    terminal.draw(|f| ui::render(f, app))?;
    let keymap = app.keymap.clone();

    let outcome = {
        let op = dispatch(app, cmd);
        tokio::pin!(op);
        loop {
            tokio::select! {
                outcome = &mut op => break outcome,
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        if is_quit(&keymap, &event) {
                            info!("quit requested while a request was in flight");
                            shutdown.cancel();
                        }
                    }
                    Some(Err(err)) => return Err(err).context("read terminal event"),
                    None => break (&mut op).await,
                },
            }
        }
    };
    app.in_flight = false;
    Ok(outcome)
}

/// Whether `event` is a key press bound to [`KeyAction::Quit`].
fn is_quit(keymap: &Keymap, event: &Event) -> bool {
    match event {
        Event::Key(key) => key.kind == KeyEventKind::Press && keymap.resolve(key) == Some(KeyAction::Quit),
        _ => false,
    }
}

/// Run one command against the owning controller and fix up view state afterwards.
pub async fn dispatch(app: &mut AppState, cmd: Command) -> OpOutcome {
    debug!(?cmd, "dispatch");
    let outcome = match cmd {
        Command::Quit => OpOutcome::Skipped,
        Command::Refresh => app.users.refresh().await,
        Command::Search(query) => app.users.search(&query).await,
        Command::ClearSearch => app.users.clear_search().await,
        Command::Delete { id, email } => {
            // Answered in the confirm dialog.
            app.users.delete_one(id, &email, |_| true).await
        }
        Command::SubmitEdit => {
            let outcome = app.users.submit_edit().await;
            if app.users.editing().is_none() {
                close_modal(app);
            }
            outcome
        }
        Command::Register => {
            let outcome = app.register.submit().await;
            if outcome == OpOutcome::Succeeded {
                app.register_field = 0;
            }
            outcome
        }
    };
    app.clamp_selection();
    outcome
}

/// Translate a key press into state changes and, possibly, a command to run.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Option<Command> {
    match app.input_mode {
        InputMode::Modal => handle_modal_key(app, key.code),
        InputMode::Search => handle_search_key(app, key.code),
        InputMode::Form => handle_form_key(app, key.code),
        InputMode::Normal => handle_normal_key(app, &key),
    }
}

fn handle_normal_key(app: &mut AppState, key: &KeyEvent) -> Option<Command> {
    let action = app.keymap.resolve(key)?;
    let users_tab = app.active_tab == ActiveTab::Users;
    match action {
        KeyAction::Quit => return Some(Command::Quit),
        KeyAction::OpenHelp => open_modal(app, ModalState::Help { scroll: 0 }),
        KeyAction::SwitchTab => {
            app.active_tab = match app.active_tab {
                ActiveTab::Users => ActiveTab::Register,
                ActiveTab::Register => ActiveTab::Users,
            };
        }
        KeyAction::StartSearch if users_tab => app.input_mode = InputMode::Search,
        KeyAction::ClearSearch if users_tab => return Some(Command::ClearSearch),
        KeyAction::Refresh if users_tab => return Some(Command::Refresh),
        KeyAction::EnterAction => match app.active_tab {
            ActiveTab::Users => {
                if let Some(user) = app.users.records().get(app.selected_user_index).cloned() {
                    app.users.open_edit(&user);
                    open_modal(app, ModalState::EditUser { field: 0 });
                }
            }
            ActiveTab::Register => app.input_mode = InputMode::Form,
        },
        KeyAction::DeleteSelection if users_tab => {
            if let Some(user) = app.users.records().get(app.selected_user_index) {
                let modal = ModalState::DeleteConfirm { id: user.id, email: user.email.clone(), selected: 1 };
                open_modal(app, modal);
            }
        }
        KeyAction::MoveUp if users_tab => {
            app.selected_user_index = app.selected_user_index.saturating_sub(1);
        }
        KeyAction::MoveDown if users_tab => {
            if app.selected_user_index + 1 < app.users.records().len() {
                app.selected_user_index += 1;
            }
        }
        KeyAction::PageUp if users_tab => {
            app.selected_user_index = app.selected_user_index.saturating_sub(app.rows_per_page.max(1));
        }
        KeyAction::PageDown if users_tab => {
            app.selected_user_index = app.selected_user_index.saturating_add(app.rows_per_page.max(1));
            app.clamp_selection();
        }
        _ => {}
    }
    None
}

fn handle_search_key(app: &mut AppState, code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            return Some(Command::Search(app.users.query().to_string()));
        }
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.users.query_mut().pop();
        }
        KeyCode::Char(c) if !c.is_control() => app.users.query_mut().push(c),
        _ => {}
    }
    None
}

fn handle_form_key(app: &mut AppState, code: KeyCode) -> Option<Command> {
    let rows = FormField::ALL.len() + 1;
    match code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab | KeyCode::Down => app.register_field = (app.register_field + 1) % rows,
        KeyCode::BackTab | KeyCode::Up => app.register_field = (app.register_field + rows - 1) % rows,
        KeyCode::Enter => {
            if FormField::from_index(app.register_field).is_none() {
                return Some(Command::Register);
            }
            app.register_field += 1;
        }
        KeyCode::Backspace => {
            if let Some(field) = FormField::from_index(app.register_field) {
                draft_field(app.register.draft_mut(), field).pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = FormField::from_index(app.register_field) {
                if field.accepts(c) {
                    draft_field(app.register.draft_mut(), field).push(c);
                }
            }
        }
        _ => {}
    }
    None
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) -> Option<Command> {
    match &mut app.modal {
        Some(ModalState::EditUser { field }) => {
            let count = FormField::ALL.len();
            match code {
                KeyCode::Esc => {
                    app.users.close_edit();
                    close_modal(app);
                }
                KeyCode::Tab | KeyCode::Down => *field = (*field + 1) % count,
                KeyCode::BackTab | KeyCode::Up => *field = (*field + count - 1) % count,
                KeyCode::Enter => return Some(Command::SubmitEdit),
                KeyCode::Backspace => {
                    if let Some(f) = FormField::from_index(*field) {
                        edit_field(app.users.edit_draft_mut(), f).pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(f) = FormField::from_index(*field) {
                        if f.accepts(c) {
                            edit_field(app.users.edit_draft_mut(), f).push(c);
                        }
                    }
                }
                _ => {}
            }
        }
        Some(ModalState::DeleteConfirm { id, email, selected }) => match code {
            KeyCode::Esc | KeyCode::Char('n') => close_modal(app),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                *selected = 1 - *selected;
            }
            KeyCode::Char('y') => {
                let cmd = Command::Delete { id: *id, email: email.clone() };
                close_modal(app);
                return Some(cmd);
            }
            KeyCode::Enter => {
                let cmd = (*selected == 0).then(|| Command::Delete { id: *id, email: email.clone() });
                close_modal(app);
                return cmd;
            }
            _ => {}
        },
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => close_modal(app),
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        None => app.input_mode = InputMode::Normal,
    }
    None
}

fn draft_field(draft: &mut crate::api::UserDraft, field: FormField) -> &mut String {
    match field {
        FormField::Name => &mut draft.name,
        FormField::Email => &mut draft.email,
        FormField::Phone => &mut draft.phone,
        FormField::Age => &mut draft.age,
    }
}

fn edit_field(draft: &mut crate::api::EditDraft, field: FormField) -> &mut String {
    match field {
        FormField::Name => &mut draft.name,
        FormField::Email => &mut draft.email,
        FormField::Phone => &mut draft.phone,
        FormField::Age => &mut draft.age,
    }
}

fn open_modal(app: &mut AppState, modal: ModalState) {
    app.modal = Some(modal);
    app.input_mode = InputMode::Modal;
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::users::tests::{FakeApi, user};
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(api: &Arc<FakeApi>) -> AppState {
        AppState::new(api.clone(), Theme::dark(), Keymap::default(), &CancellationToken::new())
    }

    #[tokio::test]
    async fn delete_flow_requires_yes_in_dialog() {
        let api = Arc::new(FakeApi::default());
        api.lists.lock().unwrap().push_back(Ok(vec![user(1, "a@x.com")]));
        let mut app = app_with(&api);
        dispatch(&mut app, Command::Refresh).await;

        assert_eq!(handle_key(&mut app, press(KeyCode::Delete)), None);
        assert!(matches!(app.modal, Some(ModalState::DeleteConfirm { selected: 1, .. })));
        // Enter on the default "No" closes without a command.
        assert_eq!(handle_key(&mut app, press(KeyCode::Enter)), None);
        assert!(app.modal.is_none());

        handle_key(&mut app, press(KeyCode::Delete));
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Char('y'))),
            Some(Command::Delete { id: 1, email: "a@x.com".into() })
        );
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn edit_dialog_closes_only_after_successful_submit() {
        let api = Arc::new(FakeApi::default());
        api.lists.lock().unwrap().push_back(Ok(vec![user(1, "a@x.com")]));
        api.units.lock().unwrap().push_back(Err(crate::api::ApiError::from_response(500, None)));
        let mut app = app_with(&api);
        dispatch(&mut app, Command::Refresh).await;

        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.users.editing().map(|u| u.id), Some(1));
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.users.edit_draft().name, "user");

        let cmd = handle_key(&mut app, press(KeyCode::Enter)).unwrap();
        assert_eq!(dispatch(&mut app, cmd.clone()).await, OpOutcome::Failed);
        assert!(app.modal.is_some());

        assert_eq!(dispatch(&mut app, cmd).await, OpOutcome::Succeeded);
        assert!(app.modal.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn registration_form_accepts_digits_only_for_age() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(&api);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.active_tab, ActiveTab::Register);
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Form);

        app.register_field = 3;
        for c in ['4', 'x', '2'] {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        assert_eq!(app.register.draft().age, "42");

        handle_key(&mut app, press(KeyCode::Down));
        assert_eq!(handle_key(&mut app, press(KeyCode::Enter)), Some(Command::Register));
    }

    #[test]
    fn only_bound_quit_presses_cancel_in_flight_work() {
        let km = Keymap::default();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(is_quit(&km, &Event::Key(ctrl_c)));
        assert!(is_quit(&km, &Event::Key(press(KeyCode::Char('q')))));
        assert!(!is_quit(&km, &Event::Key(press(KeyCode::Char('c')))));
        assert!(!is_quit(&km, &Event::Resize(80, 24)));

        let release = KeyEvent::new_with_kind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Release);
        assert!(!is_quit(&km, &Event::Key(release)));
    }

    #[test]
    fn search_box_collects_query_until_enter() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(&api);
        handle_key(&mut app, press(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);
        for c in "a@x".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        assert_eq!(handle_key(&mut app, press(KeyCode::Enter)), Some(Command::Search("a@x".into())));
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
