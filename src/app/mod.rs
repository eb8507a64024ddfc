//! Application state types and entry glue.
//!
//! Defines the controllers that own remote state, the enums that model the
//! TUI, and re-exports the event loop as `run`.
//!
pub mod keymap;
pub mod register;
pub mod theme;
pub mod update;
pub mod users;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::api::UserApi;
pub use keymap::Keymap;
pub use register::RegistrationController;
pub use theme::Theme;
pub use users::UsersController;

/// Top-level active tab in the UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveTab {
    Register,
    Users,
}

impl ActiveTab {
    pub fn title(self) -> &'static str {
        match self {
            ActiveTab::Register => "Registration Form",
            ActiveTab::Users => "Users Table",
        }
    }
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the email search box.
    Search,
    /// Typing into the registration form.
    Form,
    Modal,
}

/// Editable fields shared by the registration form and the edit dialog.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Age,
}

impl FormField {
    pub const ALL: [FormField; 4] = [FormField::Name, FormField::Email, FormField::Phone, FormField::Age];

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email address",
            FormField::Phone => "Phone number",
            FormField::Age => "Age",
        }
    }

    /// Age only takes digits, like a numeric input.
    pub fn accepts(self, c: char) -> bool {
        match self {
            FormField::Age => c.is_ascii_digit(),
            FormField::Name | FormField::Email | FormField::Phone => !c.is_control(),
        }
    }
}

/// Modal dialogs on top of the users table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// Edit dialog; `field` indexes [`FormField::ALL`].
    EditUser { field: usize },
    /// Delete confirmation naming the target email. `selected`: 0 = Yes, 1 = No.
    DeleteConfirm { id: i64, email: String, selected: usize },
    Help { scroll: u16 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Info,
    Error,
}

/// Last human-readable outcome of an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Success, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, text: text.into() }
    }
}

/// How a controller operation settled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpOutcome {
    Succeeded,
    /// The failure was normalized into the status message.
    Failed,
    /// Another operation is still pending; nothing was done.
    Busy,
    /// Blank input, declined confirmation or nothing to submit.
    Skipped,
    /// The controller was shut down while the request was in flight; no state was applied.
    Cancelled,
}

/// Run `fut` unless `token` fires first.
pub(crate) async fn cancellable<T>(token: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Run `fut` with `pending` raised, unless `token` fires first.
pub(crate) async fn guarded<T>(
    pending: &AtomicBool,
    token: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Option<T> {
    let _busy = PendingGuard::hold(pending);
    cancellable(token, fut).await
}

/// Marks a controller busy for as long as it is alive.
///
/// Dropping the guard clears the flag, including when the owning future is
/// dropped mid-request.
pub(crate) struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    pub(crate) fn hold(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AppState {
    pub active_tab: ActiveTab,
    pub users: UsersController,
    pub register: RegistrationController,
    pub selected_user_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    /// Focused row of the registration form; `FormField::ALL.len()` is the submit row.
    pub register_field: usize,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    /// Set by the event loop while it awaits a command.
    pub in_flight: bool,
}

impl AppState {
    /// Build the state around one shared API client. Each controller gets a child of `shutdown`.
    pub fn new(api: Arc<dyn UserApi>, theme: Theme, keymap: Keymap, shutdown: &CancellationToken) -> Self {
        Self {
            active_tab: ActiveTab::Users,
            users: UsersController::new(Arc::clone(&api), shutdown.child_token()),
            register: RegistrationController::new(api, shutdown.child_token()),
            selected_user_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            register_field: 0,
            theme,
            keymap,
            modal: None,
            in_flight: false,
        }
    }

    /// Keep the selection inside the current list after it was replaced.
    pub fn clamp_selection(&mut self) {
        let len = self.users.records().len();
        self.selected_user_index = self.selected_user_index.min(len.saturating_sub(1));
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight || self.users.is_pending() || self.register.is_pending()
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_guard_clears_flag_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _busy = PendingGuard::hold(&flag);
            assert!(flag.load(Ordering::Acquire));
        }
        assert!(!flag.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn guarded_future_dropped_mid_flight_clears_flag() {
        let flag = AtomicBool::new(false);
        let token = CancellationToken::new();
        let stalled = guarded(&flag, &token, std::future::pending::<()>());
        assert!(tokio::time::timeout(std::time::Duration::from_millis(10), stalled).await.is_err());
        assert!(!flag.load(Ordering::Acquire));

        token.cancel();
        assert_eq!(guarded(&flag, &token, async { 1 }).await, None);
        assert!(!flag.load(Ordering::Acquire));
    }
}
