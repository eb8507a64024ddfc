//! Users table controller: owns the displayed list and reconciles it with the server.
//!
//! The list is only ever replaced wholesale by a successful fetch or search.
//! Mutations (delete, update) never patch it locally; they reload it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{OpOutcome, StatusMessage, guarded};
use crate::api::{ApiError, EditDraft, ErrorCategory, User, UserApi, normalize};

pub const ENTER_EMAIL_MESSAGE: &str = "Please enter an email to search.";
pub const NO_USERS_MESSAGE: &str = "No users found.";
pub const UPDATED_MESSAGE: &str = "User updated successfully!";

pub fn delete_prompt(email: &str) -> String {
    format!("Are you sure you want to delete the user with email: {email}?")
}

pub fn deleted_message(email: &str) -> String {
    format!("User with email {email} deleted successfully!")
}

pub struct UsersController {
    api: Arc<dyn UserApi>,
    records: Vec<User>,
    pending: AtomicBool,
    status: Option<StatusMessage>,
    search_mode: bool,
    query: String,
    editing: Option<User>,
    edit_draft: EditDraft,
    shutdown: CancellationToken,
}

impl UsersController {
    pub fn new(api: Arc<dyn UserApi>, shutdown: CancellationToken) -> Self {
        Self {
            api,
            records: Vec::new(),
            pending: AtomicBool::new(false),
            status: None,
            search_mode: false,
            query: String::new(),
            editing: None,
            edit_draft: EditDraft::default(),
            shutdown,
        }
    }

    pub fn records(&self) -> &[User] {
        &self.records
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.search_mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn editing(&self) -> Option<&User> {
        self.editing.as_ref()
    }

    pub fn edit_draft(&self) -> &EditDraft {
        &self.edit_draft
    }

    pub fn edit_draft_mut(&mut self) -> &mut EditDraft {
        &mut self.edit_draft
    }

    /// Cancel any in-flight operation. State is left as it was when the operation started.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Fetch the full collection.
    pub async fn refresh(&mut self) -> OpOutcome {
        if self.is_pending() {
            return OpOutcome::Busy;
        }
        self.status = None;
        self.reload().await
    }

    async fn reload(&mut self) -> OpOutcome {
        self.search_mode = false;
        let Some(result) = guarded(&self.pending, &self.shutdown, self.api.list_all()).await else {
            return OpOutcome::Cancelled;
        };
        match result {
            Ok(records) => {
                self.records = records;
                OpOutcome::Succeeded
            }
            Err(err) => {
                self.fail("refresh", &err);
                OpOutcome::Failed
            }
        }
    }

    /// Replace the list with the users matching `query` by email.
    pub async fn search(&mut self, query: &str) -> OpOutcome {
        if self.is_pending() {
            return OpOutcome::Busy;
        }
        self.query = query.to_string();
        let email = query.trim();
        if email.is_empty() {
            self.status = Some(StatusMessage::info(ENTER_EMAIL_MESSAGE));
            return OpOutcome::Skipped;
        }

        self.status = None;
        self.search_mode = true;
        let searched = guarded(&self.pending, &self.shutdown, self.api.search_by_email(email)).await;
        let Some(result) = searched else {
            return OpOutcome::Cancelled;
        };
        match result {
            Ok(records) => {
                if records.is_empty() {
                    self.status = Some(StatusMessage::info(NO_USERS_MESSAGE));
                }
                self.records = records;
                OpOutcome::Succeeded
            }
            Err(err) if normalize(&err).category() == ErrorCategory::NotFound => {
                self.records.clear();
                self.status = Some(StatusMessage::info(NO_USERS_MESSAGE));
                OpOutcome::Succeeded
            }
            Err(err) => {
                self.records.clear();
                self.fail("search", &err);
                OpOutcome::Failed
            }
        }
    }

    /// Leave search mode and show the full collection again.
    pub async fn clear_search(&mut self) -> OpOutcome {
        if self.is_pending() {
            return OpOutcome::Busy;
        }
        self.query.clear();
        self.search_mode = false;
        self.status = None;
        self.refresh().await
    }

    /// Delete a user after `confirm` accepts the prompt naming `email`.
    ///
    /// Declining leaves every field untouched. On success the list is reloaded
    /// from the server rather than spliced.
    pub async fn delete_one<F>(&mut self, id: i64, email: &str, confirm: F) -> OpOutcome
    where
        F: FnOnce(&str) -> bool,
    {
        if self.is_pending() {
            return OpOutcome::Busy;
        }
        if !confirm(&delete_prompt(email)) {
            return OpOutcome::Skipped;
        }

        self.status = None;
        let Some(result) = guarded(&self.pending, &self.shutdown, self.api.delete(id)).await else {
            return OpOutcome::Cancelled;
        };
        match result {
            Ok(()) => {
                info!(id, email, "user deleted");
                self.status = Some(StatusMessage::success(deleted_message(email)));
                self.settle_after_mutation().await
            }
            Err(err) => {
                self.fail("delete", &err);
                OpOutcome::Failed
            }
        }
    }

    pub fn open_edit(&mut self, record: &User) {
        self.edit_draft = EditDraft::from_user(record);
        self.editing = Some(record.clone());
    }

    pub fn close_edit(&mut self) {
        self.editing = None;
        self.edit_draft = EditDraft::default();
    }

    /// Send the edit draft. The session stays open on failure so the operator can retry.
    pub async fn submit_edit(&mut self) -> OpOutcome {
        let Some(id) = self.editing.as_ref().map(|u| u.id) else {
            return OpOutcome::Skipped;
        };
        if self.is_pending() {
            return OpOutcome::Busy;
        }

        self.status = None;
        let payload = self.edit_draft.to_payload(id);
        let Some(result) = guarded(&self.pending, &self.shutdown, self.api.update(&payload)).await else {
            return OpOutcome::Cancelled;
        };
        match result {
            Ok(()) => {
                info!(id, "user updated");
                self.status = Some(StatusMessage::success(UPDATED_MESSAGE));
                self.close_edit();
                self.settle_after_mutation().await
            }
            Err(err) => {
                self.fail("update", &err);
                OpOutcome::Failed
            }
        }
    }

    /// The mutation itself succeeded; reload and report success unless the teardown fired.
    /// A failed reload replaces the success message with its own error.
    async fn settle_after_mutation(&mut self) -> OpOutcome {
        match self.reload().await {
            OpOutcome::Cancelled => OpOutcome::Cancelled,
            _ => OpOutcome::Succeeded,
        }
    }

    fn fail(&mut self, op: &'static str, err: &ApiError) {
        let normalized = normalize(err);
        warn!(op, category = ?normalized.category(), "users operation failed");
        self.status = Some(StatusMessage::error(normalized.message()));
    }
}

impl Drop for UsersController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
