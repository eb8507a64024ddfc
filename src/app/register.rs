//! Registration form controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{OpOutcome, StatusMessage, guarded};
use crate::api::{UserApi, UserDraft, normalize};

pub const REGISTERED_MESSAGE: &str = "Registration successful!";

pub struct RegistrationController {
    api: Arc<dyn UserApi>,
    draft: UserDraft,
    pending: AtomicBool,
    status: Option<StatusMessage>,
    shutdown: CancellationToken,
}

impl RegistrationController {
    pub fn new(api: Arc<dyn UserApi>, shutdown: CancellationToken) -> Self {
        Self { api, draft: UserDraft::default(), pending: AtomicBool::new(false), status: None, shutdown }
    }

    pub fn draft(&self) -> &UserDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut UserDraft {
        &mut self.draft
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Create a user from the draft. The draft is reset on success and kept on failure.
    pub async fn submit(&mut self) -> OpOutcome {
        if self.is_pending() {
            return OpOutcome::Busy;
        }
        self.status = None;

        let payload = self.draft.to_payload();
        let Some(result) = guarded(&self.pending, &self.shutdown, self.api.create(&payload)).await else {
            return OpOutcome::Cancelled;
        };
        match result {
            Ok(()) => {
                info!(email = %payload.email, "user registered");
                self.status = Some(StatusMessage::success(REGISTERED_MESSAGE));
                self.draft = UserDraft::default();
                OpOutcome::Succeeded
            }
            Err(err) => {
                let normalized = normalize(&err);
                warn!(category = ?normalized.category(), "registration failed");
                self.status = Some(StatusMessage::error(normalized.message()));
                OpOutcome::Failed
            }
        }
    }
}

impl Drop for RegistrationController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::app::StatusKind;
    use crate::app::users::tests::FakeApi;

    fn ann() -> UserDraft {
        UserDraft { name: "Ann".into(), email: "ann@x.com".into(), phone: String::new(), age: "30".into() }
    }

    #[tokio::test]
    async fn success_resets_draft_and_reports() {
        let api = Arc::new(FakeApi::default());
        let mut c = RegistrationController::new(api.clone(), CancellationToken::new());
        *c.draft_mut() = ann();

        assert_eq!(c.submit().await, OpOutcome::Succeeded);
        assert!(c.draft().is_empty());
        assert_eq!(c.status().map(|s| s.text.as_str()), Some(REGISTERED_MESSAGE));
        let sent = api.creates.lock().unwrap()[0].clone();
        assert_eq!(sent.phone, None);
        assert_eq!(sent.age, 30);
    }

    #[tokio::test]
    async fn failure_preserves_draft() {
        let api = Arc::new(FakeApi::default());
        api.units.lock().unwrap().push_back(Err(ApiError::from_response(409, None)));
        let mut c = RegistrationController::new(api.clone(), CancellationToken::new());
        *c.draft_mut() = ann();

        assert_eq!(c.submit().await, OpOutcome::Failed);
        assert_eq!(c.draft(), &ann());
        let status = c.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "This record already exists.");
        assert!(!c.is_pending());
    }
}
