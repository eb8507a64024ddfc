//! HTTP access to the `/api/User` resource.
//!
//! [`UserApi`] is the seam the controllers depend on; [`UserService`] is the
//! reqwest-backed implementation used by the binary.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Instrument, debug, debug_span, warn};

use super::error::{ApiError, NetworkFailure};
use super::model::{RegisterUser, UpdateUser, User};
use crate::config::Settings;
use crate::error::config_error;

/// The five remote operations over the user collection.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// `GET /users`.
    async fn list_all(&self) -> Result<Vec<User>, ApiError>;
    /// `GET /email/{email}`. A 404 is returned as an [`ApiError::Status`]; callers decide
    /// whether it means "no match".
    async fn search_by_email(&self, email: &str) -> Result<Vec<User>, ApiError>;
    /// `DELETE /delete/{id}`.
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    /// `PUT /update`.
    async fn update(&self, payload: &UpdateUser) -> Result<(), ApiError>;
    /// `POST /register`.
    async fn create(&self, payload: &RegisterUser) -> Result<(), ApiError>;
}

/// reqwest client bound to one base URL.
#[derive(Clone, Debug)]
pub struct UserService {
    http: Client,
    base_url: String,
    origin: Option<String>,
}

impl UserService {
    /// Build a service from settings. The timeout applies to every request.
    pub fn new(settings: &Settings) -> crate::error::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(origin) = settings.origin.as_deref() {
            let value = HeaderValue::from_str(origin)
                .map_err(|e| config_error(format!("invalid origin {origin:?}: {e}")))?;
            headers.insert(ORIGIN, value);
        }
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            origin: settings.origin.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<Value>, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let span = debug_span!("user_api", http.method = %method, path = %path);
        async move {
            let mut req = self.http.request(method, &url);
            if let Some(body) = body {
                req = req.json(body);
            }
            let response = req.send().await.map_err(|e| self.network_error(e))?;
            let result = handle_response(response).await;
            match &result {
                Ok(_) => debug!("request succeeded"),
                Err(err) => warn!(status = ?err.status(), error = %err, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn network_error(&self, err: reqwest::Error) -> ApiError {
        let reason = err.to_string();
        let lowered = reason.to_ascii_lowercase();
        if lowered.contains("cors") || lowered.contains("cross-origin") {
            let origin = self.origin.clone().unwrap_or_else(|| "this client's origin".to_string());
            warn!(%reason, "request rejected by cross-origin policy");
            return ApiError::Network { kind: NetworkFailure::CrossOrigin { origin }, reason };
        }
        warn!(%reason, "request did not reach the server");
        ApiError::from(err)
    }
}

#[async_trait]
impl UserApi for UserService {
    async fn list_all(&self) -> Result<Vec<User>, ApiError> {
        let body = self.send::<()>(Method::GET, "/users", None).await?;
        decode(body)
    }

    async fn search_by_email(&self, email: &str) -> Result<Vec<User>, ApiError> {
        let body = self.send::<()>(Method::GET, &search_path(email), None).await?;
        decode(body)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, &format!("/delete/{id}"), None).await?;
        Ok(())
    }

    async fn update(&self, payload: &UpdateUser) -> Result<(), ApiError> {
        self.send(Method::PUT, "/update", Some(payload)).await?;
        Ok(())
    }

    async fn create(&self, payload: &RegisterUser) -> Result<(), ApiError> {
        self.send(Method::POST, "/register", Some(payload)).await?;
        Ok(())
    }
}

/// Shared response handling for every operation.
///
/// 204 is an empty success. Bodies are parsed only when the response declares
/// a JSON content type. Non-success statuses become [`ApiError::Status`].
async fn handle_response(response: Response) -> Result<Option<Value>, ApiError> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    let has_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_json_content_type);

    if status.is_success() {
        if !has_json {
            return Ok(None);
        }
        return response
            .json::<Value>()
            .await
            .map(Some)
            .map_err(|e| ApiError::Decode { reason: e.to_string() });
    }

    let data = if has_json { response.json::<Value>().await.ok() } else { None };
    Err(ApiError::from_response(status.as_u16(), data))
}

/// `application/json` or any `+json` structured suffix such as `application/problem+json`.
fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

pub(crate) fn search_path(email: &str) -> String {
    format!("/email/{}", urlencoding::encode(email))
}

fn decode<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    let body = body.ok_or_else(|| ApiError::Decode {
        reason: "expected a JSON body but the response had none".to_string(),
    })?;
    serde_json::from_value(body).map_err(|e| ApiError::Decode { reason: e.to_string() })
}
