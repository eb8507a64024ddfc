// Integration tests for bue-admin against a mock user service

use std::sync::Arc;
use std::time::Duration;

use bue_admin::api::{ApiError, ErrorCategory, UserApi, UserService, normalize};
use bue_admin::app::register::REGISTERED_MESSAGE;
use bue_admin::app::users::{NO_USERS_MESSAGE, UPDATED_MESSAGE, deleted_message};
use bue_admin::app::{OpOutcome, RegistrationController, StatusKind, UsersController};
use bue_admin::config::Settings;
use httpmock::prelude::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        base_url: format!("{}/api/User", server.base_url()),
        timeout: Duration::from_secs(5),
        origin: None,
        ..Settings::default()
    }
}

fn service(server: &MockServer) -> Arc<UserService> {
    Arc::new(UserService::new(&settings_for(server)).expect("build service"))
}

fn users_json() -> serde_json::Value {
    json!([
        {"id": 2, "name": "Bo", "email": "bo@x.com", "phone": "555", "age": 41},
        {"id": 1, "name": "Ann", "email": "ann@x.com", "phone": null, "age": 30}
    ])
}

#[tokio::test]
async fn list_all_decodes_array_in_order() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET).path("/api/User/users").header("content-type", "application/json");
        then.status(200).header("content-type", "application/json").json_body(users_json());
    });

    let users = service(&server).list_all().await.expect("list");
    m.assert_async().await;
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, 2);
    assert_eq!(users[0].phone.as_deref(), Some("555"));
    assert_eq!(users[1].phone, None);
}

#[tokio::test]
async fn search_not_found_is_a_not_found_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/User/email/nobody");
        then.status(404)
            .header("content-type", "application/json")
            .json_body(json!({"message": "No user with that email"}));
    });

    let err = service(&server).search_by_email("nobody").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    let n = normalize(&err);
    assert_eq!(n.category(), ErrorCategory::NotFound);
    assert_eq!(n.message(), "No user with that email");
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(DELETE).path("/api/User/delete/7");
        then.status(204);
    });

    service(&server).delete(7).await.expect("delete");
    m.assert_async().await;
}

#[tokio::test]
async fn validation_failure_carries_raw_body_and_field_lines() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/User/register");
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({"errors": {"email": ["already taken"]}}));
    });

    let payload = bue_admin::api::UserDraft {
        name: "Ann".into(),
        email: "ann@x.com".into(),
        ..Default::default()
    }
    .to_payload();
    let err = service(&server).create(&payload).await.unwrap_err();
    match &err {
        ApiError::Status { status, message, data } => {
            assert_eq!(*status, 400);
            assert!(message.contains("email: already taken"));
            assert!(data.as_ref().and_then(|d| d.get("errors")).is_some());
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn problem_json_validation_body_keeps_field_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PUT).path("/api/User/update");
        then.status(400)
            .header("content-type", "application/problem+json; charset=utf-8")
            .json_body(json!({
                "title": "One or more validation errors occurred.",
                "status": 400,
                "errors": {"UpdatedEmail": ["The email is not valid."]}
            }));
    });

    let payload = bue_admin::api::EditDraft { email: "bad".into(), ..Default::default() }.to_payload(3);
    let err = service(&server).update(&payload).await.unwrap_err();
    let n = normalize(&err);
    assert_eq!(n.category(), ErrorCategory::Validation);
    assert_eq!(n.message(), "Validation errors:\nUpdatedEmail: The email is not valid.");
    assert!(n.field_errors().is_some_and(|f| f.contains_key("UpdatedEmail")));
}

#[tokio::test]
async fn non_json_error_body_is_not_parsed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/User/users");
        then.status(500).header("content-type", "text/plain").body("{\"message\":\"hidden\"}");
    });

    let err = service(&server).list_all().await.unwrap_err();
    match &err {
        ApiError::Status { data, message, .. } => {
            assert!(data.is_none());
            assert_eq!(message, "Server error: An error occurred on the server.");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
    assert_eq!(normalize(&err).category(), ErrorCategory::ServerError);
}

#[tokio::test]
async fn unreachable_server_is_network_unreachable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let settings = Settings {
        base_url: format!("http://127.0.0.1:{port}/api/User"),
        timeout: Duration::from_secs(2),
        ..Settings::default()
    };
    let svc = UserService::new(&settings).expect("build service");

    let err = svc.list_all().await.unwrap_err();
    assert_eq!(err.status(), None);
    assert_eq!(normalize(&err).category(), ErrorCategory::NetworkUnreachable);
}

#[tokio::test]
async fn slow_server_times_out_as_network_unreachable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/User/users");
        then.status(200)
            .header("content-type", "application/json")
            .delay(Duration::from_secs(3))
            .json_body(json!([]));
    });
    let settings = Settings { timeout: Duration::from_millis(300), ..settings_for(&server) };
    let svc = UserService::new(&settings).expect("build service");

    let err = svc.list_all().await.unwrap_err();
    let n = normalize(&err);
    assert_eq!(n.category(), ErrorCategory::NetworkUnreachable);
    assert!(n.message().contains("did not respond in time"));
}

#[tokio::test]
async fn register_scenario_sends_nulls_and_resets_draft() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/api/User/register")
            .json_body(json!({"name": "Ann", "email": "ann@x.com", "phone": null, "age": 30}));
        then.status(204);
    });

    let mut c = RegistrationController::new(service(&server), CancellationToken::new());
    {
        let d = c.draft_mut();
        d.name = "Ann".into();
        d.email = "ann@x.com".into();
        d.age = "30".into();
    }
    assert_eq!(c.submit().await, OpOutcome::Succeeded);
    m.assert_async().await;
    assert!(c.draft().is_empty());
    assert_eq!(c.status().map(|s| s.text.as_str()), Some(REGISTERED_MESSAGE));
}

#[tokio::test]
async fn update_scenario_sends_nulls_for_blank_fields_then_reloads() {
    let server = MockServer::start();
    let update = server.mock(|when, then| {
        when.method(PUT).path("/api/User/update").json_body(json!({
            "id": 1,
            "updatedName": null,
            "updatedEmail": "b@x.com",
            "updatedPhone": null,
            "updatedAge": null
        }));
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/User/users");
        then.status(200).header("content-type", "application/json").json_body(users_json());
    });

    let mut c = UsersController::new(service(&server), CancellationToken::new());
    c.refresh().await;
    let ann = c.records()[1].clone();
    c.open_edit(&ann);
    {
        let d = c.edit_draft_mut();
        d.name.clear();
        d.email = "b@x.com".into();
        d.phone.clear();
        d.age.clear();
    }

    assert_eq!(c.submit_edit().await, OpOutcome::Succeeded);
    update.assert_async().await;
    assert!(c.editing().is_none());
    assert_eq!(c.status().map(|s| s.text.as_str()), Some(UPDATED_MESSAGE));
    assert_eq!(c.records().len(), 2);
}

#[tokio::test]
async fn delete_then_reload_over_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/api/User/delete/2");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/User/users");
        then.status(200).header("content-type", "application/json").json_body(users_json());
    });

    let mut c = UsersController::new(service(&server), CancellationToken::new());
    assert_eq!(c.delete_one(2, "bo@x.com", |_| true).await, OpOutcome::Succeeded);
    let status = c.status().expect("status");
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.text, deleted_message("bo@x.com"));
    assert_eq!(c.records().len(), 2);
}

#[tokio::test]
async fn search_404_over_http_shows_no_results() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/User/email/ghost");
        then.status(404);
    });

    let mut c = UsersController::new(service(&server), CancellationToken::new());
    assert_eq!(c.search("ghost").await, OpOutcome::Succeeded);
    assert!(c.records().is_empty());
    let status = c.status().expect("status");
    assert_eq!(status.kind, StatusKind::Info);
    assert_eq!(status.text, NO_USERS_MESSAGE);
}
