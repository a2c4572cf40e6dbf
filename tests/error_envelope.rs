//! End-to-end error rendering over real HTTP.

mod common;

use std::net::SocketAddr;

use serde_json::{json, Value};

use service_skeleton::errors::http::{from_http, HttpResponse};
use service_skeleton::errors::{Code, DetailRecord};
use service_skeleton::http::X_REQUEST_ID;

use common::{start_programmable_backend, start_service};

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn stack(body: &HttpResponse) -> Vec<String> {
    body.error
        .details
        .iter()
        .find_map(|d| match d {
            DetailRecord::DebugInfo(info) => Some(info.stack_entries.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn request_id(body: &HttpResponse) -> Option<String> {
    body.error.details.iter().find_map(|d| match d {
        DetailRecord::RequestInfo(info) => Some(info.request_id.clone()),
        _ => None,
    })
}

#[tokio::test]
async fn test_not_found_renders_resource_info() {
    let service = start_service(addr(28201), None).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/users/42", service.base_url))
        .header(X_REQUEST_ID, "e2e-1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.headers()[X_REQUEST_ID], "e2e-1");

    let body: HttpResponse = response.json().await.unwrap();
    assert_eq!(body.error.code, 404);
    assert_eq!(body.error.status, "NOT_FOUND");
    assert_eq!(body.error.message, r#"not found, type = "user", id = "42""#);
    assert_eq!(request_id(&body).as_deref(), Some("e2e-1"));
    assert_eq!(stack(&body), vec!["rest.get_user", "users.get"]);
    assert!(body.error.details.iter().any(|d| matches!(
        d,
        DetailRecord::ResourceInfo(info) if info.resource_type == "user" && info.resource_name == "42"
    )));

    assert!(service.stop().await.unwrap_err().is_closed());
}

#[tokio::test]
async fn test_create_validation_and_conflict() {
    let service = start_service(addr(28202), None).await;
    let client = reqwest::Client::new();
    let url = format!("{}/users", service.base_url);

    let response = client.post(&url).json(&json!({ "name": "" })).send().await.unwrap();
    assert_eq!(response.status(), 400);
    let body: HttpResponse = response.json().await.unwrap();
    assert_eq!(body.error.status, "INVALID_ARGUMENT");
    let violations = body.error.details.iter().find_map(|d| match d {
        DetailRecord::BadRequest(info) => Some(info.field_violations.len()),
        _ => None,
    });
    assert_eq!(violations, Some(2));

    let user = json!({ "name": "Ada", "email": "ada@example.com" });
    let response = client.post(&url).json(&user).send().await.unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["name"], "Ada");

    let response = client.post(&url).json(&user).send().await.unwrap();
    assert_eq!(response.status(), 409);
    let body: HttpResponse = response.json().await.unwrap();
    assert_eq!(body.error.status, "ALREADY_EXISTS");

    let response = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let _ = service.stop().await;
}

#[tokio::test]
async fn test_peer_error_is_relayed_with_merged_details() {
    let upstream = start_service(addr(28203), None).await;
    let edge = start_service(addr(28204), Some(&upstream.base_url)).await;

    let response = reqwest::Client::new()
        .get(format!("{}/peer/users/7", edge.base_url))
        .header(X_REQUEST_ID, "relay-1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let body: HttpResponse = response.json().await.unwrap();
    assert_eq!(body.error.status, "NOT_FOUND");
    assert_eq!(request_id(&body).as_deref(), Some("relay-1"));
    assert_eq!(
        stack(&body),
        vec![
            "rest.get_peer_user".to_string(),
            format!("GET {}/users/7", upstream.base_url),
            "rest.get_user".to_string(),
            "users.get".to_string(),
        ]
    );
    let debug_records = body
        .error
        .details
        .iter()
        .filter(|d| matches!(d, DetailRecord::DebugInfo(_)))
        .count();
    assert_eq!(debug_records, 1);
    assert!(body.error.details.iter().any(|d| matches!(d, DetailRecord::ResourceInfo(_))));

    let _ = edge.stop().await;
    let _ = upstream.stop().await;
}

#[tokio::test]
async fn test_peer_garbage_is_internal() {
    start_programmable_backend(addr(28205), || async { (502, "<html>bad gateway</html>".to_string()) }).await;
    let edge = start_service(addr(28206), Some("http://127.0.0.1:28205")).await;

    let response = reqwest::Client::new()
        .get(format!("{}/peer/users/1", edge.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: HttpResponse = response.json().await.unwrap();
    assert_eq!(body.error.status, "INTERNAL");

    let _ = edge.stop().await;
}

#[tokio::test]
async fn test_peer_not_configured() {
    let service = start_service(addr(28207), None).await;

    let response = reqwest::get(format!("{}/peer/users/1", service.base_url)).await.unwrap();
    assert_eq!(response.status(), 400);
    let bytes = response.bytes().await.unwrap();
    let err = from_http("GET", "/peer/users/1", 400, &bytes).unwrap();
    assert_eq!(err.code(), Code::FailedPrecondition);

    let _ = service.stop().await;
}
