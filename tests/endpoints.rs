//! Endpoint orchestration against real listeners.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tonic::transport::Channel;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;
use tonic_types::StatusExt;

use service_skeleton::app::proto::users_client::UsersClient;
use service_skeleton::app::proto::{CreateUserRequest, GetUserRequest};
use service_skeleton::app::{self, UserDirectory};
use service_skeleton::http::X_REQUEST_ID;
use service_skeleton::endpoint::{self, Endpoint, EndpointError, HttpEndpoint, RpcEndpoint};
use service_skeleton::lifecycle::Shutdown;
use service_skeleton::observability::metrics;

use common::wait_for_port;

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

async fn channel(uri: &'static str) -> Channel {
    tonic::transport::Endpoint::from_static(uri).connect().await.unwrap()
}

fn hello() -> Router {
    Router::new().route("/", get(|| async { "hello" }))
}

#[tokio::test]
async fn test_shutdown_stops_http_endpoints() {
    let shutdown = Shutdown::new();
    let endpoints: Vec<Arc<dyn Endpoint>> = vec![
        Arc::new(HttpEndpoint::new("a", "127.0.0.1:28301", hello())),
        Arc::new(HttpEndpoint::new("b", "127.0.0.1:28302", hello())),
    ];
    let orchestrator = shutdown.clone();
    let run = tokio::spawn(async move { endpoint::run(&orchestrator, endpoints).await });

    wait_for_port(addr(28301)).await;
    wait_for_port(addr(28302)).await;
    let body = reqwest::get("http://127.0.0.1:28302/").await.unwrap().text().await.unwrap();
    assert_eq!(body, "hello");

    shutdown.trigger();
    assert!(shutdown.wait_timeout(Duration::from_secs(5)).await);
    let result = tokio::time::timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert!(result.unwrap_err().is_closed());
}

#[tokio::test]
async fn test_bind_failure_returns_early_while_others_serve() {
    let shutdown = Shutdown::new();
    let endpoints: Vec<Arc<dyn Endpoint>> = vec![
        Arc::new(HttpEndpoint::new("first", "127.0.0.1:28303", hello())),
        Arc::new(HttpEndpoint::new("bad", "not-an-address", hello())),
    ];

    let result = tokio::time::timeout(Duration::from_secs(5), endpoint::run(&shutdown, endpoints))
        .await
        .unwrap();
    assert!(matches!(result, Err(EndpointError::Address { .. })));

    wait_for_port(addr(28303)).await;
    let status = reqwest::get("http://127.0.0.1:28303/").await.unwrap().status();
    assert_eq!(status, 200);

    shutdown.trigger();
    assert!(shutdown.wait_timeout(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_rpc_health_is_serving() {
    let shutdown = Shutdown::new();
    let endpoints: Vec<Arc<dyn Endpoint>> =
        vec![Arc::new(RpcEndpoint::new("app", "127.0.0.1:28304", app::rpc::routes(Arc::new(UserDirectory::new()))))];
    let orchestrator = shutdown.clone();
    let run = tokio::spawn(async move { endpoint::run(&orchestrator, endpoints).await });

    wait_for_port(addr(28304)).await;
    let mut client = HealthClient::new(channel("http://127.0.0.1:28304").await);
    let response = client
        .check(HealthCheckRequest {
            service: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(response.into_inner().status, ServingStatus::Serving as i32);

    shutdown.trigger();
    assert!(shutdown.wait_timeout(Duration::from_secs(5)).await);
    let result = tokio::time::timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert!(result.unwrap_err().is_closed());
}

#[tokio::test]
async fn test_rpc_errors_carry_code_stack_and_request_id() {
    let shutdown = Shutdown::new();
    let endpoints: Vec<Arc<dyn Endpoint>> =
        vec![Arc::new(RpcEndpoint::new("app", "127.0.0.1:28306", app::rpc::routes(Arc::new(UserDirectory::new()))))];
    let orchestrator = shutdown.clone();
    tokio::spawn(async move { endpoint::run(&orchestrator, endpoints).await });

    wait_for_port(addr(28306)).await;
    let mut client = UsersClient::new(channel("http://127.0.0.1:28306").await);

    let mut request = tonic::Request::new(GetUserRequest { id: "42".into() });
    request.metadata_mut().insert(X_REQUEST_ID, "grpc-e2e-1".parse().unwrap());
    let status = client.get_user(request).await.unwrap_err();

    assert_eq!(status.code(), tonic::Code::NotFound);
    assert_eq!(status.message(), r#"not found, type = "user", id = "42""#);
    let details = status.get_error_details();
    assert_eq!(details.request_info().map(|r| r.request_id.as_str()), Some("grpc-e2e-1"));
    let stack = details.debug_info().map(|d| d.stack_entries.clone()).unwrap_or_default();
    assert_eq!(stack, vec!["rpc.get_user".to_string(), "users.get".to_string()]);
    let resource = details.resource_info().expect("resource info");
    assert_eq!(resource.resource_type, "user");
    assert_eq!(resource.resource_name, "42");

    let created = client
        .create_user(tonic::Request::new(CreateUserRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
        }))
        .await
        .unwrap()
        .into_inner();
    let fetched = client
        .get_user(tonic::Request::new(GetUserRequest { id: created.id.clone() }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(fetched, created);

    shutdown.trigger();
    assert!(shutdown.wait_timeout(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_request_counts() {
    let handle = metrics::install().unwrap();
    metrics::record_request("GET", 404, std::time::Instant::now());

    let shutdown = Shutdown::new();
    let endpoints: Vec<Arc<dyn Endpoint>> =
        vec![Arc::new(HttpEndpoint::new("metrics", "127.0.0.1:28305", metrics::router(handle)))];
    let orchestrator = shutdown.clone();
    tokio::spawn(async move { endpoint::run(&orchestrator, endpoints).await });

    wait_for_port(addr(28305)).await;
    let body = reqwest::get("http://127.0.0.1:28305/metrics").await.unwrap().text().await.unwrap();
    assert!(body.contains("http_requests_total"));

    shutdown.trigger();
    assert!(shutdown.wait_timeout(Duration::from_secs(5)).await);
}
