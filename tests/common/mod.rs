//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use service_skeleton::app::{self, AppState, UserDirectory};
use service_skeleton::components::{http_client, HttpClient};
use service_skeleton::config::{HttpConfig, TomlSource};
use service_skeleton::endpoint::{self, Endpoint, EndpointError, HttpEndpoint};
use service_skeleton::http::layered;
use service_skeleton::lifecycle::Shutdown;
use service_skeleton::registry::Registry;

/// A running demo service instance.
pub struct Service {
    pub shutdown: Shutdown,
    pub base_url: String,
    pub run: JoinHandle<Result<(), EndpointError>>,
}

impl Service {
    pub async fn stop(self) -> Result<(), EndpointError> {
        self.shutdown.trigger();
        assert!(self.shutdown.wait_timeout(Duration::from_secs(5)).await);
        self.run.await.expect("orchestrator task")
    }
}

/// Start the demo REST service on `addr`, optionally relaying to `peer_url`.
pub async fn start_service(addr: SocketAddr, peer_url: Option<&str>) -> Service {
    let shutdown = Shutdown::new();
    let peer = peer_url.map(|url| peer_client(&shutdown, url));

    let state = AppState {
        users: Arc::new(UserDirectory::new()),
        peer,
    };
    let router = layered(app::router(state), &HttpConfig::default());
    let endpoints: Vec<Arc<dyn Endpoint>> = vec![Arc::new(HttpEndpoint::new("rest", addr.to_string(), router))];

    let orchestrator = shutdown.clone();
    let run = tokio::spawn(async move { endpoint::run(&orchestrator, endpoints).await });
    wait_for_port(addr).await;

    Service {
        shutdown,
        base_url: format!("http://{addr}"),
        run,
    }
}

fn peer_client(shutdown: &Shutdown, url: &str) -> Arc<HttpClient> {
    let components: toml::Table = toml::from_str(&format!("[peer]\nbase_url = {url:?}\ntimeout_secs = 2")).unwrap();
    Registry::new(shutdown.clone())
        .register("peer", http_client::descriptor(), TomlSource::new(&components, "peer"), false)
        .and_then(|provider| provider.get())
        .unwrap()
}

/// Poll until something accepts connections on `addr`.
pub async fn wait_for_port(addr: SocketAddr) {
    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("nothing listening on {addr}");
}

/// Start a programmable raw HTTP backend.
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = Arc::clone(&f);
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;

                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
}
