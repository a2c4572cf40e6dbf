//! REST endpoint over `axum::serve`.

use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::endpoint::{Endpoint, EndpointError};

/// Serves one router on one address until stopped.
pub struct HttpEndpoint {
    name: String,
    address: String,
    router: Mutex<Option<Router>>,
    stop: watch::Sender<bool>,
}

impl HttpEndpoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>, router: Router) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            name: name.into(),
            address: address.into(),
            router: Mutex::new(Some(router)),
            stop,
        }
    }

    /// A router serves once; a second `run` finds nothing to serve.
    fn take_router(&self) -> Option<Router> {
        self.router.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    async fn bind(&self) -> Result<TcpListener, EndpointError> {
        let address: SocketAddr = self.address.parse().map_err(|source| EndpointError::Address {
            address: self.address.clone(),
            source,
        })?;
        TcpListener::bind(address).await.map_err(|source| EndpointError::Bind {
            address: self.address.clone(),
            source,
        })
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    fn name(&self) -> String {
        format!("Http ({}), {}", self.address, self.name)
    }

    /// Returns [`EndpointError::Closed`] once stopped, including when
    /// stopped before it started.
    async fn run(&self) -> Result<(), EndpointError> {
        let mut stopped = self.stop.subscribe();
        if *stopped.borrow() {
            return Err(EndpointError::Closed);
        }
        let Some(router) = self.take_router() else {
            return Err(EndpointError::Closed);
        };

        let listener = self.bind().await?;
        tracing::info!(endpoint = %self.name(), address = %self.address, "HTTP endpoint listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stopped.wait_for(|stop| *stop).await;
            })
            .await
            .map_err(EndpointError::Serve)?;

        Err(EndpointError::Closed)
    }

    fn stop(&self) -> Result<(), EndpointError> {
        self.stop.send_replace(true);
        Ok(())
    }
}
