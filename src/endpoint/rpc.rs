//! gRPC endpoint over `tonic`.

use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tonic::service::Routes;
use tonic::transport::Server;

use crate::endpoint::{Endpoint, EndpointError};

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);
const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(1);

/// Serves a set of gRPC services on one address until stopped.
pub struct RpcEndpoint {
    name: String,
    address: String,
    routes: Mutex<Option<Routes>>,
    stop: watch::Sender<bool>,
}

impl RpcEndpoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>, routes: Routes) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            name: name.into(),
            address: address.into(),
            routes: Mutex::new(Some(routes)),
            stop,
        }
    }

    fn take_routes(&self) -> Option<Routes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

#[async_trait]
impl Endpoint for RpcEndpoint {
    fn name(&self) -> String {
        format!("GRPC ({}), {}", self.address, self.name)
    }

    async fn run(&self) -> Result<(), EndpointError> {
        let mut stopped = self.stop.subscribe();
        if *stopped.borrow() {
            return Err(EndpointError::Closed);
        }
        let address: SocketAddr = self.address.parse().map_err(|source| EndpointError::Address {
            address: self.address.clone(),
            source,
        })?;
        let Some(routes) = self.take_routes() else {
            return Err(EndpointError::Closed);
        };

        tracing::info!(endpoint = %self.name(), address = %self.address, "gRPC endpoint listening");

        Server::builder()
            .http2_keepalive_interval(Some(KEEPALIVE_INTERVAL))
            .http2_keepalive_timeout(Some(KEEPALIVE_TIMEOUT))
            .add_routes(routes)
            .serve_with_shutdown(address, async move {
                let _ = stopped.wait_for(|stop| *stop).await;
            })
            .await?;

        Err(EndpointError::Closed)
    }

    fn stop(&self) -> Result<(), EndpointError> {
        self.stop.send_replace(true);
        Ok(())
    }
}
