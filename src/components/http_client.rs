//! Outbound HTTP client component.
//!
//! Built from a `[components.<name>]` section:
//!
//! ```toml
//! [components.peer]
//! base_url = "http://127.0.0.1:8080"
//! timeout_secs = 5
//! health_path = "/healthz"     # optional periodic probe
//! health_interval_secs = 15
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize};

use crate::config::{ScanExt, Scanner};
use crate::errors::http::check_response;
use crate::errors::{Code, Error};
use crate::http::X_REQUEST_ID;
use crate::lifecycle::ticker;
use crate::registry::{CreatedContext, Descriptor};
use crate::BoxError;

pub const DESCRIPTOR_NAME: &str = "HttpClient";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub health_path: Option<String>,
    pub health_interval_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 5,
            health_path: None,
            health_interval_secs: 15,
        }
    }
}

/// A reqwest client bound to one peer.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, BoxError> {
        if config.base_url.is_empty() {
            return Err("base_url must not be empty".into());
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// `GET path`, forwarding `request_id`. Error envelopes from the peer
    /// come back as taxonomy errors with the peer's code and details.
    pub async fn get(&self, path: &str, request_id: &str) -> Result<reqwest::Response, Error> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .header(X_REQUEST_ID, request_id)
            .send()
            .await
            .map_err(|e| send_error(&url, e))?;
        check_response("GET", response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, request_id: &str) -> Result<T, Error> {
        let response = self.get(path, request_id).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::wrap("http_client.decode", e).with_code(Code::Internal))
    }

    async fn probe(&self, path: &str) -> Result<(), Error> {
        self.get(path, &uuid::Uuid::new_v4().to_string()).await.map(|_| ())
    }
}

fn send_error(url: &str, e: reqwest::Error) -> Error {
    let unreachable = e.is_connect();
    let err = Error::wrap(format!("GET {url}"), e);
    if unreachable {
        err.with_code(Code::Unavailable)
    } else {
        err
    }
}

/// Descriptor for registering an [`HttpClient`].
pub fn descriptor() -> Descriptor<HttpClient> {
    Descriptor::new(DESCRIPTOR_NAME, |scanner: &dyn Scanner| -> Result<HttpClient, BoxError> {
        let config: HttpClientConfig = scanner.scan()?;
        HttpClient::new(config)
    })
    .on_created(start_health_probe)
}

fn start_health_probe(ctx: &CreatedContext, client: &Arc<HttpClient>) {
    let Some(path) = client.config.health_path.clone() else {
        return;
    };
    let period = Duration::from_secs(client.config.health_interval_secs);
    let client = Arc::clone(client);
    let name = ctx.full_name.clone();

    ticker::spawn(&ctx.shutdown, name.clone(), period, move || {
        let client = Arc::clone(&client);
        let path = path.clone();
        let name = name.clone();
        async move {
            match client.probe(&path).await {
                Ok(()) => tracing::debug!(component = %name, "Peer healthy"),
                Err(e) => tracing::warn!(component = %name, error = %e, "Peer health probe failed"),
            }
        }
    });
}
