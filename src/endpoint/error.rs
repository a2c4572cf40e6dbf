use thiserror::Error;

#[derive(Debug, Error)]
pub enum EndpointError {
    /// The endpoint was stopped. Not a failure.
    #[error("endpoint closed")]
    Closed,

    #[error("invalid listen address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serve: {0}")]
    Serve(#[source] std::io::Error),

    #[error("transport: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("endpoint {name} panicked")]
    Panicked { name: String },
}

impl EndpointError {
    pub fn is_closed(&self) -> bool {
        matches!(self, EndpointError::Closed)
    }
}
