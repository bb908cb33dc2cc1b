//! HTTP transport seam
//!
//! [`HttpTransport`] performs exactly one POST per call and reports failures
//! already sorted into the classes the retry policy cares about. The client
//! owns retries; transports never retry on their own.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::error::Error as StdError;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A fully encoded POST ready to go on the wire
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Status and raw body of a response that reached us
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportFailure {
    /// An established connection dropped before the response completed
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// DNS, TLS, refused connections and anything else
    #[error("{0}")]
    Network(String),
}

impl TransportFailure {
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, TransportFailure::ConnectionLost(_))
    }

    /// Convert a terminal failure into the client error surfaced to callers
    pub fn into_client_error(self, attempts: u32) -> ClientError {
        match self {
            TransportFailure::ConnectionLost(message) => {
                ClientError::connection_lost(attempts, message)
            }
            TransportFailure::Timeout(message) => ClientError::timeout(message),
            TransportFailure::Network(message) => ClientError::network(message),
        }
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, request: &OutgoingRequest) -> Result<RawResponse, TransportFailure>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn post(&self, request: &OutgoingRequest) -> Result<RawResponse, TransportFailure> {
        (**self).post(request).await
    }
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// No timeout unless one is given; the platform default applies.
    pub fn new(timeout: Option<Duration>) -> ClientResult<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("paygate-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            ClientError::configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: &OutgoingRequest) -> Result<RawResponse, TransportFailure> {
        let response = self
            .client
            .post(&request.url)
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify_reqwest_error)?;

        debug!("Received HTTP {} ({} bytes) from {}", status, body.len(), request.url);
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

pub(crate) fn classify_reqwest_error(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout(err.to_string())
    } else if !err.is_connect() && is_connection_lost(&err) {
        TransportFailure::ConnectionLost(err.to_string())
    } else {
        TransportFailure::Network(err.to_string())
    }
}

/// Walks the source chain looking for a connection that was dropped mid-exchange.
pub(crate) fn is_connection_lost(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        // hyper reports a peer hang-up mid-response as an incomplete message
        if e.to_string()
            .contains("connection closed before message completed")
        {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "error sending request")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_reset_in_source_chain_is_connection_lost() {
        let err = Wrapped(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
        assert!(is_connection_lost(&err));

        let err = Wrapped(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        assert!(is_connection_lost(&err));
    }

    #[test]
    fn test_other_io_errors_are_not_connection_lost() {
        let err = Wrapped(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(!is_connection_lost(&err));

        let err = io::Error::new(io::ErrorKind::TimedOut, "timed out");
        assert!(!is_connection_lost(&err));
    }

    #[test]
    fn test_terminal_failure_mapping() {
        let err = TransportFailure::ConnectionLost("reset".into()).into_client_error(4);
        assert!(matches!(err, ClientError::ConnectionLost { attempts: 4, .. }));

        let err = TransportFailure::Timeout("slow".into()).into_client_error(1);
        assert!(matches!(err, ClientError::Timeout { .. }));

        let err = TransportFailure::Network("dns".into()).into_client_error(1);
        assert!(matches!(err, ClientError::Network { .. }));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_failure() {
        let transport = ReqwestTransport::new(Some(Duration::from_secs(5))).unwrap();
        let request = OutgoingRequest {
            url: "http://127.0.0.1:1/payments".to_string(),
            headers: HeaderMap::new(),
            body: b"{}".to_vec(),
        };

        let failure = transport.post(&request).await.unwrap_err();
        assert!(!failure.is_connection_lost(), "got {:?}", failure);
    }
}
