//! Gateway client
//!
//! Encodes a request envelope, POSTs it to `{base_url}/{path}`, retries a
//! lost connection a bounded number of times, turns HTTP 500 into a server
//! error and decodes everything else into the endpoint's response schema.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::payments::activity::ActivityIndicator;
use crate::payments::request::{
    GatewayRequest, PaymentDetailsRequest, PaymentMethodsRequest, PaymentsRequest,
};
use crate::payments::response::{decode_body, PaymentMethodsResponse, PaymentOutcome};
use crate::payments::transport::{HttpTransport, OutgoingRequest, RawResponse, ReqwestTransport};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};

pub struct GatewayClient<T = ReqwestTransport> {
    config: Arc<ClientConfig>,
    headers: HeaderMap,
    transport: T,
    activity: ActivityIndicator,
}

impl GatewayClient<ReqwestTransport> {
    /// Create a client backed by `reqwest`
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> GatewayClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> ClientResult<Self> {
        config.validate()?;
        let headers = build_headers(&config)?;

        info!(
            "Gateway client initialized for {} environment with base URL: {}",
            config.environment, config.base_url
        );

        Ok(Self {
            config: Arc::new(config),
            headers,
            transport,
            activity: ActivityIndicator::new(),
        })
    }

    /// Share an in-flight counter with other clients or a UI subscriber
    pub fn with_activity(mut self, activity: ActivityIndicator) -> Self {
        self.activity = activity;
        self
    }

    pub fn activity(&self) -> &ActivityIndicator {
        &self.activity
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn payment_methods_request(&self) -> ClientResult<PaymentMethodsRequest> {
        PaymentMethodsRequest::new(&self.config)
    }

    pub fn payments_request(&self, payment_method: Value) -> ClientResult<PaymentsRequest> {
        PaymentsRequest::new(payment_method, &self.config)
    }

    pub fn details_request(&self, details: Value) -> ClientResult<PaymentDetailsRequest> {
        PaymentDetailsRequest::new(details, &self.config)
    }

    /// Send one request and decode its response.
    ///
    /// # Errors
    /// * `Encode` - the envelope could not be serialized
    /// * `ConnectionLost` - every attempt lost its connection
    /// * `Timeout` / `Network` - any other transport failure, not retried
    /// * `Server` - the gateway answered HTTP 500; the body is ignored
    /// * `Decode` - the body does not match the response schema
    pub async fn perform<R: GatewayRequest>(&self, request: &R) -> ClientResult<R::Response> {
        let path = R::PATH;
        let url = self.config.endpoint_url(path)?;
        let body =
            serde_json::to_vec(request).map_err(|e| ClientError::encode(path, e.to_string()))?;

        if tracing::enabled!(Level::DEBUG) {
            debug!(" ---- Request (/{}) ----\n{}", path, pretty_json(&body));
        }

        let outgoing = OutgoingRequest {
            url,
            headers: self.headers.clone(),
            body,
        };

        let response = self.send_with_retry(path, &outgoing).await?;

        if response.status == 500 {
            error!("Gateway returned HTTP 500 for /{}", path);
            return Err(ClientError::internal_server_error());
        }

        if tracing::enabled!(Level::DEBUG) {
            debug!(
                " ---- Response (/{}) HTTP {} ----\n{}",
                path,
                response.status,
                pretty_json(&response.body)
            );
        }

        decode_body::<R::Response>(&response.body).map_err(|e| {
            error!("Failed to decode /{} response: {}", path, e);
            e
        })
    }

    /// Attempts run strictly one after another; only a lost connection
    /// starts another one. The call stays in flight until the last attempt
    /// settles, so the counter never drops between retries.
    async fn send_with_retry(
        &self,
        path: &str,
        outgoing: &OutgoingRequest,
    ) -> ClientResult<RawResponse> {
        let max_attempts = self.config.retry.max_retries.saturating_add(1);
        let mut attempt = 0;
        let _in_flight = self.activity.begin();

        loop {
            attempt += 1;
            let result = self.transport.post(outgoing).await;

            match result {
                Ok(response) => return Ok(response),
                Err(failure) if failure.is_connection_lost() && attempt < max_attempts => {
                    warn!(
                        "Connection lost on /{}, retrying (attempt {} of {}): {}",
                        path,
                        attempt + 1,
                        max_attempts,
                        failure
                    );
                    let delay = self.config.retry.delay();
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(failure) => {
                    error!(
                        "Request to /{} failed after {} attempt(s): {}",
                        path, attempt, failure
                    );
                    return Err(failure.into_client_error(attempt));
                }
            }
        }
    }

    pub async fn payment_methods(
        &self,
        request: &PaymentMethodsRequest,
    ) -> ClientResult<PaymentMethodsResponse> {
        info!("Fetching payment methods for {}", request.amount());
        let response = self.perform(request).await?;
        info!(
            "Gateway offered {} payment methods ({} stored)",
            response.payment_methods.len(),
            response.stored_payment_methods.len()
        );
        Ok(response)
    }

    pub async fn submit_payment(&self, request: &PaymentsRequest) -> PaymentOutcome {
        info!(
            "Submitting payment: {} reference={}",
            request.amount(),
            request.reference()
        );
        let outcome = PaymentOutcome::from_result(self.perform(request).await);
        log_outcome(PaymentsRequest::PATH, &outcome);
        outcome
    }

    /// Submit the result of a redirect or challenge action
    pub async fn submit_details(&self, request: &PaymentDetailsRequest) -> PaymentOutcome {
        let outcome = PaymentOutcome::from_result(self.perform(request).await);
        log_outcome(PaymentDetailsRequest::PATH, &outcome);
        outcome
    }
}

fn log_outcome(path: &str, outcome: &PaymentOutcome) {
    match outcome.refusal() {
        Some(refusal) => info!(
            "/{} finished with {} (refusal {} -> {})",
            path,
            outcome.label(),
            refusal.code,
            refusal.kind
        ),
        None => info!("/{} finished with {}", path, outcome.label()),
    }
}

/// Configured headers first, then `Content-Type`, so configuration can
/// never replace or remove it.
fn build_headers(config: &ClientConfig) -> ClientResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::configuration(format!("Invalid header name: {}", name)))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            ClientError::configuration(format!("Invalid value for header {}", name))
        })?;
        headers.insert(name, value);
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Pretty JSON for logs, falling back to lossy UTF-8 for anything else
fn pretty_json(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_cannot_be_overridden() {
        let mut config = ClientConfig::new("https://checkout.example.com", "TestMerchant");
        config
            .headers
            .insert("content-type".to_string(), "text/plain".to_string());
        config
            .headers
            .insert("X-Api-Key".to_string(), "secret".to_string());

        let headers = build_headers(&config).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(headers.get("x-api-key").unwrap(), "secret");
    }

    #[test]
    fn test_pretty_json_falls_back_to_text() {
        assert_eq!(pretty_json(b"not json"), "not json");
        assert!(pretty_json(br#"{"a":1}"#).contains("\"a\": 1"));
    }

    #[test]
    fn test_client_requires_valid_config() {
        let result = GatewayClient::new(ClientConfig::new("", "TestMerchant"));
        assert!(matches!(result, Err(ClientError::Configuration { .. })));
    }
}
