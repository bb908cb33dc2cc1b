//! Shared helpers for gateway client integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use paygate_client::payments::types::Amount;
use paygate_client::payments::{HttpTransport, OutgoingRequest, RawResponse, TransportFailure};
use paygate_client::ClientConfig;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn test_config() -> ClientConfig {
    let mut config = ClientConfig::new("https://checkout-test.example.com/v68", "TestMerchant");
    config.defaults.amount = Amount::new("EUR", 1000).unwrap();
    config.defaults.reference = "order-1".to_string();
    config
}

/// Replays a fixed script of attempt results, then repeats the fallback forever.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportFailure>>>,
    fallback: Result<RawResponse, TransportFailure>,
    attempts: AtomicUsize,
    requests: Mutex<Vec<OutgoingRequest>>,
    latency: Duration,
}

impl ScriptedTransport {
    pub fn new(
        script: Vec<Result<RawResponse, TransportFailure>>,
        fallback: Result<RawResponse, TransportFailure>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            attempts: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn always(result: Result<RawResponse, TransportFailure>) -> Self {
        Self::new(Vec::new(), result)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post(&self, request: &OutgoingRequest) -> Result<RawResponse, TransportFailure> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn ok_json(value: serde_json::Value) -> Result<RawResponse, TransportFailure> {
    Ok(RawResponse::new(200, value.to_string()))
}

pub fn connection_lost() -> Result<RawResponse, TransportFailure> {
    Err(TransportFailure::ConnectionLost(
        "connection reset by peer".to_string(),
    ))
}
