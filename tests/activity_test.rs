//! In-flight counter behaviour under concurrent gateway calls

mod common;

use common::{connection_lost, ok_json, test_config, ScriptedTransport};
use paygate_client::payments::{ActivityIndicator, GatewayClient, TransportFailure};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn run_concurrent_calls(n: usize, transport: ScriptedTransport) -> usize {
    let activity = ActivityIndicator::new();
    let mut receiver = activity.subscribe();
    let client = Arc::new(
        GatewayClient::with_transport(test_config(), transport)
            .unwrap()
            .with_activity(activity.clone()),
    );

    let watcher = tokio::spawn(async move {
        let mut peak = 0;
        while receiver.changed().await.is_ok() {
            peak = peak.max(*receiver.borrow_and_update());
        }
        peak
    });

    let mut handles = Vec::with_capacity(n);
    for i in 0..n {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            let request = client
                .payments_request(json!({"type": "scheme"}))
                .unwrap()
                .with_reference(format!("order-{}", i));
            client.submit_payment(&request).await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(activity.in_flight(), 0, "counter must settle at zero");
    assert!(!activity.is_busy());

    drop(client);
    drop(activity);
    watcher.await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_counter_returns_to_zero_for_successful_calls() {
    for n in 1..=50 {
        let transport = ScriptedTransport::always(ok_json(json!({"resultCode": "Authorised"})))
            .with_latency(Duration::from_millis(2));
        let peak = run_concurrent_calls(n, transport).await;
        assert!(peak <= n, "peak {} above {} concurrent calls", peak, n);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_counter_returns_to_zero_for_failing_calls() {
    for n in [1, 7, 25, 50] {
        let transport = ScriptedTransport::always(connection_lost());
        run_concurrent_calls(n, transport).await;

        let transport =
            ScriptedTransport::always(Err(TransportFailure::Network("unreachable".into())));
        run_concurrent_calls(n, transport).await;
    }
}

#[tokio::test]
async fn test_counter_is_idle_before_and_after_a_call() {
    let transport = ScriptedTransport::always(ok_json(json!({"resultCode": "Pending"})));
    let client = GatewayClient::with_transport(test_config(), transport).unwrap();
    assert_eq!(client.activity().in_flight(), 0);

    let request = client.payments_request(json!({})).unwrap();
    client.submit_payment(&request).await;

    assert_eq!(client.activity().in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_counter_stays_busy_between_retries() {
    let mut config = test_config();
    config.retry.delay_ms = 1_000;
    let transport = ScriptedTransport::new(
        vec![connection_lost()],
        ok_json(json!({"resultCode": "Authorised"})),
    );
    let client = Arc::new(GatewayClient::with_transport(config, transport).unwrap());
    let activity = client.activity().clone();

    let call = tokio::spawn({
        let client = client.clone();
        async move {
            let request = client.payments_request(json!({})).unwrap();
            client.submit_payment(&request).await
        }
    });

    // The first attempt has failed and the client is waiting out the retry delay.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(activity.in_flight(), 1);
    assert!(activity.is_busy());

    assert!(call.await.unwrap().is_success());
    assert_eq!(activity.in_flight(), 0);
}
