use httpmock::prelude::*;
use serde_json::json;
use sos_dispatch::adapters::{GrantTable, SmsGateway, VoiceGateway};
use sos_dispatch::config::GatewayConfig;
use sos_dispatch::core::{Capability, DeliveryOutcome, DispatchRequest, Recipient};
use sos_dispatch::BulkDispatcher;

fn gateway_config(server: &MockServer) -> GatewayConfig {
    GatewayConfig {
        endpoint: server.base_url(),
        api_key: Some("test-key".to_string()),
        timeout_seconds: Some(5),
    }
}

fn recipients(ids: &[&str]) -> Vec<Recipient> {
    ids.iter().map(|id| Recipient::new(*id).unwrap()).collect()
}

fn dispatcher(
    server: &MockServer,
    granted: &[Capability],
) -> BulkDispatcher<GrantTable, SmsGateway, VoiceGateway> {
    let (grants, _prompts) = GrantTable::new(granted);
    let config = gateway_config(server);
    BulkDispatcher::new(grants, SmsGateway::new(&config), VoiceGateway::new(&config))
}

#[tokio::test]
async fn test_single_part_sms_is_posted_with_auth() {
    let server = MockServer::start_async().await;
    let sms_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/messages")
                .header("authorization", "Bearer test-key")
                .json_body(json!({
                    "to": "+15550100",
                    "parts": ["Need help at the north gate"],
                    "multipart": false
                }));
            then.status(202);
        })
        .await;

    let report = dispatcher(&server, &Capability::ALL)
        .dispatch(DispatchRequest::message(
            recipients(&["+1 555-0100"]),
            "Need help at the north gate",
        ))
        .await
        .unwrap();

    sms_mock.assert_async().await;
    assert_eq!(report.outcomes[0].outcome, DeliveryOutcome::Delivered);
}

#[tokio::test]
async fn test_long_sms_goes_out_as_one_multipart_request_per_recipient() {
    let server = MockServer::start_async().await;
    let body = "x".repeat(300);
    let expected_parts = vec!["x".repeat(153), "x".repeat(147)];

    let first = server
        .mock_async(|when, then| {
            when.method(POST).path("/messages").json_body(json!({
                "to": "+15550101",
                "parts": expected_parts,
                "multipart": true
            }));
            then.status(200);
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST).path("/messages").json_body(json!({
                "to": "+15550102",
                "parts": expected_parts,
                "multipart": true
            }));
            then.status(200);
        })
        .await;

    let report = dispatcher(&server, &Capability::ALL)
        .dispatch(DispatchRequest::message(
            recipients(&["+15550101", "+15550102"]),
            body,
        ))
        .await
        .unwrap();

    first.assert_hits_async(1).await;
    second.assert_hits_async(1).await;
    assert_eq!(report.delivered(), 2);
}

#[tokio::test]
async fn test_rejected_and_malformed_numbers_do_not_stop_the_batch() {
    let server = MockServer::start_async().await;
    let rejected = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/messages")
                .body_contains("+15550103");
            then.status(500).body("carrier down");
        })
        .await;
    let mut accepted = Vec::new();
    for number in ["+15550101", "+15550102", "+15550105"] {
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/messages").body_contains(number);
                then.status(200);
            })
            .await;
        accepted.push(mock);
    }

    let report = dispatcher(&server, &Capability::ALL)
        .with_max_in_flight(1)
        .dispatch(DispatchRequest::message(
            recipients(&["+15550101", "+15550102", "+15550103", "oops", "+15550105"]),
            "help",
        ))
        .await
        .unwrap();

    let outcomes: Vec<&DeliveryOutcome> = report.outcomes.iter().map(|o| &o.outcome).collect();
    assert_eq!(outcomes[0], &DeliveryOutcome::Delivered);
    assert_eq!(outcomes[1], &DeliveryOutcome::Delivered);
    assert_eq!(
        outcomes[2],
        &DeliveryOutcome::TransportFailed {
            reason: "gateway rejected request with status 500: carrier down".to_string()
        }
    );
    assert_eq!(
        outcomes[3],
        &DeliveryOutcome::TransportFailed {
            reason: "invalid number format: oops".to_string()
        }
    );
    assert_eq!(outcomes[4], &DeliveryOutcome::Delivered);

    rejected.assert_hits_async(1).await;
    for mock in &accepted {
        mock.assert_hits_async(1).await;
    }
}

#[tokio::test]
async fn test_call_posts_tel_intent() {
    let server = MockServer::start_async().await;
    let call_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/calls")
                .json_body(json!({"to": "112", "uri": "tel:112"}));
            then.status(201);
        })
        .await;

    let report = dispatcher(&server, &[Capability::PlaceCall])
        .dispatch(DispatchRequest::call(recipients(&["112"])))
        .await
        .unwrap();

    call_mock.assert_async().await;
    assert_eq!(report.delivered(), 1);
}

#[tokio::test]
async fn test_denied_call_never_reaches_the_gateway() {
    let server = MockServer::start_async().await;
    let call_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/calls");
            then.status(201);
        })
        .await;

    let report = dispatcher(&server, &[Capability::SendMessage])
        .dispatch(DispatchRequest::call(recipients(&["112"])))
        .await
        .unwrap();

    assert!(report.is_permission_denied());
    call_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_unreachable_gateway_is_a_transport_failure() {
    let (grants, _prompts) = GrantTable::new(&Capability::ALL);
    let config = GatewayConfig {
        endpoint: "http://127.0.0.1:1".to_string(),
        api_key: None,
        timeout_seconds: Some(2),
    };
    let dispatcher =
        BulkDispatcher::new(grants, SmsGateway::new(&config), VoiceGateway::new(&config));

    let report = dispatcher
        .dispatch(DispatchRequest::message(recipients(&["+15550100"]), "help"))
        .await
        .unwrap();

    assert_eq!(report.attempted, 1);
    match &report.outcomes[0].outcome {
        DeliveryOutcome::TransportFailed { reason } => {
            assert!(reason.starts_with("gateway unreachable"))
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
