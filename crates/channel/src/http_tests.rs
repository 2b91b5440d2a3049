//! `HttpChannel` tests against a local `wiremock` server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adapter::{
    run_trace, CancellationSignal, Channel, ChannelRequest, Network, Point, TraceError,
    TraceRequest, Transport,
};

use crate::{ChannelConfig, HttpTransport};

const WATER_PATH: &str = "/arcgis/rest/services/Water/MapServer/exts/ArcFMMapServer/Water%20Trace";

fn transport() -> HttpTransport {
    HttpTransport::new(&ChannelConfig::default()).unwrap()
}

#[tokio::test]
async fn posts_json_and_returns_raw_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WATER_PATH))
        .and(header_exists("user-agent"))
        .and(body_json(json!({ "f": "json", "traceType": "ValveIsolation" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let channel = transport().channel();
    let response = channel
        .send(ChannelRequest {
            url: format!("{}{WATER_PATH}", server.uri()),
            body: json!({ "f": "json", "traceType": "ValveIsolation" }),
        })
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap(), json!({ "results": [] }));
}

#[tokio::test]
async fn error_statuses_are_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let response = transport()
        .channel()
        .send(ChannelRequest {
            url: server.uri(),
            body: json!({}),
        })
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert!(!response.is_success());
    assert_eq!(response.snippet(), "maintenance");
}

#[tokio::test]
async fn run_trace_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WATER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "results": [{
                    "displayFieldName": "FACILITYID",
                    "features": [{ "attributes": { "FACILITYID": "V-7" } }],
                    "name": "Valves",
                    "id": 2
                }]
            }
        })))
        .mount(&server)
        .await;

    let request = TraceRequest::new(
        format!("{}/arcgis/rest/services/Water/MapServer/", server.uri()),
        Point::new(1, 2),
    );
    let channel = transport().open();

    let response = run_trace(&request, Network::Water, channel.as_ref(), &CancellationSignal::new())
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].name(), Some("Valves"));
    assert_eq!(response.feature_count(), 1);
}

#[tokio::test]
async fn cancel_aborts_a_slow_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let channel = std::sync::Arc::new(transport().channel());
    let sender = std::sync::Arc::clone(&channel);
    let url = server.uri();
    let in_flight = tokio::spawn(async move {
        sender
            .send(ChannelRequest {
                url,
                body: json!({}),
            })
            .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    channel.cancel();
    channel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), in_flight)
        .await
        .expect("cancel should end the exchange promptly")
        .unwrap();
    assert_eq!(result, Err(TraceError::Cancelled));
    assert!(channel.is_cancelled());
}

#[tokio::test]
async fn cancel_after_completion_is_a_no_op() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let channel = transport().channel();
    let response = channel
        .send(ChannelRequest {
            url: server.uri(),
            body: json!({}),
        })
        .await;
    channel.cancel();

    assert!(response.is_ok());
}

#[tokio::test]
async fn configured_timeout_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = ChannelConfig::default().with_timeout(Duration::from_millis(100));
    let result = HttpTransport::new(&config)
        .unwrap()
        .channel()
        .send(ChannelRequest {
            url: server.uri(),
            body: json!({}),
        })
        .await;

    assert!(matches!(result, Err(TraceError::Transport(_))));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let result = transport()
        .channel()
        .send(ChannelRequest {
            url: "http://127.0.0.1:9/MapServer/exts/ArcFMMapServer/Gas%20Trace".into(),
            body: json!({}),
        })
        .await;

    assert!(matches!(result, Err(TraceError::Transport(_))));
}
