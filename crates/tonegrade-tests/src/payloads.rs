//! Integration tests for JSON preview-update payloads.

use serde_json::{json, Value};
use tonegrade_color::{resolve_params, GlobalParameters, ParamValue, ParamValues};
use tonegrade_core::{ImageBuffer, Result, TonegradeError};
use tonegrade_preview::{PreviewCache, PreviewConfig, PreviewEncoder, PreviewService};

struct Rgb8Length;

impl PreviewEncoder for Rgb8Length {
    fn encode(&self, image: &ImageBuffer) -> Result<String> {
        Ok(image.to_rgb8().len().to_string())
    }
}

struct BrokenEncoder;

impl PreviewEncoder for BrokenEncoder {
    fn encode(&self, _image: &ImageBuffer) -> Result<String> {
        Err(TonegradeError::Encoder("png writer unavailable".into()))
    }
}

fn service_with_source() -> PreviewService {
    let config = PreviewConfig::default();
    let service = PreviewService::new(PreviewCache::new(&config).shared(), &config);
    let outcome = service.apply_value(
        &ImageBuffer::gradient(800, 600),
        Some("W1"),
        "5",
        &json!({
            "shadows": [0.1, 0.0, 0.0],
            "midtones": {"g": 0.2},
            "highlights": {"r": 0, "g": 0, "b": -0.1}
        }),
        &GlobalParameters::default(),
    );
    assert!(outcome.is_applied());
    service
}

fn body(value: Value) -> String {
    value.to_string()
}

fn parse(response: &tonegrade_preview::PreviewResponse) -> Value {
    serde_json::from_str(&response.to_json().unwrap()).unwrap()
}

#[test]
fn success_payload_carries_updated_image() {
    let service = service_with_source();
    let request = body(json!({
        "key": "colorbalance_W1_5",
        "tones": {
            "shadows": {"r": 0.3, "g": 0, "b": 0},
            "midtones": {"r": 0, "g": 0, "b": 0},
            "highlights": {"r": 0, "g": 0, "b": 0}
        },
        "preserve_luminosity": false,
        "strength": 1.5
    }));

    let response = service.handle_request(&request, &Rgb8Length);
    assert_eq!(response.status_code(), 200);
    let value = parse(&response);
    assert_eq!(value["status"], "success");
    assert_eq!(value["updatedimage"], (512 * 384 * 3).to_string());
}

#[test]
fn unknown_key_is_a_distinct_not_found() {
    let service = service_with_source();
    let request = body(json!({
        "key": "colorbalance_W2_5",
        "tones": {"shadows": {}, "midtones": {}, "highlights": {}}
    }));

    let response = service.handle_request(&request, &Rgb8Length);
    assert_eq!(response.status_code(), 404);
    let value = parse(&response);
    assert_eq!(value["kind"], "not_found");
    assert!(value["message"]
        .as_str()
        .unwrap()
        .contains("colorbalance_W2_5"));
}

#[test]
fn malformed_bodies_are_invalid() {
    let service = service_with_source();
    for request in [
        "not json".to_string(),
        body(json!({"tones": {"shadows": {}, "midtones": {}, "highlights": {}}})),
        body(json!({"key": "colorbalance_W1_5", "tones": {"shadows": [1, 2]}})),
    ] {
        let response = service.handle_request(&request, &Rgb8Length);
        assert_eq!(response.status_code(), 400, "body: {request}");
        assert_eq!(parse(&response)["kind"], "invalid");
    }
}

#[test]
fn encoder_failure_is_reported() {
    let service = service_with_source();
    let request = body(json!({
        "key": "colorbalance_W1_5",
        "tones": {"shadows": {}, "midtones": {}, "highlights": {}}
    }));

    let response = service.handle_request(&request, &BrokenEncoder);
    assert_eq!(response.status_code(), 500);
    assert!(parse(&response)["message"]
        .as_str()
        .unwrap()
        .contains("png writer unavailable"));
}

#[test]
fn host_widget_values_drive_a_preview() {
    let service = service_with_source();
    let mut values = ParamValues::new();
    values.insert("shadows_r".into(), ParamValue::Float(0.5));
    values.insert("highlights_b".into(), ParamValue::Float(-0.5));
    values.insert("preserve_luminosity".into(), ParamValue::Bool(false));
    let (tones, params) = resolve_params(&values);

    let preview = service
        .render_preview("colorbalance_W1_5", &tones, &params)
        .unwrap();
    assert_eq!((preview.width(), preview.height()), (512, 384));
    assert!(!params.preserve_luminosity);
}
