//! Tests for envelope encoding

use std::time::Duration;

use prometheus_task_queue::core::codec::{decode, encode, CODEC_VERSION};
use prometheus_task_queue::core::{Envelope, EnvelopeOptions, QueuedMessage};

#[test]
fn test_encoded_form_is_versioned_json() {
    let env = Envelope::from_message(&"abc", EnvelopeOptions::new());
    let bytes = encode(&env).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["v"], u64::from(CODEC_VERSION));
    assert_eq!(value["timeout"], serde_json::json!({"secs": 3600, "nanos": 0}));
    assert_eq!(value["retry_count"], 0);
    assert_eq!(
        value["retry_delay"],
        serde_json::json!({"secs": 0, "nanos": 100_000_000})
    );
    assert_eq!(value["body"], serde_json::json!([97, 98, 99]));
}

#[test]
fn test_envelope_encode_caches_raw_bytes() {
    let mut env = Envelope::from_message(
        &b"\x00\xffbinary".to_vec(),
        EnvelopeOptions::new().with_timeout(Duration::from_secs(2)),
    );
    env.encode().unwrap();

    let decoded = decode(env.bytes()).unwrap();
    assert_eq!(decoded.payload(), b"\x00\xffbinary");
    assert_eq!(decoded.timeout(), Duration::from_secs(2));
}

#[test]
fn test_encoded_envelope_can_be_requeued_as_message() {
    let mut original = Envelope::from_message(&"nested", EnvelopeOptions::new());
    original.encode().unwrap();

    let outer = Envelope::from_message(&original, EnvelopeOptions::new());
    let inner = Envelope::decode(outer.payload()).unwrap();
    assert_eq!(inner.payload(), b"nested");
    assert_eq!(inner.id(), original.id());
}
