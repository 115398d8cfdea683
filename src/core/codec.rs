//! Versioned encoding of an envelope's transportable fields.
//!
//! Only the payload and execution metadata are encoded. The callable task
//! has no byte representation and is never written; decoded envelopes are
//! always payload envelopes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CodecError, Envelope, EnvelopeOptions};

/// Current encoding version.
pub const CODEC_VERSION: u8 = 1;

#[derive(Deserialize)]
struct VersionProbe {
    v: u8,
}

#[derive(Serialize, Deserialize)]
struct EncodedEnvelope {
    v: u8,
    id: Uuid,
    /// Serialized as `{secs, nanos}`.
    timeout: Duration,
    body: Vec<u8>,
    retry_count: u32,
    retry_delay: Duration,
}

/// Encode an envelope into its flat byte form.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if serialization fails.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
    let encoded = EncodedEnvelope {
        v: CODEC_VERSION,
        id: envelope.id(),
        timeout: envelope.timeout(),
        body: envelope.payload().to_vec(),
        retry_count: envelope.retry_count(),
        retry_delay: envelope.retry_delay(),
    };
    Ok(serde_json::to_vec(&encoded)?)
}

/// Decode an envelope from its flat byte form.
///
/// # Errors
///
/// - `CodecError::UnsupportedVersion` if the bytes carry an unknown version
/// - `CodecError::Malformed` if the bytes are not an encoded envelope
pub fn decode(bytes: &[u8]) -> Result<Envelope, CodecError> {
    let probe: VersionProbe = serde_json::from_slice(bytes)?;
    if probe.v != CODEC_VERSION {
        return Err(CodecError::UnsupportedVersion(probe.v));
    }
    let encoded: EncodedEnvelope = serde_json::from_slice(bytes)?;
    let opts = EnvelopeOptions::new()
        .with_exact_timeout(encoded.timeout)
        .with_retry_count(encoded.retry_count)
        .with_retry_delay(encoded.retry_delay);
    Ok(Envelope::from_parts(encoded.id, None, encoded.body, opts))
}
