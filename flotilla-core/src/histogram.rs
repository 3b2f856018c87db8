//! Compressed latency histogram codec.
//!
//! Workers record latencies in microseconds and ship each distribution as a
//! V2-deflate compressed payload. Decoding requires the trackable-value bound
//! the field was defined with; a payload recording values beyond that bound is
//! a deterministic error, never a silent truncation.

use std::io::Cursor;

use hdrhistogram::serialization::{Deserializer, Serializer, V2DeflateSerializer};
use hdrhistogram::Histogram;
use thiserror::Error;

/// Highest publish latency a worker histogram tracks, in microseconds.
pub const PUBLISH_LATENCY_MAX_MICROS: u64 = 60 * 1_000_000;

/// Highest publish-to-broker delay a worker histogram tracks, in microseconds.
pub const PUBLISH_DELAY_LATENCY_MAX_MICROS: u64 = 30 * 1_000_000;

/// Highest end-to-end latency a worker histogram tracks, in microseconds.
pub const END_TO_END_LATENCY_MAX_MICROS: u64 = 12 * 60 * 60 * 1_000_000;

/// Significant value digits used by every latency histogram on the wire.
pub const LATENCY_SIGFIGS: u8 = 5;

pub type Result<T> = std::result::Result<T, HistogramCodecError>;

#[derive(Debug, Error)]
pub enum HistogramCodecError {
    #[error("malformed compressed histogram payload: {0}")]
    Malformed(String),

    #[error("histogram payload records values above the trackable bound of {bound} us")]
    BoundExceeded { bound: u64 },

    #[error("unable to allocate histogram with bound {bound} us: {detail}")]
    Creation { bound: u64, detail: String },

    #[error("unable to compress histogram: {0}")]
    Encode(String),
}

/// Creates an empty histogram bounded at `max_micros`, matching the wire
/// contract for that latency field. The histogram does not auto-resize, so
/// the bound is enforced on every later union.
pub fn empty(max_micros: u64) -> Result<Histogram<u64>> {
    Histogram::new_with_bounds(1, max_micros, LATENCY_SIGFIGS).map_err(|e| {
        HistogramCodecError::Creation {
            bound: max_micros,
            detail: format!("{e:?}"),
        }
    })
}

/// Decodes one worker's compressed payload at the field's trackable bound.
pub fn decode(bytes: &[u8], max_micros: u64) -> Result<Histogram<u64>> {
    let mut target = empty(max_micros)?;
    decode_into(&mut target, bytes, max_micros)?;
    Ok(target)
}

/// Decodes `bytes` and unions the recorded samples into `target`.
///
/// A payload encoded against a larger bound than `max_micros` fails here with
/// [`HistogramCodecError::BoundExceeded`] rather than dropping samples.
pub fn decode_into(target: &mut Histogram<u64>, bytes: &[u8], max_micros: u64) -> Result<()> {
    let mut deserializer = Deserializer::new();
    let decoded: Histogram<u64> = deserializer
        .deserialize(&mut Cursor::new(bytes))
        .map_err(|e| HistogramCodecError::Malformed(format!("{e:?}")))?;

    target
        .add(&decoded)
        .map_err(|_| HistogramCodecError::BoundExceeded { bound: max_micros })
}

/// Compresses a histogram into the wire payload format.
pub fn encode(histogram: &Histogram<u64>) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    let mut serializer = V2DeflateSerializer::new();
    serializer
        .serialize(histogram, &mut payload)
        .map_err(|e| HistogramCodecError::Encode(format!("{e:?}")))?;
    Ok(payload)
}
