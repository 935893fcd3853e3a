//! Serde helpers for `TimeDelta` ↔ f64 second serialization.
//!
//! Renderers and JSON consumers work with fractional seconds, the unit the
//! activity log itself records. Internally durations are `TimeDelta` so date
//! arithmetic stays exact. Apply via `#[serde(with = "crate::serde_duration")]`.

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::time::{as_seconds, from_seconds};

/// Serialize a `TimeDelta` as f64 seconds.
pub fn serialize<S: Serializer>(delta: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
    as_seconds(*delta).serialize(s)
}

/// Deserialize f64 seconds into a `TimeDelta`.
pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TimeDelta, D::Error> {
    let seconds = f64::deserialize(d)?;
    if !seconds.is_finite() {
        return Err(serde::de::Error::custom("duration must be finite"));
    }
    Ok(from_seconds(seconds))
}
