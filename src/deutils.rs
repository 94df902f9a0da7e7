// src/deutils.rs
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::convert::TryInto;

// Widget settings and positions are hand-edited YAML; quoted numbers show up
// in the wild, so the numeric fields parse either representation.

pub fn deserialize_numeric_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let v = Value::deserialize(deserializer)?;
    let n = v
        .as_u64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| D::Error::custom("non-integer"))?
        .try_into()
        .map_err(|_| D::Error::custom("overflow"))?;
    Ok(n)
}

pub fn deserialize_numeric_f32<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let v = Value::deserialize(deserializer)?;
    let n = v
        .as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| D::Error::custom("non-numeric"))?;
    Ok(n as f32)
}
