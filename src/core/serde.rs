use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Serializes Duration as whole seconds
pub fn serialize_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    duration.as_secs().serialize(serializer)
}

/// Deserializes Duration from whole seconds
pub fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientSecs {
    Int(i64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Deserializes the highlight expiry, falling back to the default on any
/// value that is not a positive number of seconds
pub fn deserialize_highlight_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = match LenientSecs::deserialize(deserializer)? {
        LenientSecs::Int(secs) => secs,
        LenientSecs::Text(text) => text.trim().parse::<i64>().unwrap_or(0),
        LenientSecs::Other(_) => 0,
    };

    if secs > 0 {
        Ok(Duration::from_secs(secs as u64))
    } else {
        Ok(super::DEFAULT_HIGHLIGHT_EXPIRY)
    }
}
