//! Decoding of evaluation responses returned by the remote service.
use std::{collections::HashMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ResolutionError;

/// Evaluation payload as sent by the remote service.
///
/// Unknown fields are ignored and every field is optional, so newer servers can extend the
/// payload without breaking older clients. An explicit `null` is treated like a missing field.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvaluationResponse {
    /// Resolved value. `null` when absent.
    pub value: DynamicValue,
    /// Name of the variation that was served.
    #[serde(alias = "variationType", deserialize_with = "null_as_default")]
    pub variant: String,
    /// Open-ended reason string. See [`Reason`].
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
    /// Empty when evaluation succeeded.
    #[serde(deserialize_with = "null_as_default")]
    pub error_code: String,
    /// Server-side explanation accompanying `error_code`.
    #[serde(deserialize_with = "null_as_default")]
    pub error_message: String,
    /// Whether the remote evaluation failed.
    #[serde(deserialize_with = "null_as_default")]
    pub failed: bool,
    /// Whether the server asks for evaluation events to be tracked.
    #[serde(deserialize_with = "null_as_default")]
    pub track_events: bool,
    /// Version of the flag configuration that was evaluated.
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    /// Free-form metadata attached to the flag.
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a response body for `flag_key`.
///
/// The body must be a JSON object. On failure, the error message carries the full body so the
/// offending payload can be inspected.
pub fn decode(flag_key: &str, body: &[u8]) -> Result<RawEvaluationResponse, ResolutionError> {
    let parsed = serde_json::from_slice::<serde_json::Value>(body)
        .and_then(|json| {
            if json.is_object() {
                serde_json::from_value::<RawEvaluationResponse>(json)
            } else {
                Err(serde::de::Error::custom("expected a JSON object"))
            }
        });

    parsed.map_err(|err| {
        log::warn!(target: "remote_flags",
                   flag_key,
                   error:display = err;
                   "failed to parse evaluation response body");
        ResolutionError::parse_error(flag_key, body)
    })
}

/// Dynamically typed flag value, as decoded from the wire.
///
/// Numbers written without a fraction or exponent that fit `i64` decode as [`DynamicValue::Int`];
/// numbers with a fraction or exponent decode as [`DynamicValue::Float`]. Objects and arrays are
/// kept as-is in [`DynamicValue::Object`], and so are integers above `i64::MAX`, which would lose
/// precision as a float.
#[derive(Debug, Default, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum DynamicValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Object(serde_json::Value),
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DynamicValue::Int(i)
                } else if n.is_u64() {
                    DynamicValue::Object(serde_json::Value::Number(n))
                } else {
                    DynamicValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => DynamicValue::String(s),
            object @ (serde_json::Value::Object(_) | serde_json::Value::Array(_)) => {
                DynamicValue::Object(object)
            }
        }
    }
}

impl From<DynamicValue> for serde_json::Value {
    fn from(value: DynamicValue) -> Self {
        match value {
            DynamicValue::Null => serde_json::Value::Null,
            DynamicValue::Bool(b) => b.into(),
            DynamicValue::Int(i) => i.into(),
            // Non-finite floats have no JSON representation and become null.
            DynamicValue::Float(f) => f.into(),
            DynamicValue::String(s) => s.into(),
            DynamicValue::Object(v) => v,
        }
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(DynamicValue::from)
    }
}

/// Reason why a particular value was returned.
///
/// The set of reasons is open: anything the server sends that is not recognized is kept verbatim
/// in [`Reason::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Reason {
    TargetingMatch,
    Split,
    Disabled,
    Default,
    Static,
    Cached,
    Unknown,
    Stale,
    Error,
    Custom(String),
}

impl Reason {
    /// Wire representation of the reason.
    pub fn as_str(&self) -> &str {
        match self {
            Reason::TargetingMatch => "TARGETING_MATCH",
            Reason::Split => "SPLIT",
            Reason::Disabled => "DISABLED",
            Reason::Default => "DEFAULT",
            Reason::Static => "STATIC",
            Reason::Cached => "CACHED",
            Reason::Unknown => "UNKNOWN",
            Reason::Stale => "STALE",
            Reason::Error => "ERROR",
            Reason::Custom(s) => s,
        }
    }
}

impl From<&str> for Reason {
    fn from(value: &str) -> Self {
        match value {
            "TARGETING_MATCH" => Reason::TargetingMatch,
            "SPLIT" => Reason::Split,
            "DISABLED" => Reason::Disabled,
            "DEFAULT" => Reason::Default,
            "STATIC" => Reason::Static,
            "CACHED" => Reason::Cached,
            "UNKNOWN" => Reason::Unknown,
            "STALE" => Reason::Stale,
            "ERROR" => Reason::Error,
            other => Reason::Custom(other.to_owned()),
        }
    }
}

impl From<String> for Reason {
    fn from(value: String) -> Self {
        match Reason::from(value.as_str()) {
            Reason::Custom(_) => Reason::Custom(value),
            known => known,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Reason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
