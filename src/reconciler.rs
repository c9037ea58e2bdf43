use serde::{Deserialize, Serialize};

use crate::{decoder::DynamicValue, error::ResolutionError};

/// Semantic type a caller expects a flag to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagKind {
    /// `true` or `false`.
    Boolean,
    /// A JSON string.
    String,
    /// Any JSON number.
    Float,
    /// A JSON number written without fraction or exponent.
    Int,
    /// Any structured value. Accepts every decoded value, including `null`.
    Object,
}

/// A Rust type that a flag can be resolved to.
///
/// Implemented for `bool`, `String`, `f64`, `i64` and `serde_json::Value`.
pub trait FlagValue: Sized {
    /// Kind requested from the remote service for this type.
    const KIND: FlagKind;

    /// Convert a decoded value to `Self`. Returns `None` if the value has a different type.
    ///
    /// No coercion happens across the boolean/string/number families.
    fn from_dynamic(value: DynamicValue) -> Option<Self>;

    /// JSON representation, used to echo the caller default to the remote service.
    fn to_json(&self) -> serde_json::Value;
}

impl FlagValue for bool {
    const KIND: FlagKind = FlagKind::Boolean;

    fn from_dynamic(value: DynamicValue) -> Option<Self> {
        match value {
            DynamicValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        (*self).into()
    }
}

impl FlagValue for String {
    const KIND: FlagKind = FlagKind::String;

    fn from_dynamic(value: DynamicValue) -> Option<Self> {
        match value {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        self.clone().into()
    }
}

impl FlagValue for f64 {
    const KIND: FlagKind = FlagKind::Float;

    fn from_dynamic(value: DynamicValue) -> Option<Self> {
        match value {
            DynamicValue::Float(f) => Some(f),
            DynamicValue::Int(i) => Some(i as f64),
            // Integers above `i64::MAX`.
            DynamicValue::Object(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        (*self).into()
    }
}

impl FlagValue for i64 {
    const KIND: FlagKind = FlagKind::Int;

    fn from_dynamic(value: DynamicValue) -> Option<Self> {
        // Fractional numbers (and integral ones written with a fraction, like `100.0`) are
        // rejected rather than truncated.
        match value {
            DynamicValue::Int(i) => Some(i),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        (*self).into()
    }
}

impl FlagValue for serde_json::Value {
    const KIND: FlagKind = FlagKind::Object;

    fn from_dynamic(value: DynamicValue) -> Option<Self> {
        Some(value.into())
    }

    fn to_json(&self) -> serde_json::Value {
        self.clone()
    }
}

/// Check `value` against the type requested by the caller.
pub fn reconcile<T: FlagValue>(
    flag_key: &str,
    value: DynamicValue,
) -> Result<T, ResolutionError> {
    T::from_dynamic(value).ok_or_else(|| {
        log::debug!(target: "remote_flags",
                    flag_key,
                    expected:debug = T::KIND;
                    "flag value has unexpected type");
        ResolutionError::type_mismatch(flag_key)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{decoder::DynamicValue, ErrorKind};

    use super::{reconcile, FlagKind, FlagValue};

    fn all_values() -> Vec<DynamicValue> {
        vec![
            DynamicValue::Null,
            DynamicValue::Bool(true),
            DynamicValue::Int(100),
            DynamicValue::Float(100.25),
            DynamicValue::String("CC0000".to_owned()),
            DynamicValue::Object(json!({"test": "test1"})),
            DynamicValue::Object(json!([1, 2])),
        ]
    }

    #[test]
    fn exact_kind_passes_through() {
        assert_eq!(reconcile::<bool>("f", DynamicValue::Bool(true)), Ok(true));
        assert_eq!(
            reconcile::<String>("f", DynamicValue::String("CC0000".to_owned())),
            Ok("CC0000".to_owned())
        );
        assert_eq!(reconcile::<f64>("f", DynamicValue::Float(100.25)), Ok(100.25));
        assert_eq!(reconcile::<i64>("f", DynamicValue::Int(100)), Ok(100));
    }

    #[test]
    fn no_coercion_between_families() {
        let err = reconcile::<bool>("string_key", DynamicValue::String("true".to_owned()))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.message, "unexpected type for flag string_key");

        assert!(reconcile::<String>("f", DynamicValue::Bool(true)).is_err());
        assert!(reconcile::<f64>("f", DynamicValue::String("1.5".to_owned())).is_err());
        assert!(reconcile::<i64>("f", DynamicValue::Bool(false)).is_err());
    }

    #[test]
    fn integers_widen_to_float() {
        assert_eq!(reconcile::<f64>("f", DynamicValue::Int(100)), Ok(100.0));
        let huge = DynamicValue::from(json!(u64::MAX));
        assert_eq!(reconcile::<f64>("f", huge.clone()), Ok(u64::MAX as f64));
        assert!(reconcile::<i64>("f", huge.clone()).is_err());
        assert_eq!(reconcile::<serde_json::Value>("f", huge), Ok(json!(u64::MAX)));
    }

    #[test]
    fn fractional_numbers_are_not_integers() {
        assert!(reconcile::<i64>("f", DynamicValue::Float(100.25)).is_err());
        assert!(reconcile::<i64>("f", DynamicValue::Float(100.0)).is_err());
    }

    #[test]
    fn object_accepts_everything() {
        for value in all_values() {
            let expected = serde_json::Value::from(value.clone());
            assert_eq!(reconcile::<serde_json::Value>("f", value), Ok(expected));
        }
    }

    #[test]
    fn each_scalar_kind_accepts_only_its_family() {
        let accepted = |kind: FlagKind| {
            all_values()
                .into_iter()
                .filter(|value| match kind {
                    FlagKind::Boolean => bool::from_dynamic(value.clone()).is_some(),
                    FlagKind::String => String::from_dynamic(value.clone()).is_some(),
                    FlagKind::Float => f64::from_dynamic(value.clone()).is_some(),
                    FlagKind::Int => i64::from_dynamic(value.clone()).is_some(),
                    FlagKind::Object => serde_json::Value::from_dynamic(value.clone()).is_some(),
                })
                .count()
        };

        assert_eq!(accepted(FlagKind::Boolean), 1);
        assert_eq!(accepted(FlagKind::String), 1);
        assert_eq!(accepted(FlagKind::Float), 2);
        assert_eq!(accepted(FlagKind::Int), 1);
        assert_eq!(accepted(FlagKind::Object), all_values().len());
    }

    #[test]
    fn echoes_defaults_as_json() {
        assert_eq!(false.to_json(), json!(false));
        assert_eq!("default".to_owned().to_json(), json!("default"));
        assert_eq!(123.45_f64.to_json(), json!(123.45));
        assert_eq!(123_i64.to_json(), json!(123));
        assert_eq!(json!({"a": null}).to_json(), json!({"a": null}));
    }
}
