use std::collections::HashMap;

use serde::Serialize;

use crate::{
    client::ResolutionClient,
    decoder::Reason,
    error::{ErrorKind, ResolutionError},
    reconciler::{reconcile, FlagValue},
    EvaluationContext,
};

/// Variant reported when the caller default is returned for a disabled flag.
pub const SDK_DEFAULT_VARIANT: &str = "SdkDefault";

/// Typed outcome of a flag resolution.
///
/// If `error_code` is set, `value` is the caller-supplied default and `reason` is
/// [`Reason::Error`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult<T> {
    /// Resolved value, or the caller default.
    pub value: T,
    /// Variation served by the remote service. [`SDK_DEFAULT_VARIANT`] for disabled flags and
    /// empty on error.
    pub variant: String,
    /// Why this value was returned.
    pub reason: Reason,
    /// Set if and only if resolution failed.
    pub error_code: Option<ErrorKind>,
    /// Empty unless `error_code` is set.
    pub error_message: String,
    /// Metadata attached to the flag by the remote service.
    pub flag_metadata: HashMap<String, serde_json::Value>,
}

impl<T> ResolutionResult<T> {
    fn from_error(default_value: T, err: ResolutionError) -> Self {
        ResolutionResult {
            value: default_value,
            variant: String::new(),
            reason: Reason::Error,
            error_code: Some(err.kind),
            error_message: err.message,
            flag_metadata: HashMap::new(),
        }
    }

    fn disabled(default_value: T, flag_metadata: HashMap<String, serde_json::Value>) -> Self {
        ResolutionResult {
            value: default_value,
            variant: SDK_DEFAULT_VARIANT.to_owned(),
            reason: Reason::Disabled,
            error_code: None,
            error_message: String::new(),
            flag_metadata,
        }
    }

    /// Return `true` if the resolution failed and `value` holds the caller default.
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }

    /// The classified error, if resolution failed. Its `Display` output is
    /// `error code: {CODE}: {message}`.
    pub fn error(&self) -> Option<ResolutionError> {
        self.error_code
            .map(|kind| ResolutionError::new(kind, self.error_message.clone()))
    }
}

/// Static description of the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderMetadata {
    /// Provider name, `remote-flags`.
    pub name: &'static str,
}

/// Feature flag provider backed by a remote evaluation service.
///
/// In order to create a provider instance, first create [`ProviderConfig`](crate::ProviderConfig).
///
/// Every resolution is a single independent call to the remote service. Failures are never
/// returned as `Err`: the caller default is returned instead, along with the classified error in
/// the [`ResolutionResult`].
///
/// # Examples
/// ```no_run
/// # use remote_flags::{EvaluationContext, ProviderConfig};
/// let provider = ProviderConfig::from_endpoint("http://localhost:1031/")
///     .to_provider()
///     .unwrap();
/// let context = EvaluationContext::new("user-id").with_attribute("email", "john@example.org");
/// let enabled = provider.resolve_boolean("new-checkout", false, &context).value;
/// ```
pub struct Provider<'a> {
    client: ResolutionClient<'a>,
}

impl<'a> Provider<'a> {
    pub(crate) fn new(client: ResolutionClient<'a>) -> Self {
        Provider { client }
    }

    /// Describe this provider to the calling framework.
    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "remote-flags",
        }
    }

    /// Resolve `flag_key` to a value of type `T`, falling back to `default_value` on any failure
    /// and when the flag is disabled.
    ///
    /// The typed entry points ([`Provider::resolve_boolean`], [`Provider::resolve_string`],
    /// [`Provider::resolve_float`], [`Provider::resolve_int`], [`Provider::resolve_object`]) all
    /// delegate here.
    pub fn resolve<T: FlagValue>(
        &self,
        flag_key: &str,
        default_value: T,
        context: &EvaluationContext,
    ) -> ResolutionResult<T> {
        let evaluation = match self
            .client
            .resolve(flag_key, context, &default_value.to_json())
        {
            Ok(evaluation) => evaluation,
            Err(err) => {
                log::debug!(target: "remote_flags",
                            flag_key,
                            error:display = err;
                            "returning default value after failed resolution");
                return ResolutionResult::from_error(default_value, err);
            }
        };

        if Reason::from(evaluation.reason.as_str()) == Reason::Disabled {
            log::debug!(target: "remote_flags", flag_key; "flag is disabled");
            return ResolutionResult::disabled(default_value, evaluation.metadata);
        }

        match reconcile::<T>(flag_key, evaluation.value) {
            Ok(value) => ResolutionResult {
                value,
                variant: evaluation.variant,
                reason: evaluation.reason.into(),
                error_code: None,
                error_message: String::new(),
                flag_metadata: evaluation.metadata,
            },
            Err(err) => ResolutionResult::from_error(default_value, err),
        }
    }

    /// Resolve a boolean flag.
    pub fn resolve_boolean(
        &self,
        flag_key: &str,
        default_value: bool,
        context: &EvaluationContext,
    ) -> ResolutionResult<bool> {
        self.resolve(flag_key, default_value, context)
    }

    /// Resolve a string flag.
    pub fn resolve_string(
        &self,
        flag_key: &str,
        default_value: impl Into<String>,
        context: &EvaluationContext,
    ) -> ResolutionResult<String> {
        self.resolve(flag_key, default_value.into(), context)
    }

    /// Resolve a floating point flag. Integral numbers are accepted as well.
    pub fn resolve_float(
        &self,
        flag_key: &str,
        default_value: f64,
        context: &EvaluationContext,
    ) -> ResolutionResult<f64> {
        self.resolve(flag_key, default_value, context)
    }

    /// Resolve an integer flag. Numbers with a fractional part are a type mismatch.
    pub fn resolve_int(
        &self,
        flag_key: &str,
        default_value: i64,
        context: &EvaluationContext,
    ) -> ResolutionResult<i64> {
        self.resolve(flag_key, default_value, context)
    }

    /// Resolve a flag to an arbitrary JSON value.
    pub fn resolve_object(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: &EvaluationContext,
    ) -> ResolutionResult<serde_json::Value> {
        self.resolve(flag_key, default_value, context)
    }
}
