//! A feature flag provider that resolves flags against a remote evaluation service.
//!
//! # Overview
//!
//! The crate revolves around a [`Provider`] that resolves feature flag values for an
//! [`EvaluationContext`], made of a targeting key and arbitrary attributes. Flag evaluation (rules,
//! rollouts) happens entirely on the remote service: for each resolution the provider sends the
//! context to `{endpoint}/v1/feature/{flag_key}/eval`, decodes the answer and checks it against
//! the type the caller asked for.
//!
//! Resolution results are returned as a [`ResolutionResult`] carrying the value along with its
//! variant, [`Reason`], and possibly an error.
//!
//! # Error Handling
//!
//! Resolution never fails with an `Err`. Whenever the flag cannot be resolved, the caller-supplied
//! default value is returned and the failure is classified as one of the [`ErrorKind`]s.
//! [`ResolutionResult::error`] converts it into a [`ResolutionError`] whose display string is
//! `error code: {CODE}: {message}`.
//!
//! Configuration errors are represented by the [`Error`] enum and returned from
//! [`ProviderConfig::to_provider`].
//!
//! # Transport
//!
//! HTTP requests are performed by a [`Transport`]. By default, a blocking `reqwest` client is
//! used ([`ReqwestTransport`]); any other implementation can be injected with
//! [`ProviderConfig::transport`].
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging
//! messages. Consider integrating a `log`-compatible logger implementation for better visibility
//! into provider operations.
//!
//! # Examples
//!
//! Examples can be found in the `demos` directory of the crate repository.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod client;
mod config;
mod context;
mod decoder;
mod error;
mod provider;
mod reconciler;
mod transport;

pub use config::ProviderConfig;
pub use context::{AttributeValue, Attributes, EvaluationContext};
pub use decoder::{decode, DynamicValue, RawEvaluationResponse, Reason};
pub use error::{Error, ErrorKind, ResolutionError, Result};
pub use provider::{Provider, ProviderMetadata, ResolutionResult, SDK_DEFAULT_VARIANT};
pub use reconciler::{reconcile, FlagKind, FlagValue};
pub use transport::{
    HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError, DEFAULT_TIMEOUT,
};
