use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, StatusCode, Url,
};
use serde::Serialize;

use crate::{
    decoder::{decode, RawEvaluationResponse},
    error::{ErrorKind, ResolutionError},
    transport::{HttpRequest, HttpResponse, Transport},
    EvaluationContext,
};

pub(crate) const UNAUTHORIZED_MESSAGE: &str =
    "invalid token used to contact the remote evaluation service";

/// Body of an evaluation request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationRequest<'a> {
    evaluation_context: &'a EvaluationContext,
    default_value: &'a serde_json::Value,
}

/// Client of the remote evaluation service.
///
/// Each call to [`ResolutionClient::resolve`] issues a single request through the injected
/// [`Transport`] and classifies the outcome. The client keeps no state between calls.
pub struct ResolutionClient<'a> {
    endpoint: Url,
    headers: HeaderMap,
    transport: Box<dyn Transport + Send + Sync + 'a>,
}

impl<'a> ResolutionClient<'a> {
    /// `endpoint` must be able to carry path segments (see [`Url::cannot_be_a_base`]).
    pub(crate) fn new(
        endpoint: Url,
        mut headers: HeaderMap,
        transport: Box<dyn Transport + Send + Sync + 'a>,
    ) -> Self {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        ResolutionClient {
            endpoint,
            headers,
            transport,
        }
    }

    /// Ask the remote service to evaluate `flag_key` for `context`.
    ///
    /// Returns an error without contacting the service if the context has no targeting key.
    pub fn resolve(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default_value: &serde_json::Value,
    ) -> Result<RawEvaluationResponse, ResolutionError> {
        if context.targeting_key().is_empty() {
            return Err(ResolutionError::targeting_key_missing());
        }

        let request = self.build_request(flag_key, context, default_value)?;

        log::debug!(target: "remote_flags",
                    flag_key,
                    targeting_key = context.targeting_key();
                    "sending evaluation request");
        let response = self.transport.send(request).map_err(|err| {
            let cause = err.describe();
            log::warn!(target: "remote_flags",
                       flag_key,
                       error:display = cause;
                       "error while contacting the remote evaluation service");
            ResolutionError::general(format!(
                "impossible to contact the remote evaluation service: {cause}"
            ))
        })?;

        log::debug!(target: "remote_flags",
                    flag_key,
                    status = response.status.as_u16();
                    "received evaluation response");
        classify(flag_key, response)
    }

    fn build_request(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default_value: &serde_json::Value,
    ) -> Result<HttpRequest, ResolutionError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| ResolutionError::general("endpoint cannot carry a path"))?
            .pop_if_empty()
            .extend(["v1", "feature", flag_key, "eval"]);

        let body = serde_json::to_vec(&EvaluationRequest {
            evaluation_context: context,
            default_value,
        })
        .map_err(|err| {
            ResolutionError::general(format!("impossible to serialize evaluation request: {err}"))
        })?;

        Ok(HttpRequest {
            method: Method::POST,
            url,
            headers: self.headers.clone(),
            body,
        })
    }
}

/// Map a raw response to an evaluation or a classified error.
fn classify(
    flag_key: &str,
    response: HttpResponse,
) -> Result<RawEvaluationResponse, ResolutionError> {
    match response.status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            // Never surface the body of an authorization failure.
            log::warn!(target: "remote_flags",
                       flag_key;
                       "client is not authorized. Check your API key");
            Err(ResolutionError::general(UNAUTHORIZED_MESSAGE))
        }
        StatusCode::NOT_FOUND => Err(ResolutionError::flag_not_found(flag_key)),
        status if status.is_success() => {
            let evaluation = decode(flag_key, &response.body)?;
            match remote_error(flag_key, &evaluation) {
                Some(err) => Err(err),
                None => Ok(evaluation),
            }
        }
        status => {
            log::warn!(target: "remote_flags",
                       flag_key,
                       status = status.as_u16();
                       "received non-success response from the remote evaluation service");
            // Servers may still explain the failure in a regular evaluation payload.
            let explained = serde_json::from_slice::<RawEvaluationResponse>(&response.body)
                .ok()
                .and_then(|evaluation| remote_error(flag_key, &evaluation));
            Err(explained.unwrap_or_else(|| {
                ResolutionError::general(format!(
                    "unexpected answer from the remote evaluation service for flag {flag_key}, status code {}",
                    status.as_u16()
                ))
            }))
        }
    }
}

/// Error reported inside an evaluation payload, if any.
///
/// Missing targeting keys and parse errors are only ever detected locally, so those codes coming
/// from the server are reported as [`ErrorKind::General`].
fn remote_error(flag_key: &str, evaluation: &RawEvaluationResponse) -> Option<ResolutionError> {
    let err = match ErrorKind::from_code(&evaluation.error_code)? {
        ErrorKind::FlagNotFound => ResolutionError::flag_not_found(flag_key),
        ErrorKind::TypeMismatch => ResolutionError::type_mismatch(flag_key),
        ErrorKind::TargetingKeyMissing | ErrorKind::ParseError | ErrorKind::General => {
            if evaluation.error_message.is_empty() {
                ResolutionError::general(format!(
                    "flag {flag_key} evaluation failed with error code {}",
                    evaluation.error_code
                ))
            } else {
                ResolutionError::general(evaluation.error_message.clone())
            }
        }
    };
    Some(err)
}
