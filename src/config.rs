use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Url,
};

use crate::{
    client::ResolutionClient,
    transport::{ReqwestTransport, Transport, DEFAULT_TIMEOUT},
    Error, Provider, Result,
};

/// Configuration for [`Provider`].
pub struct ProviderConfig<'a> {
    pub(crate) endpoint: String,
    pub(crate) api_key: Option<String>,
    pub(crate) timeout: Duration,
    pub(crate) transport: Option<Box<dyn Transport + Send + Sync + 'a>>,
}

impl<'a> ProviderConfig<'a> {
    /// Create a default configuration for the remote evaluation service at `endpoint`.
    ///
    /// ```
    /// # use remote_flags::ProviderConfig;
    /// ProviderConfig::from_endpoint("http://localhost:1031/");
    /// ```
    pub fn from_endpoint(endpoint: impl Into<String>) -> Self {
        ProviderConfig {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            transport: None,
        }
    }

    /// Authenticate requests with the given API key, sent as a bearer token.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Request timeout of the default transport. Ignored when a custom transport is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom transport instead of the default `reqwest` one.
    ///
    /// ```
    /// # use remote_flags::{HttpRequest, HttpResponse, ProviderConfig, TransportError};
    /// # use reqwest::StatusCode;
    /// let config = ProviderConfig::from_endpoint("http://localhost:1031/").transport(
    ///     |_request: HttpRequest| -> Result<HttpResponse, TransportError> {
    ///         Ok(HttpResponse::new(StatusCode::NOT_FOUND, ""))
    ///     },
    /// );
    /// ```
    pub fn transport(mut self, transport: impl Transport + Send + Sync + 'a) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Create a new [`Provider`] using the specified configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEndpoint`] if the endpoint is not a valid URL.
    /// - [`Error::EndpointCannotBeABase`] if the endpoint cannot carry a path (e.g. `mailto:`).
    /// - [`Error::InvalidApiKey`] if the API key cannot be sent in an HTTP header.
    /// - [`Error::Network`] if the default transport fails to initialize.
    pub fn to_provider(self) -> Result<Provider<'a>> {
        let endpoint = Url::parse(&self.endpoint).map_err(Error::InvalidEndpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::EndpointCannotBeABase);
        }

        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| Error::InvalidApiKey)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::with_timeout(self.timeout)?),
        };

        Ok(Provider::new(ResolutionClient::new(endpoint, headers, transport)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use reqwest::{header::AUTHORIZATION, StatusCode};

    use crate::{
        Error, EvaluationContext, HttpRequest, HttpResponse, ProviderConfig, TransportError,
    };

    fn not_found(_request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(StatusCode::NOT_FOUND, ""))
    }

    #[test]
    fn rejects_malformed_endpoint() {
        let result = ProviderConfig::from_endpoint("not a url")
            .transport(not_found)
            .to_provider();
        assert!(matches!(result, Err(Error::InvalidEndpoint(_))));
    }

    #[test]
    fn rejects_endpoint_without_path() {
        let result = ProviderConfig::from_endpoint("mailto:flags@example.org")
            .transport(not_found)
            .to_provider();
        assert!(matches!(result, Err(Error::EndpointCannotBeABase)));
    }

    #[test]
    fn rejects_api_key_with_invalid_characters() {
        let result = ProviderConfig::from_endpoint("https://flags.example.org/")
            .api_key("line\nbreak")
            .transport(not_found)
            .to_provider();
        assert!(matches!(result, Err(Error::InvalidApiKey)));
    }

    #[test]
    fn sends_api_key_as_sensitive_bearer_token() {
        let seen = Mutex::new(None);
        let provider = ProviderConfig::from_endpoint("https://flags.example.org/")
            .api_key("secret")
            .transport(|request: HttpRequest| -> Result<HttpResponse, TransportError> {
                *seen.lock().unwrap() = Some(request.headers);
                Ok(HttpResponse::new(StatusCode::OK, r#"{"value": true}"#))
            })
            .to_provider()
            .unwrap();

        provider.resolve_boolean("flag", false, &EvaluationContext::new("user"));

        let headers = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn builds_default_transport() {
        assert!(ProviderConfig::from_endpoint("http://localhost:1031/")
            .to_provider()
            .is_ok());
    }
}
