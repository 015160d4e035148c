use core::{fmt, time::Duration};
use std::{error::Error as StdError, sync::OnceLock};

pub const DEFAULT_API_URL: &str =
    "https://integrations.expensify.com/Integration-Server/ExpensifyIntegrations";

/// A form-encoded POST request to the Integration Server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// A `200 OK` response carrying `body`
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// The error raised by a [Transport] when no response could be obtained.
///
/// It keeps the underlying error untouched: its `Display` is the one of the
/// wrapped error and the original value can be recovered with [TransportError::get_ref]
/// or [TransportError::into_inner].
#[derive(Debug)]
pub struct TransportError {
    inner: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            inner: error.into(),
        }
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.inner
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Performs the outbound HTTP exchange on behalf of the [crate::ExpensifyClient]
///
/// Any `Fn(HttpRequest) -> Result<HttpResponse, TransportError>` is a [Transport],
/// which allows swapping the network for an in-process function.
pub trait Transport: Send + Sync {
    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// The production [Transport], backed by a blocking [reqwest] client.
///
/// The underlying client is only built on the first request.
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    timeout: Option<Duration>,
    client: OnceLock<reqwest::blocking::Client>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, TransportError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            log::debug!("Could not build the HTTP client: {e}");
            TransportError::new(e)
        })?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl Transport for ReqwestTransport {
    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let req = self.client()?.post(&request.url).form(&request.form);
        log::debug!("Initiating POST {}", request.url);
        let res = req.send().map_err(TransportError::new)?;
        log::debug!("res={res:?}");
        let status = res.status();
        let body = res.text().map_err(|e| {
            log::debug!("Could not retrieve body text: {e}");
            TransportError::new(e)
        })?;
        log::debug!("body_str={body}");
        if status.is_client_error() || status.is_server_error() {
            log::debug!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("UNKNOWN")
            );
        }
        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
