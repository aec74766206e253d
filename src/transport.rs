//! HTTP transport for the rental service's single GET endpoint.

use crate::config::ClientConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::fmt::{self, Display, Formatter};
use std::future::Future;
use thiserror::Error;
use url::Url;

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://api.fxhyd.cn/UserInterface.aspx";

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.1; Trident/7.0; rv:11.0) like Gecko";

/// Actions understood by the service endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    GetAccountInfo,
    GetMobile,
    Release,
    GetSms,
    AddIgnore,
}

impl Action {
    /// The `action` query parameter value for this action.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::GetAccountInfo => "getaccountinfo",
            Self::GetMobile => "getmobile",
            Self::Release => "release",
            Self::GetSms => "getsms",
            Self::AddIgnore => "addignore",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Transport-level failures. These surface to callers unchanged; the
/// transport never interprets provider semantics and never retries.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Failed to build the request URL.
    #[error("failed to build request URL: {0}")]
    BuildRequestUrl(#[source] serde_urlencoded::ser::Error),

    /// A configured header name or value is not valid.
    #[error("invalid header: {name}")]
    InvalidHeader { name: String },

    /// Failed to send the HTTP request.
    #[error("failed to send HTTP request: {0}")]
    HttpRequest(#[from] reqwest_middleware::Error),

    /// Failed to read the response body.
    #[error("failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),
}

/// Issues a single GET against the service endpoint and returns the raw
/// response body. Pure I/O: no retry logic, no response interpretation.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Perform `action` with the given query parameters.
    fn call(
        &self,
        action: Action,
        params: Vec<(&'static str, String)>,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Transport backed by `reqwest` with middleware support.
#[derive(Clone)]
pub struct HttpTransport {
    http_client: ClientWithMiddleware,
    endpoint: Url,
    headers: HeaderMap,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Builder for configuring an [`HttpTransport`].
pub struct HttpTransportBuilder {
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    user_agent: String,
    headers: Vec<(String, String)>,
}

impl HttpTransportBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            http_client: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
        }
    }

    /// Set a custom service endpoint.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set a custom HTTP client with middleware.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Override the User-Agent header value.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = value.into();
        self
    }

    /// Add an extra request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Build the [`HttpTransport`].
    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None => Url::parse(DEFAULT_ENDPOINT).expect("invalid default endpoint"),
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let client = reqwest::Client::builder()
                    .build()
                    .map_err(TransportError::BuildHttpClient)?;
                ClientBuilder::new(client).build()
            }
        };

        let mut headers = HeaderMap::new();
        let ua = HeaderValue::from_str(&self.user_agent).map_err(|_| {
            TransportError::InvalidHeader {
                name: USER_AGENT.as_str().to_string(),
            }
        })?;
        headers.insert(USER_AGENT, ua);

        for (name, value) in self.headers {
            let header_name = name.parse::<HeaderName>().map_err(|_| {
                TransportError::InvalidHeader { name: name.clone() }
            })?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|_| TransportError::InvalidHeader { name })?;
            headers.insert(header_name, header_value);
        }

        Ok(HttpTransport {
            http_client,
            endpoint,
            headers,
        })
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a builder for configuring the transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Build a transport from a resolved client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Self::builder()
            .endpoint(config.endpoint.clone())
            .user_agent(&config.user_agent);
        for (name, value) in &config.headers {
            builder = builder.header(name, value);
        }
        builder.build()
    }

    /// Build the request URL with the action and parameters URL-encoded.
    fn build_request_url(
        &self,
        action: Action,
        params: &[(&'static str, String)],
    ) -> Result<Url, TransportError> {
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        pairs.push(("action", action.wire_name()));
        for (key, value) in params {
            pairs.push((key, value.as_str()));
        }

        let query =
            serde_urlencoded::to_string(&pairs).map_err(TransportError::BuildRequestUrl)?;

        let mut url = self.endpoint.clone();
        url.set_query(Some(&query));
        Ok(url)
    }
}

impl Transport for HttpTransport {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HttpTransport::call",
            skip_all,
            fields(action = %action)
        )
    )]
    async fn call(
        &self,
        action: Action,
        params: Vec<(&'static str, String)>,
    ) -> Result<String, TransportError> {
        let url = self.build_request_url(action, &params)?;

        let response = self
            .http_client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;

        response.text().await.map_err(TransportError::ReadBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_action_wire_names() {
        assert_eq!(Action::Login.wire_name(), "login");
        assert_eq!(Action::GetAccountInfo.wire_name(), "getaccountinfo");
        assert_eq!(Action::GetMobile.wire_name(), "getmobile");
        assert_eq!(Action::Release.wire_name(), "release");
        assert_eq!(Action::GetSms.wire_name(), "getsms");
        assert_eq!(Action::AddIgnore.wire_name(), "addignore");
    }

    #[test]
    fn test_default_endpoint_parses() {
        let transport = HttpTransport::builder().build().unwrap();
        assert_eq!(transport.endpoint.as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let result = HttpTransport::builder()
            .header("x-custom", "bad\nvalue")
            .build();
        assert!(matches!(
            result,
            Err(TransportError::InvalidHeader { name }) if name == "x-custom"
        ));
    }

    #[tokio::test]
    async fn test_call_sends_action_and_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("action", "getmobile"))
            .and(query_param("token", "tok123"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("success|13800001234"))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::builder()
            .endpoint(Url::parse(&mock_server.uri()).unwrap())
            .build()
            .unwrap();

        let body = transport
            .call(
                Action::GetMobile,
                vec![("token", "tok123".to_string())],
            )
            .await
            .unwrap();
        assert_eq!(body, "success|13800001234");
    }
}
