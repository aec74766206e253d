//! Client configuration.
//!
//! Configuration is resolved once, at construction time, with field-by-field
//! precedence: explicit builder argument > [`ConfigStore`] value > hard
//! default. The resulting [`ClientConfig`] is immutable.

use crate::transport::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
use secrecy::SecretString;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Default interval between SMS poll attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default maximum wall-clock time to wait for an SMS.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(180);

/// Environment variable that overrides the default User-Agent.
pub const USER_AGENT_ENV: &str = "YM_USERAGENT";

/// Key/value store supplying configuration defaults.
///
/// Loading and persistence live outside this crate; the client only reads
/// values, once, while the config is built. Recognized keys: `username`,
/// `password`, `token`, `item_id`, `exclude_no`, `poll_interval`,
/// `max_wait`. Empty values are treated as unset.
pub trait ConfigStore {
    /// Look up a configuration value by key.
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory [`ConfigStore`] for tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    values: HashMap<String, String>,
}

impl MemoryConfig {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning self for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Resolved, immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service endpoint.
    pub endpoint: Url,
    /// Account username, for token resolution via login.
    pub username: Option<String>,
    /// Account password, for token resolution via login.
    pub password: Option<SecretString>,
    /// Pre-issued auth token. Takes precedence over username/password.
    pub token: Option<SecretString>,
    /// Default item (number pool) identifier.
    pub item_id: Option<u32>,
    /// Number prefixes/IDs the provider should avoid issuing.
    pub exclude: Vec<String>,
    /// Interval between SMS poll attempts.
    pub poll_interval: Duration,
    /// Maximum wall-clock time to wait for an SMS.
    pub max_wait: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Create a new builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    endpoint: Option<Url>,
    username: Option<String>,
    password: Option<SecretString>,
    token: Option<SecretString>,
    item_id: Option<u32>,
    exclude: Option<Vec<String>>,
    poll_interval: Option<Duration>,
    max_wait: Option<Duration>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
}

impl ClientConfigBuilder {
    /// Create a builder with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom service endpoint.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set the account username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the account password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set a pre-issued auth token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the default item identifier.
    pub fn item_id(mut self, item_id: u32) -> Self {
        self.item_id = Some(item_id);
        self
    }

    /// Set the exclusion list.
    pub fn exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(exclude.into_iter().map(Into::into).collect());
        self
    }

    /// Set the interval between SMS poll attempts.
    ///
    /// Default: 5 seconds
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the maximum wall-clock time to wait for an SMS.
    ///
    /// Default: 180 seconds
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Override the User-Agent header value.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    /// Add an extra request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Fill fields not set explicitly from a [`ConfigStore`].
    ///
    /// The store is read once, here. Malformed numeric values are ignored.
    pub fn from_store(mut self, store: &dyn ConfigStore) -> Self {
        fn value(store: &dyn ConfigStore, key: &str) -> Option<String> {
            store.get(key).filter(|v| !v.is_empty())
        }

        if self.username.is_none() {
            self.username = value(store, "username");
        }
        if self.password.is_none() {
            self.password = value(store, "password").map(SecretString::from);
        }
        if self.token.is_none() {
            self.token = value(store, "token").map(SecretString::from);
        }
        if self.item_id.is_none() {
            self.item_id = value(store, "item_id").and_then(|v| v.parse().ok());
        }
        if self.exclude.is_none() {
            self.exclude = value(store, "exclude_no")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect());
        }
        if self.poll_interval.is_none() {
            self.poll_interval = value(store, "poll_interval")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.max_wait.is_none() {
            self.max_wait = value(store, "max_wait")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }

        self
    }

    /// Build the [`ClientConfig`], applying hard defaults for unset fields.
    pub fn build(self) -> ClientConfig {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| Url::parse(DEFAULT_ENDPOINT).expect("invalid default endpoint"));

        let user_agent = self.user_agent.unwrap_or_else(|| {
            std::env::var(USER_AGENT_ENV).unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string())
        });

        ClientConfig {
            endpoint,
            username: self.username,
            password: self.password,
            token: self.token,
            item_id: self.item_id,
            exclude: self.exclude.unwrap_or_default(),
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            max_wait: self.max_wait.unwrap_or(DEFAULT_MAX_WAIT),
            user_agent,
            headers: self.headers,
        }
    }
}
