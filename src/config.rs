use crate::constants::{DEFAULT_ADDRESS, DEFAULT_CONTENT_TYPE, DEFAULT_TIMEOUT_SECS, DEFAULT_VERSION};
use crate::error::SdkError;
use std::fmt;
use std::time::Duration;

/// SDK configuration.
///
/// Built with the `with_*` setters, starting from [`Config::default`]:
///
/// ```rust,ignore
/// let config = Config::default()
///     .with_access_id("084f95e5e2bf3f79d5f2fd069f4f5e7c")
///     .with_access_key("5L/1P8XJ2dIWIMGEHkrZ6gE0HGKvyd/4MKcyQ04oEfE=")
///     .with_address("https://open-api.test.junyouchain.com");
/// ```
#[derive(Clone)]
pub struct Config {
    /// Access id identifying the API caller.
    pub access_id: String,
    /// Base64 encoded HMAC signing secret.
    pub access_key: String,
    pub version: String,
    /// Base address every endpoint path is resolved against.
    pub address: String,
    pub content_type: String,
    /// Client-wide timeout applied to every request.
    pub timeout: Duration,
    /// Mask `X-Signature` and `X-Open-Auth` in request logs.
    pub redact_sensitive_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_id: String::new(),
            access_key: String::new(),
            version: DEFAULT_VERSION.to_string(),
            address: DEFAULT_ADDRESS.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            redact_sensitive_headers: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present. Looks for:
    /// - `JUNYOU_ACCESS_ID` / `JUNYOU_ACCESS_KEY` (required)
    /// - `JUNYOU_ADDRESS`, `JUNYOU_VERSION`, `JUNYOU_TIMEOUT_SECS` (optional)
    pub fn from_env() -> Result<Self, SdkError> {
        dotenvy::dotenv().ok();

        let access_id = std::env::var("JUNYOU_ACCESS_ID")
            .map_err(|_| SdkError::Config("JUNYOU_ACCESS_ID environment variable is required".into()))?;
        let access_key = std::env::var("JUNYOU_ACCESS_KEY")
            .map_err(|_| SdkError::Config("JUNYOU_ACCESS_KEY environment variable is required".into()))?;

        let mut config = Self::default()
            .with_access_id(access_id)
            .with_access_key(access_key);

        if let Ok(address) = std::env::var("JUNYOU_ADDRESS") {
            config = config.with_address(address);
        }
        if let Ok(version) = std::env::var("JUNYOU_VERSION") {
            config = config.with_version(version);
        }
        if let Ok(secs) = std::env::var("JUNYOU_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| SdkError::Config("JUNYOU_TIMEOUT_SECS must be a number".into()))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_access_id(mut self, access_id: impl Into<String>) -> Self {
        self.access_id = access_id.into();
        self
    }

    pub fn with_access_key(mut self, access_key: impl Into<String>) -> Self {
        self.access_key = access_key.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_redact_sensitive_headers(mut self, redact: bool) -> Self {
        self.redact_sensitive_headers = redact;
        self
    }

    /// Fill blank optional fields with their defaults.
    pub(crate) fn apply_defaults(&mut self) {
        if self.address.is_empty() {
            self.address = DEFAULT_ADDRESS.to_string();
        }
        if self.version.is_empty() {
            self.version = DEFAULT_VERSION.to_string();
        }
        if self.content_type.is_empty() {
            self.content_type = DEFAULT_CONTENT_TYPE.to_string();
        }
    }

    /// Check that the credential pair is present.
    pub(crate) fn validate(&self) -> Result<(), SdkError> {
        if self.access_id.is_empty() {
            return Err(SdkError::Config("access_id is required".into()));
        }
        if self.access_key.is_empty() {
            return Err(SdkError::Config("access_key is required".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_id", &self.access_id)
            .field("access_key", &"[REDACTED]")
            .field("version", &self.version)
            .field("address", &self.address)
            .field("content_type", &self.content_type)
            .field("timeout", &self.timeout)
            .field("redact_sensitive_headers", &self.redact_sensitive_headers)
            .finish()
    }
}
