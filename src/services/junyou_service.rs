use crate::config::Config;
use crate::error::{CallError, CallResult, SdkError};
use crate::models::common::{ApiResult, Envelope, IsEmpty};
use crate::services::api_service::ApiService;
use crate::services::auth_service::AuthService;
use crate::services::crypto::{insert_header, Signer};
use crate::services::observer::{LogObserver, RequestObserver, RequestRecord, ResponseRecord};
use log::{error, warn};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Anything that can travel as the `data` field of a result envelope.
pub trait Payload: DeserializeOwned + Serialize + Default + IsEmpty {}

impl<T> Payload for T where T: DeserializeOwned + Serialize + Default + IsEmpty {}

/// Client for the junyouchain open API.
///
/// Holds no per-call state: the signer, HTTP client and observer are shared
/// read-only, so one client can serve concurrent callers.
#[derive(Clone)]
pub struct JunyouClient {
    config: Config,
    http: Client,
    base_url: Url,
    signer: Signer,
    observer: Arc<dyn RequestObserver>,
}

impl JunyouClient {
    /// Build a client with its own HTTP client, bounded by `config.timeout`.
    ///
    /// # Errors
    /// Returns `SdkError::Config` when the access id or access key is missing.
    pub fn new(config: Config) -> Result<Self, SdkError> {
        let mut config = config;
        config.apply_defaults();
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SdkError::Config(format!("failed to build HTTP client: {}", e)))?;

        Self::assemble(config, http)
    }

    /// Build a client around a caller-supplied HTTP client.
    pub fn with_http_client(config: Config, http: Client) -> Result<Self, SdkError> {
        let mut config = config;
        config.apply_defaults();
        config.validate()?;

        Self::assemble(config, http)
    }

    fn assemble(config: Config, http: Client) -> Result<Self, SdkError> {
        let base_url = Url::parse(&config.address)?;
        let signer = Signer::from_config(&config);
        let observer: Arc<dyn RequestObserver> =
            Arc::new(LogObserver::new(config.redact_sensitive_headers));

        Ok(Self {
            config,
            http,
            base_url,
            signer,
            observer,
        })
    }

    /// Replace the default logging observer.
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    pub fn api(&self) -> ApiService<'_> {
        ApiService::new(self)
    }

    /// Resolve `path` against the base address. Query strings are kept as given.
    pub fn resolve_url(&self, path: &str) -> Result<Url, SdkError> {
        Ok(self.base_url.join(path)?)
    }

    /// Send a signed request without a body.
    pub async fn get<T: Payload>(&self, path: &str) -> CallResult<T> {
        self.execute::<T, ()>(Method::GET, path, None, None).await
    }

    /// Sign, send and classify one request.
    ///
    /// `extra_headers` are merged over the auth headers; on a name collision
    /// the extra header wins. Every failure comes back as a [`CallError`]
    /// carrying a populated result envelope.
    pub async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        extra_headers: Option<&[(&str, &str)]>,
    ) -> CallResult<T>
    where
        T: Payload,
        B: Serialize + ?Sized,
    {
        let mut headers = self
            .signer
            .build_auth_headers(method.as_str(), path)
            .map_err(|e| CallError::<T>::new(ApiResult::sys_error("failed to generate auth header"), e))?;

        let url = self
            .resolve_url(path)
            .map_err(|e| CallError::<T>::new(ApiResult::sys_error("invalid API path"), e))?;

        let body_bytes = match body {
            Some(body) => serde_json::to_vec(body).map_err(|e| {
                CallError::<T>::new(ApiResult::sys_error("failed to marshal request body"), e)
            })?,
            None => Vec::new(),
        };

        if let Some(extra) = extra_headers {
            for (name, value) in extra {
                insert_header(&mut headers, name, value).map_err(|e| {
                    CallError::<T>::new(ApiResult::sys_error("invalid request header"), e)
                })?;
            }
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        self.observer.on_request(&RequestRecord {
            request_id: &request_id,
            method: method.as_str(),
            url: url.as_str(),
            headers: &headers,
            body: &body_bytes,
        });

        let mut request = self.http.request(method.clone(), url.clone()).headers(headers);
        if body.is_some() {
            request = request.body(body_bytes);
        }

        let response = request.send().await.map_err(|e| {
            error!("Request {} {} failed: {}", method, url, e);
            CallError::<T>::new(ApiResult::sys_error("request failed"), e)
        })?;

        let status = response.status().as_u16();
        let data = response.bytes().await.map_err(|e| {
            error!("Reading response of {} {} failed: {}", method, url, e);
            CallError::<T>::new(ApiResult::sys_error("failed to read response"), e)
        })?;

        self.observer.on_response(&ResponseRecord {
            request_id: &request_id,
            method: method.as_str(),
            url: url.as_str(),
            status,
            body: &data,
        });

        classify_response(status, &data, path)
    }
}

/// Turn a status code and a fully read body into a result.
pub(crate) fn classify_response<T: Payload>(status: u16, data: &[u8], path: &str) -> CallResult<T> {
    if status != 200 {
        return Err(http_error(status, data, path));
    }

    if data.is_empty() {
        return Ok(ApiResult::success("success", T::default()));
    }

    let malformed = |source: serde_json::Error| -> CallError<T> {
        CallError::new(
            ApiResult::sys_error("failed to parse response"),
            SdkError::MalformedResponse {
                path: path.to_string(),
                source,
            },
        )
    };

    let envelope = Envelope::parse(data).map_err(malformed)?;

    if envelope.code != 200 {
        return Err(business_error(envelope, path));
    }

    let parsed = envelope.into_typed::<T>().map_err(malformed)?;

    let mut result = ApiResult::success("success", parsed.data);
    result.err_code = parsed.err_code;
    Ok(result)
}

fn http_error<T: Payload>(status: u16, data: &[u8], path: &str) -> CallError<T> {
    match Envelope::parse(data) {
        Ok(envelope) => {
            let upstream: ApiResult<T> = envelope.into_lenient();
            let message = with_data(&upstream.message, &upstream.data);
            warn!("http error {} on {}: {}", status, path, message);

            let mut result = ApiResult::sys_error(upstream.message);
            result.code = i64::from(status);
            result.err_code = upstream.err_code;
            result.data = upstream.data;

            CallError::new(
                result,
                SdkError::HttpStatus {
                    status,
                    path: path.to_string(),
                    message,
                },
            )
        }
        Err(_) => {
            let text = String::from_utf8_lossy(data).into_owned();
            let message = if text.is_empty() {
                format!("HTTP {}", status)
            } else {
                text
            };
            warn!("http error {} on {}: {}", status, path, message);

            let mut result = ApiResult::sys_error(message.clone());
            result.code = i64::from(status);

            CallError::new(
                result,
                SdkError::HttpStatus {
                    status,
                    path: path.to_string(),
                    message,
                },
            )
        }
    }
}

fn business_error<T: Payload>(envelope: Envelope, path: &str) -> CallError<T> {
    let code = envelope.code;
    let upstream: ApiResult<T> = envelope.into_lenient();
    let message = with_data(&upstream.message, &upstream.data);
    warn!("business error {} on {}: {}", code, path, message);

    let mut result = ApiResult::param_error(upstream.message);
    result.code = code;
    result.err_code = upstream.err_code;
    result.data = upstream.data;

    CallError::new(
        result,
        SdkError::Business {
            code,
            path: path.to_string(),
            message,
        },
    )
}

/// Append the serialized payload to `message` unless the payload is empty.
fn with_data<T: Serialize + IsEmpty>(message: &str, data: &T) -> String {
    if IsEmpty::is_empty(data) {
        return message.to_string();
    }
    match serde_json::to_string(data) {
        Ok(json) => format!("{} (data: {})", message, json),
        Err(_) => message.to_string(),
    }
}
