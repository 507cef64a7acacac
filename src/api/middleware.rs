use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::HeaderName, StatusCode},
    Error, HttpResponse,
};
use dashmap::DashMap;
use futures_util::Future;
use junyou_sdk::ApiResult;
use log::warn;
use serde_json::Value;
use std::{
    future::{ready, Ready},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};
use subtle::ConstantTimeEq;

/// Shared-key authentication for sibling services calling the gateway.
#[derive(Clone)]
pub struct GatewayAuthConfig {
    service_key: Arc<Vec<u8>>,
    header_name: HeaderName,
    rate_limit: RateLimit,
    /// Paths served without a key, e.g. the health probe.
    open_paths: Arc<Vec<String>>,
}

/// Fixed-window request counter per caller address.
#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window: Duration,
    windows: Arc<DashMap<String, (u32, Instant)>>,
}

impl RateLimit {
    fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(DashMap::new()),
        }
    }

    /// Count one request from `caller`; false once the window is exhausted.
    fn admit(&self, caller: &str) -> bool {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(caller.to_string())
            .or_insert((0, now));
        let (count, started) = &mut *entry;

        if now.duration_since(*started) >= self.window {
            *count = 0;
            *started = now;
        }

        if *count >= self.max_requests {
            return false;
        }

        *count += 1;
        true
    }
}

impl GatewayAuthConfig {
    pub fn new(service_key: String) -> Self {
        Self {
            service_key: Arc::new(service_key.into_bytes()),
            header_name: HeaderName::from_static("x-service-key"),
            rate_limit: RateLimit::new(1000, Duration::from_secs(60)),
            open_paths: Arc::new(vec!["/health".to_string()]),
        }
    }

    pub fn with_header_name(
        mut self,
        name: &str,
    ) -> Result<Self, actix_web::http::header::InvalidHeaderName> {
        self.header_name = HeaderName::try_from(name)?;
        Ok(self)
    }

    pub fn with_rate_limit(mut self, max_requests: u32, window_seconds: u64) -> Self {
        self.rate_limit = RateLimit::new(max_requests, Duration::from_secs(window_seconds));
        self
    }

    /// Periodically drop counters whose window has passed.
    pub fn start_cleanup_task(&self) {
        let windows = self.rate_limit.windows.clone();
        let window = self.rate_limit.window;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(window / 2);
            loop {
                interval.tick().await;
                let now = Instant::now();
                windows.retain(|_, (_, started)| now.duration_since(*started) < window);
            }
        });
    }
}

pub struct GatewayAuth {
    config: GatewayAuthConfig,
}

impl GatewayAuth {
    pub fn new(config: GatewayAuthConfig) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GatewayAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = GatewayAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GatewayAuthService {
            service: Arc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct GatewayAuthService<S> {
    service: Arc<S>,
    config: GatewayAuthConfig,
}

impl<S, B> Service<ServiceRequest> for GatewayAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let config = self.config.clone();
        let service = self.service.clone();

        Box::pin(async move {
            if config.open_paths.iter().any(|p| p == req.path()) {
                let res = service.call(req).await?;
                return Ok(res.map_into_boxed_body());
            }

            let presented = match req.headers().get(&config.header_name) {
                Some(value) => value.as_bytes(),
                None => {
                    return Ok(reject(
                        req,
                        StatusCode::UNAUTHORIZED,
                        "Missing service authentication",
                    ))
                }
            };

            if presented.ct_eq(&config.service_key).unwrap_u8() != 1 {
                return Ok(reject(
                    req,
                    StatusCode::FORBIDDEN,
                    "Invalid service credentials",
                ));
            }

            // Keyed on the socket peer; forwarding headers are caller-controlled.
            let caller = req
                .peer_addr()
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            if !config.rate_limit.admit(&caller) {
                warn!("Rate limit exceeded for {}", caller);
                return Ok(reject(
                    req,
                    StatusCode::TOO_MANY_REQUESTS,
                    "Service rate limit exceeded",
                ));
            }

            let res = service.call(req).await?;
            Ok(res.map_into_boxed_body())
        })
    }
}

/// Short-circuit with an error envelope in the same shape the SDK returns.
fn reject(req: ServiceRequest, status: StatusCode, message: &str) -> ServiceResponse<BoxBody> {
    let mut body: ApiResult<Value> = ApiResult::param_error(message);
    body.code = i64::from(status.as_u16());
    body.err_code = status
        .canonical_reason()
        .unwrap_or("Service Error")
        .to_uppercase()
        .replace(' ', "_");

    let response = HttpResponse::build(status).json(body);
    req.into_response(response).map_into_boxed_body()
}
