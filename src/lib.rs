//! Client SDK for the junyouchain open API.
//!
//! Every call is signed with HMAC-SHA256 over the access id, method, path,
//! a random nonce and a forward-dated timestamp, and every answer is folded
//! into a uniform [`ApiResult`] envelope.
//!
//! # Example
//!
//! ```rust,ignore
//! use junyou_sdk::{Config, JunyouClient, OpenIdToken};
//!
//! let client = JunyouClient::new(
//!     Config::default()
//!         .with_access_id("084f95e5e2bf3f79d5f2fd069f4f5e7c")
//!         .with_access_key("5L/1P8XJ2dIWIMGEHkrZ6gE0HGKvyd/4MKcyQ04oEfE="),
//! )?;
//!
//! match client.api().auth_login(&OpenIdToken { open_id: "user-open-id".into() }).await {
//!     Ok(result) => println!("open auth: {}", result.data),
//!     Err(e) => eprintln!("login failed ({}): {}", e.result.err_code, e),
//! }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{CallError, CallResult, SdkError, SignError};
pub use models::common::{parse_response, ApiResult, IsEmpty};
pub use models::requests::{
    CommitEwtReleaseByPartnerRequest, EnterpriseJksUrlRequest, EwtBizNoInfo, EwtTransactionQuery,
    OpenIdToken, PageQuery, PreEwtReleaseByPartnerRequest, RegisterInfo,
};
pub use models::responses::{Signature, SignatureWithOpenAuth};
pub use services::api_service::{ApiService, JsonObject};
pub use services::auth_service::AuthService;
pub use services::crypto::Signer;
pub use services::junyou_service::{JunyouClient, Payload};
pub use services::observer::{LogObserver, RequestObserver, RequestRecord, ResponseRecord};
