// Open API endpoint paths
pub const API_PATH_REGISTER: &str = "/api/open/v1/register";

pub const API_PATH_AUTH_LOGIN: &str = "/api/open/v1/auth/login";
pub const API_PATH_AUTH_SET_PWD: &str = "/api/open/v1/auth/set_pwd";
pub const API_PATH_AUTH_CMT: &str = "/api/open/v1/auth/cmt";

pub const API_PATH_EWT_CONFIRM_RELEASE_BY_PARTNER: &str = "/api/open/v1/ewt/confirm_ewt_rbp";
pub const API_PATH_EWT_COMMIT_RELEASE_BY_PARTNER: &str = "/api/open/v1/ewt/commit_ewt_rbp";
pub const API_PATH_EWT_PRE_COMMIT_RELEASE_BY_PARTNER: &str =
    "/api/open/v1/ewt/pre_ewt_rbp_commit";
pub const API_PATH_EWT_BALANCE: &str = "/api/open/v1/ewt/balance";
pub const API_PATH_EWT_TRANSACTION_DETAILS: &str = "/api/open/v1/ewt/transaction_details";

pub const API_PATH_ENTERPRISE_JKS_URL: &str = "/api/open/v1/enterprise/jks_url";

// Defaults
pub const DEFAULT_ADDRESS: &str = "https://open-api.junyouchain.com";
pub const DEFAULT_VERSION: &str = "v1";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How far into the future a signature timestamp is dated.
pub const SIGNATURE_TTL_SECS: i64 = 3 * 60;

/// Length of the per-request signature nonce.
pub const NONCE_LENGTH: usize = 4;

// Auth headers
pub const HEADER_ACCESS_ID: &str = "X-Access-ID";
pub const HEADER_SIGNATURE: &str = "X-Signature";
pub const HEADER_NONCE: &str = "X-Signature-Nonce";
pub const HEADER_TIMESTAMP: &str = "X-Timestamp";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_OPEN_AUTH: &str = "X-Open-Auth";
