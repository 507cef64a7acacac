use crate::config::Config;
use crate::constants::{
    HEADER_ACCESS_ID, HEADER_CONTENT_TYPE, HEADER_NONCE, HEADER_SIGNATURE, HEADER_TIMESTAMP,
    NONCE_LENGTH, SIGNATURE_TTL_SECS,
};
use crate::error::SignError;
use crate::models::responses::Signature;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

const NONCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random alphanumeric nonce from the OS entropy source.
pub fn generate_nonce(length: usize) -> Result<String, SignError> {
    if length == 0 {
        return Err(SignError::Nonce("length must be greater than 0".to_string()));
    }

    // Bytes at or above `limit` are rejected so every character is equally likely.
    let limit = 256 - (256 % NONCE_CHARSET.len());
    let mut nonce = String::with_capacity(length);
    let mut buf = [0u8; 16];

    while nonce.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| SignError::Nonce(e.to_string()))?;

        for &byte in buf.iter().filter(|b| (**b as usize) < limit) {
            if nonce.len() == length {
                break;
            }
            nonce.push(NONCE_CHARSET[byte as usize % NONCE_CHARSET.len()] as char);
        }
    }

    Ok(nonce)
}

/// HMAC-SHA256 of `data` under `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SignError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| SignError::Digest(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// The newline-joined string that gets signed. Field order is fixed by the server.
pub fn canonical_string(
    access_id: &str,
    method: &str,
    path: &str,
    nonce: &str,
    timestamp: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}",
        access_id, method, path, nonce, timestamp
    )
}

/// Insert a header, rejecting names or values that are not valid on the wire.
pub(crate) fn insert_header(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
) -> Result<(), SignError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| SignError::InvalidHeader(name.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_| SignError::InvalidHeader(name.to_string()))?;
    headers.insert(header_name, header_value);
    Ok(())
}

/// Signs outgoing requests with the access id / access key pair.
#[derive(Clone)]
pub struct Signer {
    access_id: String,
    access_key: String,
    content_type: String,
}

impl Signer {
    pub fn new(
        access_id: impl Into<String>,
        access_key: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            access_id: access_id.into(),
            access_key: access_key.into(),
            content_type: content_type.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.access_id.clone(),
            config.access_key.clone(),
            config.content_type.clone(),
        )
    }

    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    /// Sign `method` and `path` with a fresh nonce and a timestamp dated
    /// [`SIGNATURE_TTL_SECS`] into the future.
    pub fn sign(&self, method: &str, path: &str) -> Result<Signature, SignError> {
        self.sign_at(method, path, Utc::now())
    }

    /// Same as [`Signer::sign`] with an explicit clock reading.
    pub fn sign_at(
        &self,
        method: &str,
        path: &str,
        now: DateTime<Utc>,
    ) -> Result<Signature, SignError> {
        if method.is_empty() {
            return Err(SignError::MissingMethod);
        }
        if path.is_empty() {
            return Err(SignError::MissingPath);
        }
        if self.access_id.is_empty() || self.access_key.is_empty() {
            return Err(SignError::MissingCredentials);
        }

        let nonce = generate_nonce(NONCE_LENGTH)?;
        let timestamp = (now.timestamp() + SIGNATURE_TTL_SECS).to_string();

        self.sign_with(method, path, &nonce, &timestamp)
    }

    /// Compute the signature for fixed nonce and timestamp values.
    pub fn sign_with(
        &self,
        method: &str,
        path: &str,
        nonce: &str,
        timestamp: &str,
    ) -> Result<Signature, SignError> {
        let sign_string = canonical_string(&self.access_id, method, path, nonce, timestamp);

        let key = BASE64.decode(&self.access_key)?;
        let digest = hmac_sha256(&key, sign_string.as_bytes())?;

        debug!("Signed {} {} with nonce {}", method, path, nonce);

        Ok(Signature {
            access_id: self.access_id.clone(),
            signature: BASE64.encode(digest),
            nonce: nonce.to_string(),
            timestamp: timestamp.to_string(),
        })
    }

    /// Build the authentication headers for one request.
    pub fn build_auth_headers(&self, method: &str, path: &str) -> Result<HeaderMap, SignError> {
        let signature = self.sign(method, path)?;
        self.headers_for(&signature)
    }

    pub(crate) fn headers_for(&self, signature: &Signature) -> Result<HeaderMap, SignError> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, HEADER_ACCESS_ID, &signature.access_id)?;
        insert_header(&mut headers, HEADER_SIGNATURE, &signature.signature)?;
        insert_header(&mut headers, HEADER_NONCE, &signature.nonce)?;
        insert_header(&mut headers, HEADER_TIMESTAMP, &signature.timestamp)?;

        if !self.content_type.is_empty() {
            insert_header(&mut headers, HEADER_CONTENT_TYPE, &self.content_type)?;
        }

        Ok(headers)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("access_id", &self.access_id)
            .field("access_key", &"[REDACTED]")
            .field("content_type", &self.content_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ACCESS_ID: &str = "084f95e5e2bf3f79d5f2fd069f4f5e7c";
    const ACCESS_KEY: &str = "5L/1P8XJ2dIWIMGEHkrZ6gE0HGKvyd/4MKcyQ04oEfE=";

    fn signer() -> Signer {
        Signer::new(ACCESS_ID, ACCESS_KEY, "application/json")
    }

    fn verify(signature: &Signature, method: &str, path: &str) -> bool {
        let key = BASE64.decode(ACCESS_KEY).unwrap();
        let expected = hmac_sha256(
            &key,
            canonical_string(
                &signature.access_id,
                method,
                path,
                &signature.nonce,
                &signature.timestamp,
            )
            .as_bytes(),
        )
        .unwrap();
        BASE64.encode(expected) == signature.signature
    }

    #[test]
    fn test_sign_known_vector() {
        let signature = signer()
            .sign_with("POST", "/api/open/v1/auth/login", "aB3x", "1735689780")
            .unwrap();

        assert_eq!(signature.access_id, ACCESS_ID);
        assert_eq!(
            signature.signature,
            "mKFONLjDrj9cgjVLW04Z9jT8udBv/bzhxIra62pDMPM="
        );
    }

    #[test]
    fn test_sign_verifies_independently() {
        let pairs = [
            ("POST", "/api/open/v1/register"),
            ("GET", "/api/open/v1/ewt/balance?page=1&page_size=10"),
            ("POST", "/api/open/v1/ewt/pre_ewt_rbp_commit"),
        ];

        for (method, path) in pairs {
            let signature = signer().sign(method, path).unwrap();
            assert!(verify(&signature, method, path), "{} {}", method, path);
        }
    }

    #[test]
    fn test_any_field_change_changes_signature() {
        let s = signer();
        let base = s.sign_with("POST", "/p", "abcd", "100").unwrap().signature;

        assert_ne!(base, s.sign_with("GET", "/p", "abcd", "100").unwrap().signature);
        assert_ne!(base, s.sign_with("POST", "/q", "abcd", "100").unwrap().signature);
        assert_ne!(base, s.sign_with("POST", "/p", "abce", "100").unwrap().signature);
        assert_ne!(base, s.sign_with("POST", "/p", "abcd", "101").unwrap().signature);
    }

    #[test]
    fn test_timestamp_is_three_minutes_ahead() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let signature = signer().sign_at("POST", "/p", now).unwrap();
        assert_eq!(signature.timestamp, "1735689780");

        let before = Utc::now().timestamp();
        let live = signer().sign("POST", "/p").unwrap();
        let ts: i64 = live.timestamp.parse().unwrap();
        assert!(ts >= before + 180);
        assert!(ts <= Utc::now().timestamp() + 180);
    }

    #[test]
    fn test_nonce_length_and_alphabet() {
        for length in [1, 4, 32, 100] {
            let nonce = generate_nonce(length).unwrap();
            assert_eq!(nonce.len(), length);
            assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        }
        assert_eq!(signer().sign("GET", "/p").unwrap().nonce.len(), NONCE_LENGTH);
    }

    #[test]
    fn test_nonce_zero_length_rejected() {
        assert!(matches!(generate_nonce(0), Err(SignError::Nonce(_))));
    }

    #[test]
    fn test_nonces_are_fresh() {
        let a = signer().sign("GET", "/p").unwrap();
        let b = signer().sign("GET", "/p").unwrap();
        let c = signer().sign("GET", "/p").unwrap();
        // Three 4-char draws from 62^4 colliding is practically impossible.
        assert!(a.nonce != b.nonce || b.nonce != c.nonce);
    }

    #[test]
    fn test_sign_rejects_missing_inputs() {
        assert!(matches!(signer().sign("", "/p"), Err(SignError::MissingMethod)));
        assert!(matches!(signer().sign("GET", ""), Err(SignError::MissingPath)));
        assert!(matches!(
            Signer::new("", ACCESS_KEY, "").sign("GET", "/p"),
            Err(SignError::MissingCredentials)
        ));
        assert!(matches!(
            Signer::new(ACCESS_ID, "", "").sign("GET", "/p"),
            Err(SignError::MissingCredentials)
        ));
    }

    #[test]
    fn test_sign_rejects_bad_base64_key() {
        let result = Signer::new(ACCESS_ID, "not base64!!", "").sign("GET", "/p");
        assert!(matches!(result, Err(SignError::InvalidAccessKey(_))));
    }

    #[test]
    fn test_build_auth_headers() {
        let headers = signer().build_auth_headers("POST", "/p").unwrap();

        assert_eq!(headers.get("x-access-id").unwrap(), ACCESS_ID);
        assert!(headers.contains_key("x-signature"));
        assert_eq!(headers.get("x-signature-nonce").unwrap().len(), NONCE_LENGTH);
        assert!(headers.contains_key("x-timestamp"));
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn test_build_auth_headers_without_content_type() {
        let headers = Signer::new(ACCESS_ID, ACCESS_KEY, "")
            .build_auth_headers("GET", "/p")
            .unwrap();
        assert!(!headers.contains_key("content-type"));
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let debug_str = format!("{:?}", signer());
        assert!(debug_str.contains(ACCESS_ID));
        assert!(!debug_str.contains(ACCESS_KEY));
    }
}
