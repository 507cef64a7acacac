use crate::constants::{HEADER_OPEN_AUTH, HEADER_SIGNATURE};
use log::{debug, info};
use reqwest::header::HeaderMap;

/// An outgoing request, as seen right before it is sent.
#[derive(Debug)]
pub struct RequestRecord<'a> {
    /// Correlates the request with its response.
    pub request_id: &'a str,
    pub method: &'a str,
    pub url: &'a str,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
}

/// A fully read response.
#[derive(Debug)]
pub struct ResponseRecord<'a> {
    pub request_id: &'a str,
    pub method: &'a str,
    pub url: &'a str,
    pub status: u16,
    pub body: &'a [u8],
}

/// Hook invoked around the send step of every call.
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, record: &RequestRecord<'_>);
    fn on_response(&self, record: &ResponseRecord<'_>);
}

/// Default observer: writes requests and responses to the `log` facade.
#[derive(Debug, Clone)]
pub struct LogObserver {
    redact_sensitive_headers: bool,
}

impl LogObserver {
    pub fn new(redact_sensitive_headers: bool) -> Self {
        Self {
            redact_sensitive_headers,
        }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RequestObserver for LogObserver {
    fn on_request(&self, record: &RequestRecord<'_>) {
        info!(
            "[SDK Request] {} {} {}",
            record.request_id, record.method, record.url
        );
        debug!(
            "[SDK Request] {} Headers: {:?}",
            record.request_id,
            header_pairs(record.headers, self.redact_sensitive_headers)
        );
        debug!(
            "[SDK Request] {} Body: {}",
            record.request_id,
            body_for_log(record.body)
        );
    }

    fn on_response(&self, record: &ResponseRecord<'_>) {
        info!(
            "[SDK Response] {} {} {} | Status: {}",
            record.request_id, record.method, record.url, record.status
        );
        debug!(
            "[SDK Response] {} Body: {}",
            record.request_id,
            body_for_log(record.body)
        );
    }
}

/// Header name/value pairs for logging, with the signature and open-auth
/// token masked when `redact` is set.
pub fn header_pairs(headers: &HeaderMap, redact: bool) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let sensitive = name.as_str().eq_ignore_ascii_case(HEADER_SIGNATURE)
                || name.as_str().eq_ignore_ascii_case(HEADER_OPEN_AUTH);
            let shown = if redact && sensitive {
                "[REDACTED]".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

fn body_for_log(body: &[u8]) -> String {
    if body.is_empty() {
        "(empty)".to_string()
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-access-id", HeaderValue::from_static("id-1"));
        headers.insert("x-signature", HeaderValue::from_static("c2lnbmF0dXJl"));
        headers.insert("x-open-auth", HeaderValue::from_static("user-token"));
        headers
    }

    fn value_of<'a>(pairs: &'a [(String, String)], name: &str) -> &'a str {
        &pairs.iter().find(|(k, _)| k == name).unwrap().1
    }

    #[test]
    fn test_header_pairs_redacts_sensitive_values() {
        let pairs = header_pairs(&headers(), true);

        assert_eq!(value_of(&pairs, "x-access-id"), "id-1");
        assert_eq!(value_of(&pairs, "x-signature"), "[REDACTED]");
        assert_eq!(value_of(&pairs, "x-open-auth"), "[REDACTED]");
    }

    #[test]
    fn test_header_pairs_without_redaction() {
        let pairs = header_pairs(&headers(), false);

        assert_eq!(value_of(&pairs, "x-signature"), "c2lnbmF0dXJl");
        assert_eq!(value_of(&pairs, "x-open-auth"), "user-token");
    }

    #[test]
    fn test_body_for_log() {
        assert_eq!(body_for_log(b""), "(empty)");
        assert_eq!(body_for_log(br#"{"a":1}"#), r#"{"a":1}"#);
    }
}
