use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Uniform outcome of every open API call.
///
/// The upstream service answers with this shape either bare or wrapped as
/// `{"result": {...}}`; [`parse_response`] accepts both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub err_code: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: T,
}

impl<T> ApiResult<T> {
    fn new(code: i64, success: bool, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            err_code: String::new(),
            success,
            message: message.into(),
            data,
        }
    }

    /// Code 200, success.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self::new(200, true, message, data)
    }
}

impl<T: Default> ApiResult<T> {
    /// Code 500. Internal and transport failures.
    pub fn sys_error(message: impl Into<String>) -> Self {
        Self::new(500, false, message, T::default())
    }

    /// Code 400. Business validation failures reported by the upstream service.
    pub fn param_error(message: impl Into<String>) -> Self {
        Self::new(400, false, message, T::default())
    }
}

/// Whether a payload carries nothing worth reporting.
///
/// Decides if a payload gets appended to a composed error message.
pub trait IsEmpty {
    fn is_empty(&self) -> bool;
}

impl IsEmpty for () {
    fn is_empty(&self) -> bool {
        true
    }
}

impl IsEmpty for String {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl IsEmpty for bool {
    fn is_empty(&self) -> bool {
        !*self
    }
}

impl IsEmpty for i64 {
    fn is_empty(&self) -> bool {
        *self == 0
    }
}

impl IsEmpty for Decimal {
    fn is_empty(&self) -> bool {
        self.is_zero()
    }
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty(&self) -> bool {
        <[T]>::is_empty(self)
    }
}

impl<T: IsEmpty> IsEmpty for Option<T> {
    fn is_empty(&self) -> bool {
        self.as_ref().map_or(true, |v| IsEmpty::is_empty(v))
    }
}

impl<K, V, S> IsEmpty for HashMap<K, V, S> {
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IsEmpty for Map<String, Value> {
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IsEmpty for Value {
    fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(m) => m.is_empty(),
        }
    }
}

/// Envelope with the payload left undecoded.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Envelope {
    pub code: i64,
    pub err_code: String,
    pub success: bool,
    pub message: String,
    pub data: Value,
}

impl Envelope {
    /// Try the wrapped shape first, then the bare one. Only a JSON object is
    /// an envelope.
    pub(crate) fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_slice(body)?;

        if let Some(inner @ Value::Object(_)) = object.get("result") {
            if let Ok(envelope) = serde_json::from_value::<Envelope>(inner.clone()) {
                return Ok(envelope);
            }
        }

        serde_json::from_value(Value::Object(object))
    }

    /// Decode the payload into `T`. A `null` or missing payload becomes `T::default()`.
    pub(crate) fn into_typed<T>(self) -> Result<ApiResult<T>, serde_json::Error>
    where
        T: DeserializeOwned + Default,
    {
        let data = decode_data(self.data)?;
        Ok(ApiResult {
            code: self.code,
            err_code: self.err_code,
            success: self.success,
            message: self.message,
            data,
        })
    }

    /// Like [`Envelope::into_typed`], but a payload that does not fit `T` is
    /// replaced by `T::default()`. Used on error paths where the payload is
    /// informational.
    pub(crate) fn into_lenient<T>(self) -> ApiResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let data = decode_data(self.data).unwrap_or_default();
        ApiResult {
            code: self.code,
            err_code: self.err_code,
            success: self.success,
            message: self.message,
            data,
        }
    }
}

fn decode_data<T>(value: Value) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value)
}

/// Parse a response body in either the wrapped or the bare envelope shape.
pub fn parse_response<T>(body: &[u8]) -> Result<ApiResult<T>, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    Envelope::parse(body)?.into_typed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors() {
        let ok = ApiResult::success("success", "token".to_string());
        assert_eq!(ok.code, 200);
        assert!(ok.success);
        assert!(ok.err_code.is_empty());
        assert_eq!(ok.data, "token");

        let sys: ApiResult<String> = ApiResult::sys_error("request failed");
        assert_eq!(sys.code, 500);
        assert!(!sys.success);
        assert_eq!(sys.message, "request failed");
        assert!(sys.data.is_empty());

        let param: ApiResult<Map<String, Value>> = ApiResult::param_error("bad input");
        assert_eq!(param.code, 400);
        assert!(!param.success);
        assert!(param.err_code.is_empty());
    }

    #[test]
    fn test_parse_wrapped_and_bare_agree() {
        let bare = br#"{"code":200,"success":true,"message":"ok","data":"X"}"#;
        let wrapped = br#"{"result":{"code":200,"success":true,"message":"ok","data":"X"}}"#;

        let a: ApiResult<String> = parse_response(bare).unwrap();
        let b: ApiResult<String> = parse_response(wrapped).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.data, "X");
        assert_eq!(a.message, "ok");
    }

    #[test]
    fn test_parse_null_result_falls_back_to_bare() {
        let body = br#"{"result":null,"code":200,"success":true,"data":"Y"}"#;
        let parsed: ApiResult<String> = parse_response(body).unwrap();
        assert_eq!(parsed.code, 200);
        assert_eq!(parsed.data, "Y");
    }

    #[test]
    fn test_parse_missing_fields_default() {
        let parsed: ApiResult<String> = parse_response(br#"{"message":"internal"}"#).unwrap();
        assert_eq!(parsed.code, 0);
        assert!(!parsed.success);
        assert_eq!(parsed.message, "internal");
        assert_eq!(parsed.data, "");
    }

    #[test]
    fn test_parse_null_data_is_default() {
        let parsed: ApiResult<Map<String, Value>> =
            parse_response(br#"{"code":200,"success":true,"data":null}"#).unwrap();
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_response::<String>(b"<html>bad gateway</html>").is_err());
    }

    #[test]
    fn test_parse_rejects_non_object_json() {
        assert!(Envelope::parse(b"[200]").is_err());
        assert!(Envelope::parse(b"[]").is_err());
        assert!(Envelope::parse(br#"[{"code":200}]"#).is_err());
        assert!(Envelope::parse(b"200").is_err());
        assert!(Envelope::parse(b"null").is_err());
        assert!(Envelope::parse(br#""ok""#).is_err());
    }

    #[test]
    fn test_parse_non_object_result_falls_back_to_bare() {
        let parsed: ApiResult<String> =
            parse_response(br#"{"result":[200],"code":400,"message":"m"}"#).unwrap();
        assert_eq!(parsed.code, 400);
        assert_eq!(parsed.message, "m");
    }

    #[test]
    fn test_parse_rejects_mismatched_data() {
        let body = br#"{"code":200,"success":true,"data":{"k":1}}"#;
        assert!(parse_response::<String>(body).is_err());
    }

    #[test]
    fn test_lenient_drops_mismatched_data() {
        let envelope = Envelope::parse(br#"{"code":400,"message":"m","data":{"k":1}}"#).unwrap();
        let result: ApiResult<String> = envelope.into_lenient();
        assert_eq!(result.code, 400);
        assert_eq!(result.data, "");
    }

    #[test]
    fn test_success_round_trip_through_wire_format() {
        let mut payload = Map::new();
        payload.insert("balance".into(), json!("12.50"));
        payload.insert("page".into(), json!(1));

        let original = ApiResult::success("success", payload.clone());
        let wire = serde_json::to_vec(&original).unwrap();
        let parsed: ApiResult<Map<String, Value>> = parse_response(&wire).unwrap();

        assert_eq!(parsed.data, payload);
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_is_empty() {
        assert!(IsEmpty::is_empty(&String::new()));
        assert!(!IsEmpty::is_empty(&"x".to_string()));
        assert!(IsEmpty::is_empty(&Value::Null));
        assert!(IsEmpty::is_empty(&json!({})));
        assert!(!IsEmpty::is_empty(&json!({"a": 1})));
        assert!(IsEmpty::is_empty(&json!(0)));
        assert!(IsEmpty::is_empty(&Map::new()));
        assert!(IsEmpty::is_empty(&None::<String>));
        assert!(IsEmpty::is_empty(&Decimal::ZERO));
    }
}
