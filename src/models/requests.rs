use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInfo {
    pub phone_number: String,
}

/// Identifies an end user by open id on the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenIdToken {
    pub open_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterpriseJksUrlRequest {
    pub jks_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EwtBizNoInfo {
    pub ewt_biz_no: String,
}

/// Pre-commit of a warrant release split between two partner levels.
///
/// Amounts and ratios travel as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreEwtReleaseByPartnerRequest {
    pub amount: Decimal,
    /// Total release ratio.
    pub ratio: Decimal,
    pub level1_open_id: String,
    pub level1_ratio: Decimal,
    pub level2_open_id: String,
    pub level2_ratio: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitEwtReleaseByPartnerRequest {
    /// Business order number, e.g. `EWT20250101000001`.
    pub biz_no: String,
    /// Business message being committed, as a JSON string.
    pub message: String,
    /// Uncompressed public key, hex.
    pub public_key: String,
    /// DER encoded signature, hex.
    pub der_hex: String,
}

/// Filters for the warrant transaction query. Zero and empty values are
/// left out of the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EwtTransactionQuery {
    pub page: i64,
    pub page_size: i64,
    pub transaction_type: String,
    pub biz_type: String,
    pub year: i32,
    pub month: u32,
}

/// Paging parameters, as accepted by the gateway.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: i64,
    pub page_size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_pre_commit_serializes_decimals_as_strings() {
        let request = PreEwtReleaseByPartnerRequest {
            amount: Decimal::from(100),
            ratio: Decimal::ONE,
            level1_open_id: "open-1".into(),
            level1_ratio: Decimal::from_str("0.7").unwrap(),
            level2_open_id: "open-2".into(),
            level2_ratio: Decimal::from_str("0.3").unwrap(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "amount": "100",
                "ratio": "1",
                "level1_open_id": "open-1",
                "level1_ratio": "0.7",
                "level2_open_id": "open-2",
                "level2_ratio": "0.3",
            })
        );
    }

    #[test]
    fn test_transaction_query_defaults_when_fields_missing() {
        let query: EwtTransactionQuery = serde_json::from_value(json!({"biz_type": "EWT1005"})).unwrap();
        assert_eq!(query.page, 0);
        assert_eq!(query.biz_type, "EWT1005");
        assert!(query.transaction_type.is_empty());
    }
}
