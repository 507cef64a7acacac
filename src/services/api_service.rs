use crate::constants::{
    API_PATH_AUTH_CMT, API_PATH_AUTH_LOGIN, API_PATH_AUTH_SET_PWD, API_PATH_ENTERPRISE_JKS_URL,
    API_PATH_EWT_BALANCE, API_PATH_EWT_COMMIT_RELEASE_BY_PARTNER,
    API_PATH_EWT_CONFIRM_RELEASE_BY_PARTNER, API_PATH_EWT_PRE_COMMIT_RELEASE_BY_PARTNER,
    API_PATH_EWT_TRANSACTION_DETAILS, API_PATH_REGISTER, HEADER_OPEN_AUTH,
};
use crate::error::CallResult;
use crate::models::requests::{
    CommitEwtReleaseByPartnerRequest, EnterpriseJksUrlRequest, EwtBizNoInfo, EwtTransactionQuery,
    OpenIdToken, PreEwtReleaseByPartnerRequest, RegisterInfo,
};
use crate::services::junyou_service::JunyouClient;
use reqwest::Method;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Untyped JSON object payload.
pub type JsonObject = Map<String, Value>;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 10;

/// Typed wrappers over [`JunyouClient::execute`], one per open API endpoint.
pub struct ApiService<'a> {
    client: &'a JunyouClient,
}

impl<'a> ApiService<'a> {
    pub fn new(client: &'a JunyouClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, info: &RegisterInfo) -> CallResult<String> {
        self.client
            .execute(Method::POST, API_PATH_REGISTER, Some(info), None)
            .await
    }

    /// Exchange an open id for the user's open-auth token.
    pub async fn auth_login(&self, token: &OpenIdToken) -> CallResult<String> {
        self.client
            .execute(Method::POST, API_PATH_AUTH_LOGIN, Some(token), None)
            .await
    }

    pub async fn auth_set_pwd(&self, token: &OpenIdToken) -> CallResult<String> {
        self.client
            .execute(Method::POST, API_PATH_AUTH_SET_PWD, Some(token), None)
            .await
    }

    pub async fn auth_cmt(&self, token: &OpenIdToken) -> CallResult<String> {
        self.client
            .execute(Method::POST, API_PATH_AUTH_CMT, Some(token), None)
            .await
    }

    pub async fn set_enterprise_jks_url(
        &self,
        request: &EnterpriseJksUrlRequest,
    ) -> CallResult<JsonObject> {
        self.client
            .execute(Method::POST, API_PATH_ENTERPRISE_JKS_URL, Some(request), None)
            .await
    }

    pub async fn confirm_ewt_release_by_partner(&self, info: &EwtBizNoInfo) -> CallResult<String> {
        self.client
            .execute(
                Method::POST,
                API_PATH_EWT_CONFIRM_RELEASE_BY_PARTNER,
                Some(info),
                None,
            )
            .await
    }

    /// Pre-commit a partner release.
    ///
    /// The server needs to know which user receives the release: pass that
    /// user's open-auth token (from [`ApiService::auth_login`]), otherwise it
    /// answers with a business error about the missing user identity.
    pub async fn pre_commit_ewt_release_by_partner(
        &self,
        request: &PreEwtReleaseByPartnerRequest,
        open_auth: Option<&str>,
    ) -> CallResult<JsonObject> {
        let extra: Vec<(&str, &str)> = open_auth
            .map(|token| vec![(HEADER_OPEN_AUTH, token)])
            .unwrap_or_default();

        self.client
            .execute(
                Method::POST,
                API_PATH_EWT_PRE_COMMIT_RELEASE_BY_PARTNER,
                Some(request),
                Some(extra.as_slice()),
            )
            .await
    }

    pub async fn commit_ewt_release_by_partner(
        &self,
        request: &CommitEwtReleaseByPartnerRequest,
    ) -> CallResult<JsonObject> {
        self.client
            .execute(
                Method::POST,
                API_PATH_EWT_COMMIT_RELEASE_BY_PARTNER,
                Some(request),
                None,
            )
            .await
    }

    /// Enterprise-level warrant balance, paged.
    pub async fn get_ewt_balance(&self, page: i64, page_size: i64) -> CallResult<JsonObject> {
        let path = ewt_balance_path(page, page_size);
        self.client.get(&path).await
    }

    /// Enterprise-level warrant transactions, paged and filtered.
    pub async fn get_ewt_transaction_details(
        &self,
        query: &EwtTransactionQuery,
    ) -> CallResult<JsonObject> {
        let path = ewt_transaction_details_path(query);
        self.client.get(&path).await
    }
}

fn normalize_paging(page: i64, page_size: i64) -> (i64, i64) {
    let page = if page <= 0 { DEFAULT_PAGE } else { page };
    let page_size = if page_size <= 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    (page, page_size)
}

/// `path?query`, keys sorted, form-urlencoded.
fn with_query(path: &str, params: &BTreeMap<&str, String>) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    format!("{}?{}", path, query)
}

pub(crate) fn ewt_balance_path(page: i64, page_size: i64) -> String {
    let (page, page_size) = normalize_paging(page, page_size);

    let mut params = BTreeMap::new();
    params.insert("page", page.to_string());
    params.insert("page_size", page_size.to_string());

    with_query(API_PATH_EWT_BALANCE, &params)
}

pub(crate) fn ewt_transaction_details_path(query: &EwtTransactionQuery) -> String {
    let (page, page_size) = normalize_paging(query.page, query.page_size);

    let mut params = BTreeMap::new();
    params.insert("page", page.to_string());
    params.insert("page_size", page_size.to_string());
    if !query.transaction_type.is_empty() {
        params.insert("transaction_type", query.transaction_type.clone());
    }
    if !query.biz_type.is_empty() {
        params.insert("biz_type", query.biz_type.clone());
    }
    if query.year > 0 {
        params.insert("year", query.year.to_string());
    }
    if query.month > 0 {
        params.insert("month", query.month.to_string());
    }

    with_query(API_PATH_EWT_TRANSACTION_DETAILS, &params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_path_defaults_paging() {
        assert_eq!(
            ewt_balance_path(0, -5),
            "/api/open/v1/ewt/balance?page=1&page_size=10"
        );
        assert_eq!(
            ewt_balance_path(3, 50),
            "/api/open/v1/ewt/balance?page=3&page_size=50"
        );
    }

    #[test]
    fn test_transaction_details_path_omits_empty_filters() {
        let path = ewt_transaction_details_path(&EwtTransactionQuery::default());
        assert_eq!(
            path,
            "/api/open/v1/ewt/transaction_details?page=1&page_size=10"
        );
    }

    #[test]
    fn test_transaction_details_path_sorted_and_encoded() {
        let query = EwtTransactionQuery {
            page: 2,
            page_size: 20,
            transaction_type: "in out".into(),
            biz_type: "EWT1005".into(),
            year: 2025,
            month: 6,
        };

        assert_eq!(
            ewt_transaction_details_path(&query),
            "/api/open/v1/ewt/transaction_details?biz_type=EWT1005&month=6&page=2&page_size=20&transaction_type=in+out&year=2025"
        );
    }
}
