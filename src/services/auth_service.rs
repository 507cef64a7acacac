use crate::constants::API_PATH_AUTH_CMT;
use crate::error::{CallError, SdkError};
use crate::models::common::ApiResult;
use crate::models::requests::OpenIdToken;
use crate::models::responses::{Signature, SignatureWithOpenAuth};
use crate::services::junyou_service::JunyouClient;
use reqwest::header::HeaderMap;
use reqwest::Method;

/// Signature helpers bound to a client's credentials.
pub struct AuthService<'a> {
    client: &'a JunyouClient,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a JunyouClient) -> Self {
        Self { client }
    }

    pub fn generate_signature(&self, method: &str, path: &str) -> Result<Signature, SdkError> {
        Ok(self.client.signer().sign(method, path)?)
    }

    pub fn generate_auth_headers(&self, method: &str, path: &str) -> Result<HeaderMap, SdkError> {
        Ok(self.client.signer().build_auth_headers(method, path)?)
    }

    /// Sign for the confirm-token endpoint, call it, and return the signature
    /// together with the open-auth token it handed out.
    ///
    /// Lets a front end make its own signed call on behalf of the user.
    /// A failure carries the upstream result envelope, or a system error
    /// envelope when signing fails.
    pub async fn generate_signature_with_auth_cmt(
        &self,
        open_id_token: &OpenIdToken,
    ) -> Result<SignatureWithOpenAuth, CallError<String>> {
        let signature = self
            .generate_signature(Method::POST.as_str(), API_PATH_AUTH_CMT)
            .map_err(|e| {
                CallError::<String>::new(ApiResult::sys_error("failed to generate auth header"), e)
            })?;

        let result = self.client.api().auth_cmt(open_id_token).await?;

        Ok(SignatureWithOpenAuth::new(signature, result.data))
    }
}
