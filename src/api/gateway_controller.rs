use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Result as ActixResult};
use junyou_sdk::constants::HEADER_OPEN_AUTH;
use junyou_sdk::{
    ApiResult, CallResult, CommitEwtReleaseByPartnerRequest, EnterpriseJksUrlRequest, EwtBizNoInfo,
    EwtTransactionQuery, JunyouClient, OpenIdToken, PageQuery, PreEwtReleaseByPartnerRequest,
    RegisterInfo, SdkError,
};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;

/// Upstream rejections are the caller's problem; everything else is ours.
fn failure_status(error: &SdkError) -> StatusCode {
    if error.is_business() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Map an SDK outcome onto an HTTP response. The body is always the result envelope.
fn respond<T: Serialize>(operation: &str, outcome: CallResult<T>) -> HttpResponse {
    match outcome {
        Ok(result) => {
            info!("Successfully processed {} request", operation);
            HttpResponse::Ok().json(result)
        }
        Err(e) => {
            error!("Error processing {} request: {}", operation, e);
            HttpResponse::build(failure_status(&e.error)).json(e.result)
        }
    }
}

pub async fn register(
    client: web::Data<JunyouClient>,
    request: web::Json<RegisterInfo>,
) -> ActixResult<HttpResponse> {
    info!("Received register request");
    let outcome = client.api().register(&request).await;
    Ok(respond("register", outcome))
}

pub async fn auth_login(
    client: web::Data<JunyouClient>,
    request: web::Json<OpenIdToken>,
) -> ActixResult<HttpResponse> {
    info!("Received login request");
    let outcome = client.api().auth_login(&request).await;
    Ok(respond("login", outcome))
}

pub async fn auth_set_pwd(
    client: web::Data<JunyouClient>,
    request: web::Json<OpenIdToken>,
) -> ActixResult<HttpResponse> {
    info!("Received set password request");
    let outcome = client.api().auth_set_pwd(&request).await;
    Ok(respond("set password", outcome))
}

/// Returns the signature and open-auth token instead of the bare envelope.
pub async fn auth_cmt(
    client: web::Data<JunyouClient>,
    request: web::Json<OpenIdToken>,
) -> ActixResult<HttpResponse> {
    info!("Received confirm token request");
    match client.auth().generate_signature_with_auth_cmt(&request).await {
        Ok(signed) => Ok(HttpResponse::Ok().json(signed)),
        Err(e) => {
            error!("Error processing confirm token request: {}", e);
            Ok(HttpResponse::build(failure_status(&e.error)).json(e.result))
        }
    }
}

pub async fn set_enterprise_jks_url(
    client: web::Data<JunyouClient>,
    request: web::Json<EnterpriseJksUrlRequest>,
) -> ActixResult<HttpResponse> {
    info!("Received enterprise JKS URL request");
    let outcome = client.api().set_enterprise_jks_url(&request).await;
    Ok(respond("enterprise JKS URL", outcome))
}

pub async fn ewt_confirm(
    client: web::Data<JunyouClient>,
    request: web::Json<EwtBizNoInfo>,
) -> ActixResult<HttpResponse> {
    info!("Received EWT confirm request");
    let outcome = client.api().confirm_ewt_release_by_partner(&request).await;
    Ok(respond("EWT confirm", outcome))
}

/// Forwards the caller's `X-Open-Auth` header, if any. A token that is not
/// visible ASCII is rejected rather than dropped.
pub async fn ewt_pre_commit(
    client: web::Data<JunyouClient>,
    http_request: HttpRequest,
    request: web::Json<PreEwtReleaseByPartnerRequest>,
) -> ActixResult<HttpResponse> {
    info!("Received EWT pre-commit request");
    let open_auth = match http_request.headers().get(HEADER_OPEN_AUTH) {
        Some(value) => match value.to_str() {
            Ok(token) => Some(token),
            Err(_) => {
                warn!("Rejected EWT pre-commit request with unreadable {}", HEADER_OPEN_AUTH);
                let body: ApiResult<Value> =
                    ApiResult::param_error(format!("invalid {} header", HEADER_OPEN_AUTH));
                return Ok(HttpResponse::BadRequest().json(body));
            }
        },
        None => None,
    };

    let outcome = client
        .api()
        .pre_commit_ewt_release_by_partner(&request, open_auth)
        .await;
    Ok(respond("EWT pre-commit", outcome))
}

pub async fn ewt_commit(
    client: web::Data<JunyouClient>,
    request: web::Json<CommitEwtReleaseByPartnerRequest>,
) -> ActixResult<HttpResponse> {
    info!("Received EWT commit request");
    let outcome = client.api().commit_ewt_release_by_partner(&request).await;
    Ok(respond("EWT commit", outcome))
}

pub async fn ewt_balance(
    client: web::Data<JunyouClient>,
    query: web::Query<PageQuery>,
) -> ActixResult<HttpResponse> {
    info!("Received EWT balance request");
    let outcome = client.api().get_ewt_balance(query.page, query.page_size).await;
    Ok(respond("EWT balance", outcome))
}

pub async fn ewt_transaction_details(
    client: web::Data<JunyouClient>,
    query: web::Query<EwtTransactionQuery>,
) -> ActixResult<HttpResponse> {
    info!("Received EWT transaction details request");
    let outcome = client.api().get_ewt_transaction_details(&query).await;
    Ok(respond("EWT transaction details", outcome))
}

/// Mount every gateway route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/register", web::post().to(register))
            .route("/auth/login", web::post().to(auth_login))
            .route("/auth/set_pwd", web::post().to(auth_set_pwd))
            .route("/auth/cmt", web::post().to(auth_cmt))
            .route("/enterprise/jks_url", web::post().to(set_enterprise_jks_url))
            .route("/ewt/confirm", web::post().to(ewt_confirm))
            .route("/ewt/pre_commit", web::post().to(ewt_pre_commit))
            .route("/ewt/commit", web::post().to(ewt_commit))
            .route("/ewt/balance", web::get().to(ewt_balance))
            .route(
                "/ewt/transaction_details",
                web::get().to(ewt_transaction_details),
            ),
    );
}
