//! Auth endpoints: signup, verification, sign-in, password reset, Google
//! login, token refresh, profile.

use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::validate;
use crate::middleware::auth::require_user;
use crate::model::{ApiError, AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, message = "Password is too weak (min 8 chars)"))]
    password: String,
    #[validate(length(min = 1))]
    first_name: String,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyEmailRequest {
    email: String,
    otp: String,
}

#[derive(Debug, Deserialize)]
struct SigninRequest {
    email: String,
    pass: String,
}

#[derive(Debug, Deserialize)]
struct ForgotPasswordRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest {
    token: String,
    new_pass: String,
}

#[derive(Debug, Deserialize)]
struct ResendOtpRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRequest {
    id_token: String,
}

#[derive(Debug, Deserialize, Validate)]
struct RefreshRequest {
    #[validate(length(min = 1))]
    refresh_token: String,
    current_access_token: Option<String>,
}

#[post("/signup")]
async fn signup(
    data: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    validate(&*body)?;
    let message = data
        .auth
        .signup(
            &body.email,
            &body.password,
            &body.first_name,
            body.last_name.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

#[post("/verify-email")]
async fn verify_email(
    data: web::Data<AppState>,
    body: web::Json<VerifyEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = data.auth.verify_email(&body.email, &body.otp).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/signin")]
async fn signin(
    data: web::Data<AppState>,
    body: web::Json<SigninRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = data.auth.sign_in(&body.email, &body.pass).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/forgot-password")]
async fn forgot_password(
    data: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let message = data.auth.forgot_password(&body.email).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

#[post("/reset-password")]
async fn reset_password(
    data: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let message = data.auth.reset_password(&body.token, &body.new_pass).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

#[post("/resend-otp")]
async fn resend_otp(
    data: web::Data<AppState>,
    body: web::Json<ResendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    let message = data.auth.resend_otp(&body.email).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

#[post("/google")]
async fn google(
    data: web::Data<AppState>,
    body: web::Json<GoogleRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = data.auth.google_auth(&body.id_token).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/refresh")]
async fn refresh(
    data: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse, ApiError> {
    validate(&*body)?;
    let outcome = data
        .auth
        .refresh(&body.refresh_token, body.current_access_token.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[get("/me")]
async fn me(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let profile = data.auth.me(&user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub fn routes() -> Scope {
    web::scope("/auth")
        .service(signup)
        .service(verify_email)
        .service(signin)
        .service(forgot_password)
        .service(reset_password)
        .service(resend_otp)
        .service(google)
        .service(refresh)
        .service(me)
}
