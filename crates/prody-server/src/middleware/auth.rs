// Authentication middleware for Actix-web
// Decodes the bearer credential into an AuthContext request extension; the
// authorize step happens later, in the handlers, through require_user /
// require_role. The middleware itself never rejects a request.

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web::Data,
};
use futures::future::LocalBoxFuture;

use prody_auth::AuthClaims;
use prody_auth::model::{AUTHORIZATION_HEADER, BEARER_PREFIX};
use prody_common::ProdyError;

use crate::model::{ApiError, AppState};

const TOKEN_QUERY_PARAM: &str = "token";

/// Authentication state attached to every request
#[derive(Clone, Default)]
pub struct AuthContext {
    /// Whether any credential was presented at all
    pub token_provided: bool,
    /// Decoded claims when the credential was valid
    pub claims: Option<AuthClaims>,
}

// Authentication middleware transformer
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthenticationMiddleware { service })
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
}

/// Extract the credential from the request, in priority order:
/// 1. `Authorization: Bearer <token>` header
/// 2. `token` query parameter (used by the WebSocket handshake)
fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(header_val) = req.headers().get(AUTHORIZATION_HEADER)
        && let Ok(s) = header_val.to_str()
    {
        let trimmed = s.trim();
        if let Some(token) = trimmed.strip_prefix(BEARER_PREFIX) {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    if let Some(query) = req.uri().query() {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=')
                && key == TOKEN_QUERY_PARAM
                && !value.is_empty()
            {
                return Some(value.to_string());
            }
        }
    }

    None
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if Method::OPTIONS != *req.method() {
            let mut auth_context = AuthContext::default();

            if let Some(token) = extract_token(&req) {
                auth_context.token_provided = true;

                if let Some(app_state) = req.app_data::<Data<AppState>>() {
                    match app_state.tokens.decode_cached(&token) {
                        Ok(claims) => {
                            auth_context.claims = Some(claims);
                        }
                        Err(err) => {
                            tracing::debug!("credential rejected: {}", err);
                        }
                    }
                } else {
                    tracing::error!("AppState not found in request app_data");
                }
            }

            // Always insert AuthContext so handlers can inspect it
            req.extensions_mut().insert(auth_context);
        }

        let res = self.service.call(req);

        Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// The authenticated caller, resolved from the request's AuthContext
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub org_id: Option<String>,
}

impl From<AuthClaims> for CurrentUser {
    fn from(claims: AuthClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            org_id: claims.org_id,
        }
    }
}

/// Authorization step: the request must carry a valid credential.
pub fn require_user(req: &HttpRequest) -> Result<CurrentUser, ApiError> {
    let context = req.extensions().get::<AuthContext>().cloned();

    match context {
        Some(AuthContext {
            claims: Some(claims),
            ..
        }) => Ok(CurrentUser::from(claims)),
        Some(AuthContext {
            token_provided: true,
            ..
        }) => Err(ProdyError::Unauthenticated("Invalid or expired token".to_string()).into()),
        _ => Err(ProdyError::Unauthenticated("Authentication required".to_string()).into()),
    }
}

/// Authorization step: the caller must hold the given role.
pub fn require_role(user: &CurrentUser, role: &str) -> Result<(), ApiError> {
    if user.role != role {
        return Err(
            ProdyError::Forbidden(format!("Access denied: requires {} role", role)).into(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_require_role() {
        let admin = CurrentUser {
            id: "u-1".to_string(),
            email: "a@b.c".to_string(),
            role: "admin".to_string(),
            org_id: None,
        };
        assert!(require_role(&admin, "admin").is_ok());

        let member = CurrentUser {
            role: "member".to_string(),
            ..admin
        };
        let err = require_role(&member, "admin").unwrap_err();
        assert_eq!(err.status_code().as_u16(), 403);
    }
}
