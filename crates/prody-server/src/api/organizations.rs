//! Organization endpoints

use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use serde::Deserialize;
use validator::Validate;

use crate::api::validate;
use crate::middleware::auth::require_user;
use crate::model::{ApiError, AppState};

#[derive(Debug, Deserialize, Validate)]
struct CreateOrganizationRequest {
    #[validate(length(min = 1))]
    name: String,
}

#[post("")]
async fn create(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateOrganizationRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    validate(&*body)?;
    let org = data.organizations.create(&body.name, &user.id).await?;
    Ok(HttpResponse::Ok().json(org))
}

#[get("/me")]
async fn my_organization(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let org = data
        .organizations
        .my_organization(user.org_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(org))
}

pub fn routes() -> Scope {
    web::scope("/api/organizations")
        .service(create)
        .service(my_organization)
}
