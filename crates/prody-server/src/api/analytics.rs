//! Analytics endpoints

use actix_web::{HttpRequest, HttpResponse, Scope, get, web};
use prody_common::ROLE_ADMIN;
use serde::Deserialize;
use serde_json::json;

use crate::api::parse_datetime_opt;
use crate::middleware::auth::{require_role, require_user};
use crate::model::{ApiError, AppState};

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    from: Option<String>,
    to: Option<String>,
}

#[get("/dashboard")]
async fn dashboard(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let from = parse_datetime_opt(query.from.as_deref(), "from")?;
    let to = parse_datetime_opt(query.to.as_deref(), "to")?;

    let summary = data
        .analytics
        .dashboard(&user.id, &user.role, user.org_id.as_deref(), from, to)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/tasks")]
async fn tasks(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let analytics = data
        .analytics
        .task_analytics(&user.id, &user.role, user.org_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(analytics))
}

#[get("/meetings")]
async fn meetings(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let analytics = data
        .analytics
        .meeting_analytics(&user.id, &user.role, user.org_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(analytics))
}

#[get("/admin/user-activity")]
async fn admin_user_activity(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    require_role(&user, ROLE_ADMIN)?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Detailed user activity logs for admin eyes only."
    })))
}

pub fn routes() -> Scope {
    web::scope("/api/analytics")
        .service(dashboard)
        .service(tasks)
        .service(meetings)
        .service(admin_user_activity)
}
