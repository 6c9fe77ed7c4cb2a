//! Activity log endpoints

use actix_web::{HttpRequest, HttpResponse, Scope, get, web};

use crate::middleware::auth::require_user;
use crate::model::{ApiError, AppState};

#[get("")]
async fn find_all(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let logs = data.activity_logs.find_all(&user.id, &user.role).await?;
    Ok(HttpResponse::Ok().json(logs))
}

pub fn routes() -> Scope {
    web::scope("/api/activity-logs").service(find_all)
}
