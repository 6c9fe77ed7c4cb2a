//! Notification endpoints

use actix_web::{HttpRequest, HttpResponse, Scope, delete, get, put, web};

use crate::middleware::auth::require_user;
use crate::model::{ApiError, AppState};

#[get("")]
async fn find_all(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let notifications = data.notifications.find_all(&user.id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

#[put("/{id}/read")]
async fn mark_as_read(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let notification = data.notifications.mark_as_read(&path, &user.id).await?;
    Ok(HttpResponse::Ok().json(notification))
}

#[delete("/{id}")]
async fn remove(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let notification = data.notifications.remove(&path, &user.id).await?;
    Ok(HttpResponse::Ok().json(notification))
}

pub fn routes() -> Scope {
    web::scope("/api/notifications")
        .service(find_all)
        .service(mark_as_read)
        .service(remove)
}
