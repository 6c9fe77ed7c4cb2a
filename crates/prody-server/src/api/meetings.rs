//! Meeting endpoints

use actix_web::{HttpRequest, HttpResponse, Scope, delete, get, post, put, web};
use serde::Deserialize;
use validator::Validate;

use prody_core::service::meeting::{CreateMeeting, UpdateMeeting};

use crate::api::{parse_datetime, parse_datetime_opt, validate};
use crate::middleware::auth::require_user;
use crate::model::{ApiError, AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateMeetingRequest {
    #[validate(length(min = 1))]
    title: String,
    description: Option<String>,
    start_time: String,
    end_time: String,
    #[validate(url)]
    meeting_link: Option<String>,
    status: Option<String>,
    is_recurring: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMeetingRequest {
    title: Option<String>,
    description: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    meeting_link: Option<String>,
    status: Option<String>,
    is_recurring: Option<bool>,
}

#[post("")]
async fn create(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateMeetingRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    validate(&*body)?;

    let body = body.into_inner();
    let input = CreateMeeting {
        title: body.title,
        description: body.description,
        start_time: parse_datetime(&body.start_time, "startTime")?,
        end_time: parse_datetime(&body.end_time, "endTime")?,
        meeting_link: body.meeting_link,
        status: body.status,
        is_recurring: body.is_recurring,
    };

    let meeting = data
        .meetings
        .create(input, &user.id, user.org_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(meeting))
}

#[get("")]
async fn find_all(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let meetings = data.meetings.find_all(&user.id).await?;
    Ok(HttpResponse::Ok().json(meetings))
}

#[get("/{id}")]
async fn find_one(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_user(&req)?;
    let meeting = data.meetings.find_one(&path).await?;
    Ok(HttpResponse::Ok().json(meeting))
}

#[put("/{id}")]
async fn update(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateMeetingRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;

    let body = body.into_inner();
    let input = UpdateMeeting {
        title: body.title,
        description: body.description,
        start_time: parse_datetime_opt(body.start_time.as_deref(), "startTime")?,
        end_time: parse_datetime_opt(body.end_time.as_deref(), "endTime")?,
        meeting_link: body.meeting_link,
        status: body.status,
        is_recurring: body.is_recurring,
    };

    let meeting = data.meetings.update(&path, input, &user.id).await?;
    Ok(HttpResponse::Ok().json(meeting))
}

#[delete("/{id}")]
async fn remove(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let meeting = data.meetings.remove(&path, &user.id).await?;
    Ok(HttpResponse::Ok().json(meeting))
}

#[post("/{id}/join")]
async fn join(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let participant = data.meetings.join(&path, &user.id).await?;
    Ok(HttpResponse::Ok().json(participant))
}

pub fn routes() -> Scope {
    web::scope("/api/meetings")
        .service(create)
        .service(find_all)
        .service(join)
        .service(find_one)
        .service(update)
        .service(remove)
}
