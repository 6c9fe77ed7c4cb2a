//! Task endpoints

use actix_web::{HttpRequest, HttpResponse, Scope, delete, get, post, web};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use prody_core::service::task::{CreateTask, UpdateTask};

use crate::api::{parse_datetime_opt, validate};
use crate::middleware::auth::require_user;
use crate::model::{ApiError, AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest {
    #[validate(length(min = 1))]
    title: String,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
    blocker: Option<String>,
    assigned_to_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskRequest {
    #[validate(length(min = 1))]
    task_id: String,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
    blocker: Option<String>,
    assigned_to_id: Option<String>,
}

#[post("")]
async fn create(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    validate(&*body)?;

    let body = body.into_inner();
    let input = CreateTask {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date: parse_datetime_opt(body.due_date.as_deref(), "dueDate")?,
        blocker: body.blocker,
        assigned_to_id: body.assigned_to_id,
    };

    let task = data.tasks.create(input, &user.id, user.org_id.as_deref()).await?;
    Ok(HttpResponse::Ok().json(task))
}

#[get("")]
async fn my_tasks(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let tasks = data.tasks.my_tasks(&user.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/{id}")]
async fn find_one(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_user(&req)?;
    let task = data.tasks.find_one(&path).await?;
    Ok(HttpResponse::Ok().json(task))
}

#[post("/update")]
async fn update(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    validate(&*body)?;

    let body = body.into_inner();
    let input = UpdateTask {
        task_id: body.task_id,
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date: parse_datetime_opt(body.due_date.as_deref(), "dueDate")?,
        blocker: body.blocker,
        assigned_to_id: body.assigned_to_id,
    };

    let task = data.tasks.update(input, &user.id).await?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/delete/{task_id}")]
async fn remove(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = require_user(&req)?;
    let message = data.tasks.remove(&path, &user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

pub fn routes() -> Scope {
    web::scope("/api/tasks")
        .service(create)
        .service(my_tasks)
        .service(update)
        .service(remove)
        .service(find_one)
}
