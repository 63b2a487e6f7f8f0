use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::CreateClassRequest,
        response::{ClassResponse, RosterEntry},
    },
};

#[post("/classes")]
pub async fn create_class(
    state: web::Data<Arc<AppState>>,
    request: web::Json<CreateClassRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let class = state
        .class_service
        .create_class(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ClassResponse::from(class)))
}

#[get("/classes")]
pub async fn list_classes(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let classes = state
        .class_service
        .list_classes_for_teacher(&auth.0)
        .await?;
    let response: Vec<ClassResponse> = classes.into_iter().map(ClassResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

#[post("/classes/{class_id}/code")]
pub async fn regenerate_code(
    state: web::Data<Arc<AppState>>,
    class_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let class = state
        .class_service
        .regenerate_code(&auth.0, &class_id)
        .await?;
    Ok(HttpResponse::Ok().json(ClassResponse::from(class)))
}

#[delete("/classes/{class_id}")]
pub async fn delete_class(
    state: web::Data<Arc<AppState>>,
    class_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.class_service.delete_class(&auth.0, &class_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/classes/{class_id}/roster")]
pub async fn roster(
    state: web::Data<Arc<AppState>>,
    class_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let students = state
        .enrollment_service
        .roster_for_class(&auth.0, &class_id)
        .await?;
    let response: Vec<RosterEntry> = students.into_iter().map(RosterEntry::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

#[delete("/classes/{class_id}/roster/{student_id}")]
pub async fn remove_student(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (class_id, student_id) = path.into_inner();
    state
        .enrollment_service
        .remove_student(&auth.0, &class_id, &student_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
