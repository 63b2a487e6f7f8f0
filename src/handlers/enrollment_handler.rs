use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{request::JoinClassRequest, response::MembershipResponse},
};

#[post("/enrollments")]
pub async fn join_class(
    state: web::Data<Arc<AppState>>,
    request: web::Json<JoinClassRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;

    let membership = state
        .enrollment_service
        .join_class(&auth.0, &request.code)
        .await?;
    Ok(HttpResponse::Ok().json(MembershipResponse::from(membership)))
}

#[get("/enrollments")]
pub async fn my_classes(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let classes = state.enrollment_service.classes_for_student(&auth.0).await?;
    Ok(HttpResponse::Ok().json(classes))
}

#[delete("/enrollments/{class_id}")]
pub async fn leave_class(
    state: web::Data<Arc<AppState>>,
    class_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state
        .enrollment_service
        .leave_class(&auth.0, &class_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
