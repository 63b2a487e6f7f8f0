use std::sync::Arc;

use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState, auth::AuthenticatedUser, errors::AppError,
    models::dto::response::LessonResponse,
};

#[get("/admin/overview")]
pub async fn overview(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let overview = state.admin_service.overview(&auth.0).await?;
    Ok(HttpResponse::Ok().json(overview))
}

#[get("/admin/classes/{class_id}/lessons")]
pub async fn class_lessons(
    state: web::Data<Arc<AppState>>,
    class_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let lessons = state
        .admin_service
        .lessons_for_class(&auth.0, &class_id)
        .await?;
    let response: Vec<LessonResponse> = lessons.into_iter().map(LessonResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}
