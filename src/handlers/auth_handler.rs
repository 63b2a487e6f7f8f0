use std::sync::Arc;

use actix_web::{get, post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{bearer_token, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{LoginRequest, RegisterRequest},
        response::{LoginResponse, MeResponse, UserResponse},
    },
};

#[post("/api/auth/register")]
pub async fn register(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.register(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[post("/api/auth/login")]
pub async fn login(
    state: web::Data<Arc<AppState>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let (token, user) = state
        .session_guard
        .authenticate(&request.identifier, &request.password)
        .await?;

    log::info!("User '{}' logged in", user.username);

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Deliberately outside the auth scope: terminating a session must succeed
/// even when the token is already dead.
#[post("/api/auth/logout")]
pub async fn logout(
    state: web::Data<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    if let Some(token) = bearer_token(req.headers()) {
        state.session_guard.terminate(token).await?;
    }

    Ok(HttpResponse::NoContent().finish())
}

#[get("/auth/me")]
pub async fn me(auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(MeResponse::from(auth.0)))
}
