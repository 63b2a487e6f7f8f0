use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use aula_server::{
    app_state::AppState,
    auth::AuthMiddleware,
    config::Config,
    handlers,
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = Arc::new(
        AppState::new(config)
            .await
            .expect("failed to initialise application state"),
    );

    log::info!("starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .wrap(Cors::permissive())
            // Public surface: registration, login, logout, health
            .service(handlers::register)
            .service(handlers::login)
            .service(handlers::logout)
            .service(handlers::health_check)
            .service(handlers::health_check_ready)
            .service(handlers::health_check_live)
            // Everything else requires a live session
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .service(handlers::me)
                    .service(handlers::create_class)
                    .service(handlers::list_classes)
                    .service(handlers::regenerate_code)
                    .service(handlers::delete_class)
                    .service(handlers::roster)
                    .service(handlers::remove_student)
                    .service(handlers::join_class)
                    .service(handlers::my_classes)
                    .service(handlers::leave_class)
                    .service(handlers::overview)
                    .service(handlers::class_lessons),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
