use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::configuration::Settings;
use crate::domain::Role;
use crate::middleware::{AuthMiddleware, RequestLogger, RoleGuard};
use crate::repository::{
    AccountRepository, PgAccountRepository, PgProfileRepository, PgRefreshTokenRepository,
    ProfileRepository, RefreshTokenRepository,
};
use crate::routes::{health_check, login, logout, logout_all, me, refresh, signup};

pub fn run(
    listener: TcpListener,
    pool: PgPool,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    crate::error::set_detailed_errors(!settings.application.is_production());

    let auth_settings = settings.auth.clone();

    let accounts: Arc<dyn AccountRepository> = Arc::new(PgAccountRepository::new(pool.clone()));
    let refresh_tokens: Arc<dyn RefreshTokenRepository> =
        Arc::new(PgRefreshTokenRepository::new(pool.clone()));
    let profiles: Arc<dyn ProfileRepository> = Arc::new(PgProfileRepository::new(pool));

    let service = web::Data::new(AuthService::new(
        accounts,
        refresh_tokens,
        profiles,
        auth_settings.clone(),
    ));
    let auth_settings_data = web::Data::new(auth_settings.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(service.clone())
            .app_data(auth_settings_data.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    // Public credential endpoints
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    // Endpoints needing a validated access token
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new(auth_settings.clone()))
                            .route("/logout", web::post().to(logout))
                            .route("/logout-all", web::post().to(logout_all))
                            .route("/me", web::get().to(me)),
                    ),
            )
            .service(
                // Outermost middleware registers last: the validator runs
                // before the role gate.
                web::scope("/vendors")
                    .wrap(RoleGuard::allow([Role::Vendor]))
                    .wrap(AuthMiddleware::new(auth_settings.clone()))
                    .route("/me", web::get().to(me)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
