use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::JwtSettings;
use crate::domain::UserRole;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    change_password, delete_user, get_users, health_check, login, me, refresh, register, signup,
    toggle_block,
};
use crate::store::UserStore;

/// Build the server. Each protected resource declares its permitted role
/// set on the gate middleware; handlers never re-check roles.
pub fn run(
    listener: TcpListener,
    store: Arc<dyn UserStore>,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let store_data: web::Data<dyn UserStore> = web::Data::from(store);
    let jwt_config_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store_data.clone())
            .app_data(jwt_config_data.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    // Public routes (no authentication required)
                    .route("/login", web::post().to(login))
                    .route("/signup", web::post().to(signup))
                    .route("/refresh", web::post().to(refresh))
                    // Any authenticated identity
                    .service(
                        web::resource("/me")
                            .wrap(JwtMiddleware::authenticated(jwt_config.clone()))
                            .route(web::get().to(me)),
                    )
                    .service(
                        web::resource("/change-password")
                            .wrap(JwtMiddleware::authenticated(jwt_config.clone()))
                            .route(web::patch().to(change_password)),
                    )
                    // Admin tiers
                    .service(
                        web::resource("/register")
                            .wrap(JwtMiddleware::allow(jwt_config.clone(), UserRole::ADMINS))
                            .route(web::post().to(register)),
                    )
                    .service(
                        web::resource("/users")
                            .wrap(JwtMiddleware::allow(jwt_config.clone(), UserRole::ADMINS))
                            .route(web::get().to(get_users)),
                    )
                    // SUPER_ADMIN only
                    .service(
                        web::resource("/users/{id}")
                            .wrap(JwtMiddleware::allow(
                                jwt_config.clone(),
                                UserRole::SUPER_ADMIN_ONLY,
                            ))
                            .route(web::delete().to(delete_user)),
                    )
                    .service(
                        web::resource("/users/{id}/block")
                            .wrap(JwtMiddleware::allow(
                                jwt_config.clone(),
                                UserRole::SUPER_ADMIN_ONLY,
                            ))
                            .route(web::patch().to(toggle_block)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
