use actix_web::web;

use crate::handlers::profiles;

// Fixed paths go before `/{profile_id}`, which would otherwise claim them.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profiles")
            .service(
                web::resource("")
                    .route(web::get().to(profiles::list_profiles))
                    .route(web::post().to(profiles::create_profile))
            )
            .service(
                web::resource("/facets")
                    .route(web::get().to(profiles::get_facets))
            )
            .service(
                web::resource("/reload")
                    .route(web::post().to(profiles::reload_profiles))
            )
            .service(
                web::resource("/{profile_id}")
                    .route(web::get().to(profiles::get_profile))
                    .route(web::put().to(profiles::update_profile))
                    .route(web::delete().to(profiles::delete_profile))
            )
    );
}
