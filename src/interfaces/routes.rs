use actix_files::Files;
use actix_web::web;

use crate::{
    constants::UPLOADS_PATH,
    handlers::home::home,
    settings::{AppConfig, RepositoryBackend},
};

mod admin;
mod json_error;
mod profiles;

pub fn configure_routes(cfg: &mut web::ServiceConfig, config: &AppConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api/v1")
            .configure(admin::config_routes)
            .configure(profiles::config_routes)
    );

    // Images written by the local blob store are served from here.
    if config.backend == RepositoryBackend::Local {
        cfg.service(Files::new(UPLOADS_PATH, &config.local_upload_dir));
    }

    cfg.configure(|cfg| json_error::config_routes(cfg, config.request_body_limit()));
}
