use actix_web::web;

use crate::handlers::{home::home, system::health_check};

mod students;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api")
            .service(web::resource("/health").route(web::get().to(health_check)))
            .configure(students::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
