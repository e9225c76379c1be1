use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Profile Directory API!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "profiles": "/api/v1/profiles",
        "health": "/api/v1/admin/health"
    }))
}
