use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use chrono::Utc;
use std::time::Duration;
use sysinfo::System;
use serde::Serialize;

use crate::{constants::START_TIME, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    repository: String,
    profiles_loaded: usize,
    version: String,
    memory_usage: String,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let repository = match state.profile_handler.profile_repo.check_connection().await {
        Ok(_) => "OK".to_string(),
        Err(e) => {
            tracing::warn!("Repository health check failed: {}", e);
            "Unavailable".to_string()
        }
    };

    let mut sys = System::new();
    let memory_usage = match sysinfo::get_current_pid() {
        Ok(pid) => {
            sys.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
            sys.process(pid).map_or("Unknown".to_string(), |p| {
                format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0)
            })
        }
        Err(_) => "Unknown".to_string(),
    };

    let status = if repository == "OK" { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: status.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        repository,
        profiles_loaded: state.profile_handler.store.len(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_usage,
    })
}
