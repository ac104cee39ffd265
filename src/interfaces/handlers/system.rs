use actix_web::{web, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use parking_lot::RwLock;
use std::{
    time::Duration,
    sync::atomic::{AtomicI64, Ordering},
};
use sysinfo::System;
use serde::Serialize;
use tracing::instrument;

use crate::{
    constants::{HEALTH_CACHE_SECS, START_TIME},
    repositories::student::StudentRepository,
    AppState,
};

#[derive(Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct HealthCheckResponse {
    status: String,
    message: String,
    timestamp: String,
    uptime: String,
    version: String,
    storage: String,
    database: String,
    memory_usage: String,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

async fn build_health_response(state: &AppState) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let database_ok = match state.student_handler.student_repo.check_connection().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Health check could not reach the store: {}", e);
            false
        }
    };

    let mut sys = System::new_all();
    sys.refresh_all();
    let process = sysinfo::get_current_pid().ok().and_then(|pid| sys.process(pid));
    let memory_usage = process.map_or("Unknown".to_string(), |p|
        format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0)
    );

    let (status, message, database) = if database_ok {
        ("OK", "Student Records API is running", "Connected")
    } else {
        ("DEGRADED", "Student store is unavailable", "Unavailable")
    };

    HealthCheckResponse {
        status: status.to_string(),
        message: message.to_string(),
        timestamp: now_utc.to_rfc3339(),
        uptime: human_uptime.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage.to_string(),
        database: database.to_string(),
        memory_usage,
    }
}

#[instrument(skip(state))]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > HEALTH_CACHE_SECS {
        let response = build_health_response(&state).await;

        *CACHED_STATUS.write() = response.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);

        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::Ok().json(CACHED_STATUS.read().clone())
    }
}
