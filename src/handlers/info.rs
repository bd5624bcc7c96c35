//! Handlers for getting general information about queues and workers as a whole.

use actix_web::{web, HttpResponse, Responder};

use super::error_response;
use crate::models::{ApplicationState, QuayError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handles `GET /info` requests.
///
/// # Returns
///
/// * 200 - JSON containing pending/processed/failed counts, and numbers of queues/workers
pub async fn index(data: web::Data<ApplicationState>) -> impl Responder {
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response("Failed to fetch summary data", QuayError::from(err)),
    };

    match data.redis_manager.info(&mut conn).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response("Failed to fetch summary data", err),
    }
}

/// Handles `GET /info/version` requests.
pub async fn version() -> impl Responder {
    HttpResponse::Ok().json(VERSION)
}
