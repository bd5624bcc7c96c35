//! HTTP handlers for the `/failed` endpoints.

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::error_response;
use crate::models::{ApplicationState, QuayError};

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    #[serde(default)]
    start: usize,

    #[serde(default = "default_count")]
    count: usize,
}

fn default_count() -> usize {
    20
}

/// Handles `GET /failed?start=0&count=20` requests, listing failure records oldest first.
pub async fn index(
    params: web::Query<RangeParams>,
    data: web::Data<ApplicationState>,
) -> impl Responder {
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response("Failed to fetch failures", QuayError::from(err)),
    };

    match data.redis_manager.failures(&mut conn, params.start, params.count).await {
        Ok(failures) => HttpResponse::Ok().json(failures),
        Err(err) => error_response("Failed to fetch failures", err),
    }
}

/// Handles `GET /failed/count` requests.
pub async fn count(data: web::Data<ApplicationState>) -> impl Responder {
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response("Failed to count failures", QuayError::from(err)),
    };

    match data.redis_manager.failed_count(&mut conn).await {
        Ok(count) => HttpResponse::Ok().json(count),
        Err(err) => error_response("Failed to count failures", err),
    }
}

/// Handles `DELETE /failed` requests, emptying the failure log.
///
/// # Returns
///
/// * 200 - JSON number of failure records removed
pub async fn clear(data: web::Data<ApplicationState>) -> impl Responder {
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response("Failed to clear failures", QuayError::from(err)),
    };

    match data.redis_manager.clear_failures(&mut conn).await {
        Ok(count) => HttpResponse::Ok().json(count),
        Err(err) => error_response("Failed to clear failures", err),
    }
}
