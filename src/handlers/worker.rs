//! HTTP handlers for the `/worker` endpoints.

use actix_web::{web, HttpResponse, Responder};

use super::error_response;
use crate::models::{worker, ApplicationState, QuayError};

/// Handles `GET /worker` requests, listing all registered worker IDs.
pub async fn index(data: web::Data<ApplicationState>) -> impl Responder {
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response("Failed to fetch workers", QuayError::from(err)),
    };

    match data.redis_manager.workers(&mut conn).await {
        Ok(ids) => HttpResponse::Ok().json(ids),
        Err(err) => error_response("Failed to fetch workers", err),
    }
}

/// Handles `GET /worker/working` requests.
///
/// # Returns
///
/// * 200 - JSON object mapping each working worker's ID to its current status
pub async fn working(data: web::Data<ApplicationState>) -> impl Responder {
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response("Failed to fetch worker statuses", QuayError::from(err)),
    };

    match data.redis_manager.worker_statuses(&mut conn).await {
        Ok(statuses) => HttpResponse::Ok().json(statuses),
        Err(err) => error_response("Failed to fetch worker statuses", err),
    }
}

/// Handles `GET /worker/{worker_id}` requests.
///
/// # Returns
///
/// * 200 - JSON summary of the worker's state, status and counters
/// * 404 - worker is not registered
pub async fn summary(path: web::Path<String>, data: web::Data<ApplicationState>) -> impl Responder {
    let worker_id = path.into_inner();
    let context = format!("[worker:{}] failed to fetch summary", &worker_id);
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response(&context, QuayError::from(err)),
    };

    match data.redis_manager.worker_summary(&mut conn, &worker_id).await {
        Ok(summary) if summary.state == worker::State::Unregistered => {
            HttpResponse::NotFound().finish()
        }
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response(&context, err),
    }
}
