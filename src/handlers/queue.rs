//! HTTP handlers for the `/queue` endpoints.

use actix_web::{web, HttpResponse, Responder};
use log::debug;
use serde::Deserialize;

use super::error_response;
use crate::models::{job, ApplicationState, QuayError};

#[derive(Debug, Deserialize)]
pub struct PeekParams {
    #[serde(default)]
    start: usize,

    #[serde(default = "default_peek_count")]
    count: usize,
}

fn default_peek_count() -> usize {
    1
}

/// Handle `GET /queue` requests to get a JSON list of all known queues.
///
/// # Returns
///
/// * 200 - JSON response containing list of queue names.
pub async fn index(data: web::Data<ApplicationState>) -> impl Responder {
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response("Failed to fetch queue names", QuayError::from(err)),
    };

    match data.redis_manager.queues(&mut conn).await {
        Ok(queue_names) => HttpResponse::Ok().json(queue_names),
        Err(err) => error_response("Failed to fetch queue names", err),
    }
}

/// Handles `GET /queue/{queue_name}` requests, giving the number of queued jobs.
pub async fn size(path: web::Path<String>, data: web::Data<ApplicationState>) -> impl Responder {
    let queue_name = path.into_inner();
    let context = format!("[queue:{}] failed to fetch queue size", &queue_name);
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response(&context, QuayError::from(err)),
    };

    match data.redis_manager.size(&mut conn, &queue_name).await {
        Ok(size) => HttpResponse::Ok().json(size),
        Err(err) => error_response(&context, err),
    }
}

/// Handles `GET /queue/{queue_name}/peek?start=0&count=1` requests.
///
/// # Returns
///
/// * 200 - a single job (or null) when `count` is 1, otherwise a list of jobs
pub async fn peek(
    path: web::Path<String>,
    params: web::Query<PeekParams>,
    data: web::Data<ApplicationState>,
) -> impl Responder {
    let queue_name = path.into_inner();
    let context = format!("[queue:{}] failed to peek at jobs", &queue_name);
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response(&context, QuayError::from(err)),
    };

    match data
        .redis_manager
        .peek(&mut conn, &queue_name, params.start, params.count)
        .await
    {
        Ok(jobs) => {
            debug!("[queue:{}] peeked at {} jobs", &queue_name, jobs.len());
            HttpResponse::Ok().json(jobs)
        }
        Err(err) => error_response(&context, err),
    }
}

/// Handles `POST /queue/{queue_name}/job` requests, pushing a new job to the queue.
///
/// # Returns
///
/// * 201 - job was queued, JSON body is the queue's new size
/// * 400 - invalid queue name
pub async fn enqueue(
    path: web::Path<String>,
    json: web::Json<job::Payload>,
    data: web::Data<ApplicationState>,
) -> impl Responder {
    let queue_name = path.into_inner();
    let job::Payload { class, args } = json.into_inner();
    let context = format!("[queue:{}] failed to enqueue job", &queue_name);
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response(&context, QuayError::from(err)),
    };

    match data.redis_manager.enqueue(&mut conn, &queue_name, &class, args).await {
        Ok(size) => HttpResponse::Created()
            .insert_header(("Location", format!("/queue/{}", queue_name)))
            .json(size),
        Err(err) => error_response(&context, err),
    }
}

/// Handles `GET /queue/{queue_name}/job` requests, taking the next job from the queue.
///
/// # Returns
///
/// * 200 - JSON job payload
/// * 204 - queue is empty, possibly after the configured `reserve_delay`
pub async fn reserve(path: web::Path<String>, data: web::Data<ApplicationState>) -> impl Responder {
    let queue_name = path.into_inner();
    let context = format!("[queue:{}] failed to reserve job", &queue_name);
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return error_response(&context, QuayError::from(err)),
    };

    match data.redis_manager.reserve(&mut conn, &queue_name).await {
        Ok(Some(job)) => HttpResponse::Ok().json(job),
        Ok(None) => match &data.config.server.reserve_delay {
            Some(delay) if !delay.is_zero() => {
                // release the connection before waiting
                drop(conn);
                tokio::time::sleep(delay.0).await;
                HttpResponse::NoContent().finish()
            }
            _ => HttpResponse::NoContent().finish(),
        },
        Err(err) => error_response(&context, err),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn peek_param_defaults() {
        let params: PeekParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.start, 0);
        assert_eq!(params.count, 1);

        let params: PeekParams = serde_json::from_str(r#"{"start": 5, "count": 10}"#).unwrap();
        assert_eq!(params.start, 5);
        assert_eq!(params.count, 10);
    }
}
