//! Module containing HTTP handlers. Mapping to these from various routes is configured in
//! `quay-server.rs`.

use actix_web::HttpResponse;
use log::error;

use crate::models::QuayError;

pub mod failed;
pub mod health;
pub mod info;
pub mod queue;
pub mod worker;

/// Convert an error into a response, logging anything that wasn't caused by the request itself.
fn error_response(context: &str, err: QuayError) -> HttpResponse {
    match err {
        QuayError::BadRequest(msg) => HttpResponse::BadRequest().body(msg),
        err if err.is_unavailable() => {
            error!("{}: {}", context, err);
            HttpResponse::ServiceUnavailable().body(err.to_string())
        }
        err => {
            error!("{}: {}", context, err);
            HttpResponse::InternalServerError().body(err.to_string())
        }
    }
}
