//! Defines handlers for health check HTTP endpoints.

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::application::RedisManager;
use crate::models::ApplicationState;

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct Health {
    status: HealthStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Health {
    fn new_healthy() -> Self {
        Health {
            status: HealthStatus::Healthy,
            error: None,
        }
    }

    fn new_from_error<S: Into<String>>(err: S) -> Self {
        Health {
            status: HealthStatus::Unhealthy,
            error: Some(err.into()),
        }
    }
}

/// Handles `GET /health` requests by pinging Redis.
pub async fn index(data: web::Data<ApplicationState>) -> impl Responder {
    let mut conn = match data.pool.get().await {
        Ok(conn) => conn,
        Err(err) => return HttpResponse::Ok().json(Health::new_from_error(err.to_string())),
    };

    match RedisManager::check_ping(&mut conn).await {
        Ok(()) => HttpResponse::Ok().json(Health::new_healthy()),
        Err(err) => HttpResponse::Ok().json(Health::new_from_error(err.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serialisation() {
        let h = Health::new_healthy();
        assert_eq!(
            serde_json::to_string(&h).unwrap(),
            "{\"status\":\"healthy\"}"
        );

        let h = Health::new_from_error("message");
        assert_eq!(
            serde_json::to_string(&h).unwrap(),
            "{\"status\":\"unhealthy\",\"error\":\"message\"}"
        );
    }
}
