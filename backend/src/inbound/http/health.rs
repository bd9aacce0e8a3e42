//! Health endpoints: the client-facing status check plus liveness and
//! readiness probes for orchestrators.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::connections::iso8601;

/// Shared readiness and liveness flags.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Start live but not ready.
    ///
    /// # Examples
    /// ```
    /// use snapbeam::inbound::http::health::HealthState;
    ///
    /// let state = HealthState::new();
    /// assert!(!state.is_ready());
    /// state.mark_ready();
    /// assert!(state.is_ready());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass readiness probes once the listener is bound.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness probes from now on, e.g. while draining for shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Whether the server has been marked ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whether liveness probes still pass.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Response for `/health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    #[schema(example = "SnapBeam API is running")]
    pub message: String,
    #[schema(example = "2025-03-01T09:30:00.000Z")]
    pub timestamp: String,
}

/// Report that the API is up, with the server's current time.
///
/// Answers every method; [`crate::inbound::http::configure`] mounts it as a
/// resource rather than a `GET` route.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "API is running", body = HealthResponse)),
    tags = ["health"],
    operation_id = "health"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        success: true,
        message: "SnapBeam API is running".to_owned(),
        timestamp: iso8601(Utc::now()),
    })
}

/// Readiness probe: 200 once the stores are wired and the listener is bound.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    ),
    tags = ["health"]
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe: 200 until [`HealthState::mark_unhealthy`] is called.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    ),
    tags = ["health"]
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}
