/// Health endpoints
///
/// `/api/v1/health` probes every registered dependency and answers 503 when
/// any of them is down; `/api/v1/health/live` only reports that the process
/// is serving requests.
use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use chrono::Utc;
use s3_utils::S3Client;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// A dependency the service cannot work without
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self) -> Result<(), String>;
}

#[async_trait]
impl HealthProbe for PgPool {
    async fn check(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(self)
            .await
            .map(|_| ())
            .map_err(|e| format!("PostgreSQL connection failed: {}", e))
    }
}

#[async_trait]
impl HealthProbe for S3Client {
    async fn check(&self) -> Result<(), String> {
        self.health_check().await.map_err(|e| e.to_string())
    }
}

#[derive(Clone, Default)]
pub struct HealthState {
    probes: Vec<(&'static str, Arc<dyn HealthProbe>)>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(mut self, name: &'static str, probe: Arc<dyn HealthProbe>) -> Self {
        self.probes.push((name, probe));
        self
    }
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    latency_ms: u64,
}

#[derive(Serialize)]
struct HealthResponse {
    service: &'static str,
    version: &'static str,
    status: ComponentStatus,
    checks: BTreeMap<&'static str, ComponentCheck>,
    timestamp: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies reachable"),
        (status = 503, description = "At least one dependency is down"),
    )
)]
pub async fn health(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = BTreeMap::new();
    let mut healthy = true;

    for (name, probe) in &state.probes {
        let start = Instant::now();
        let result = probe.check().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let check = match result {
            Ok(()) => ComponentCheck {
                status: ComponentStatus::Healthy,
                message: None,
                latency_ms,
            },
            Err(message) => {
                tracing::warn!(component = name, %message, "health probe failed");
                healthy = false;
                ComponentCheck {
                    status: ComponentStatus::Unhealthy,
                    message: Some(message),
                    latency_ms,
                }
            }
        };
        checks.insert(*name, check);
    }

    let response = HealthResponse {
        service: "story-service",
        version: env!("CARGO_PKG_VERSION"),
        status: if healthy {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        },
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/health/live",
    tag = "health",
    responses((status = 200, description = "Process is up"))
)]
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
