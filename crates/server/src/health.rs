//! `GET /health`: readiness of the service, judged by a read against the `customer` table.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use customers_db::DbPool;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Degraded,
}

impl Readiness {
    fn status_code(self) -> StatusCode {
        match self {
            Self::Ready => StatusCode::OK,
            Self::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub reachable: bool,
    /// Whether the read returned a row. Informational only; an empty table is still ready.
    pub has_customers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: Readiness,
    pub database: DatabaseStatus,
    pub checked_at: DateTime<Utc>,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(db_pool)
}

pub async fn health(State(pool): State<DbPool>) -> (StatusCode, Json<HealthReport>) {
    let database = check_database(&pool).await;
    let status = if database.reachable { Readiness::Ready } else { Readiness::Degraded };
    let report = HealthReport { status, database, checked_at: Utc::now() };
    (status.status_code(), Json(report))
}

async fn check_database(pool: &DbPool) -> DatabaseStatus {
    let row = sqlx::query_scalar::<_, i64>("SELECT 1 FROM customer LIMIT 1")
        .fetch_optional(pool)
        .await;
    match row {
        Ok(row) => DatabaseStatus { reachable: true, has_customers: row.is_some(), error: None },
        Err(error) => DatabaseStatus {
            reachable: false,
            has_customers: false,
            error: Some(error.to_string()),
        },
    }
}
