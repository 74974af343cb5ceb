//! REST surface for customer records under `/api/v1/customers`.
//!
//! Every request gets a fresh correlation id. It is attached to the log
//! events a handler emits and to the error body returned on failure.

use std::fmt::Display;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use customers_core::domain::customer::{
    Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest,
};
use customers_core::errors::{CustomerError, InterfaceError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::bootstrap::SharedCustomerService;

#[derive(Clone)]
pub struct CustomerApiState {
    service: SharedCustomerService,
}

impl CustomerApiState {
    pub fn new(service: SharedCustomerService) -> Self {
        Self { service }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub fn router(service: SharedCustomerService) -> Router {
    Router::new()
        .route("/api/v1/customers", get(list_customers).post(register_customer))
        .route(
            "/api/v1/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .with_state(CustomerApiState::new(service))
}

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn api_error(
    error: CustomerError,
    operation: &'static str,
    correlation_id: String,
) -> (StatusCode, Json<ApiError>) {
    let interface = error.clone().into_interface(correlation_id);
    let status = match &interface {
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };

    if status.is_server_error() {
        error!(
            event_name = "customer.request.failed",
            correlation_id = %interface.correlation_id(),
            operation,
            error = %error,
            "customer request failed"
        );
    } else {
        warn!(
            event_name = "customer.request.rejected",
            correlation_id = %interface.correlation_id(),
            operation,
            status = status.as_u16(),
            reason = %error,
            "customer request rejected"
        );
    }

    let body = ApiError {
        error: interface.user_message().to_string(),
        correlation_id: interface.correlation_id().to_string(),
    };
    (status, Json(body))
}

/// Extractor rejections (unparseable body, unknown enum text, non-numeric id) use the same
/// body as domain errors.
fn malformed_request(
    rejection: impl Display,
    operation: &'static str,
    correlation_id: String,
) -> (StatusCode, Json<ApiError>) {
    warn!(
        event_name = "customer.request.rejected",
        correlation_id = %correlation_id,
        operation,
        status = StatusCode::BAD_REQUEST.as_u16(),
        reason = %rejection,
        "customer request rejected"
    );
    let body = ApiError { error: format!("malformed request: {rejection}"), correlation_id };
    (StatusCode::BAD_REQUEST, Json(body))
}

pub async fn list_customers(
    State(state): State<CustomerApiState>,
) -> ApiResult<Json<Vec<Customer>>> {
    let correlation_id = new_correlation_id();
    let customers = state
        .service
        .list_customers()
        .await
        .map_err(|e| api_error(e, "list", correlation_id))?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<CustomerApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Customer>> {
    let correlation_id = new_correlation_id();
    let Path(id) = id.map_err(|r| malformed_request(r, "get", correlation_id.clone()))?;
    let customer = state
        .service
        .get_customer(CustomerId(id))
        .await
        .map_err(|e| api_error(e, "get", correlation_id))?;
    Ok(Json(customer))
}

pub async fn register_customer(
    State(state): State<CustomerApiState>,
    request: Result<Json<CustomerRegistrationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let correlation_id = new_correlation_id();
    let Json(request) =
        request.map_err(|r| malformed_request(r, "register", correlation_id.clone()))?;
    let customer = state
        .service
        .add_customer(request)
        .await
        .map_err(|e| api_error(e, "register", correlation_id.clone()))?;

    info!(
        event_name = "customer.created",
        correlation_id = %correlation_id,
        customer_id = %customer.id,
        "customer registered"
    );
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<CustomerApiState>,
    id: Result<Path<i64>, PathRejection>,
    request: Result<Json<CustomerUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<Customer>> {
    let correlation_id = new_correlation_id();
    let Path(id) = id.map_err(|r| malformed_request(r, "update", correlation_id.clone()))?;
    let Json(request) =
        request.map_err(|r| malformed_request(r, "update", correlation_id.clone()))?;
    let customer = state
        .service
        .update_customer(CustomerId(id), request)
        .await
        .map_err(|e| api_error(e, "update", correlation_id.clone()))?;

    info!(
        event_name = "customer.updated",
        correlation_id = %correlation_id,
        customer_id = %customer.id,
        "customer updated"
    );
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<CustomerApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let correlation_id = new_correlation_id();
    let Path(id) = id.map_err(|r| malformed_request(r, "delete", correlation_id.clone()))?;
    state
        .service
        .remove_customer_by_id(CustomerId(id))
        .await
        .map_err(|e| api_error(e, "delete", correlation_id.clone()))?;

    info!(
        event_name = "customer.deleted",
        correlation_id = %correlation_id,
        customer_id = id,
        "customer deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
