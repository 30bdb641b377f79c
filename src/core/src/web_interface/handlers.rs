use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{error, info, warn};
use warp::{http::StatusCode, reply, Rejection, Reply};

use super::simulation::{self, RandomOutcome};
use super::types::*;
use crate::configuration::types::SimulationConfig;
use crate::error_handling::types::StorageError;
use crate::instrumentation;
use crate::storage::storage_trait::UserStorage;

/// Shared dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn UserStorage>,
    pub simulation: SimulationConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(storage: Arc<dyn UserStorage>, simulation: SimulationConfig) -> Self {
        Self {
            storage,
            simulation,
            started_at: Instant::now(),
        }
    }
}

/// A fault that escaped its handler. Turned into a 500 by the rejection
/// handler and reported through instrumentation.
#[derive(Debug)]
pub struct UnhandledFault {
    pub message: String,
}

impl fmt::Display for UnhandledFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UnhandledFault {}

impl warp::reject::Reject for UnhandledFault {}

pub fn json_response<T: serde::Serialize>(body: &T, status: StatusCode) -> reply::Response {
    reply::with_status(reply::json(body), status).into_response()
}

fn error_response(message: impl Into<String>, status: StatusCode) -> reply::Response {
    json_response(&ApiResponse::error(message), status)
}

fn storage_error_response(context: &str, err: &StorageError) -> reply::Response {
    match err {
        StorageError::ConstraintViolation(_) => {
            warn!("{}: {}", context, err);
            error_response(err.to_string(), StatusCode::CONFLICT)
        }
        _ => {
            error!("{}: {}", context, err);
            error_response(err.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/health
pub async fn health(state: AppState) -> Result<reply::Response, Rejection> {
    let body = HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    };
    Ok(json_response(&body, StatusCode::OK))
}

/// GET /api/users
pub async fn list_users(state: AppState) -> Result<reply::Response, Rejection> {
    match state.storage.list_users().await {
        Ok(users) => Ok(json_response(&ApiResponse::ok(users), StatusCode::OK)),
        Err(e) => Ok(storage_error_response("Error fetching users", &e)),
    }
}

/// GET /api/users/:id
///
/// A non-numeric id cannot match any row, so it is reported like an unknown
/// one.
pub async fn get_user(id: String, state: AppState) -> Result<reply::Response, Rejection> {
    let id = match id.parse::<i32>() {
        Ok(id) => id,
        Err(_) => return Ok(error_response("User not found", StatusCode::NOT_FOUND)),
    };

    match state.storage.get_user(id).await {
        Ok(Some(user)) => Ok(json_response(&ApiResponse::ok(user), StatusCode::OK)),
        Ok(None) => Ok(error_response("User not found", StatusCode::NOT_FOUND)),
        Err(e) => Ok(storage_error_response("Error fetching user", &e)),
    }
}

/// POST /api/users
pub async fn create_user(
    request: CreateUserRequest,
    state: AppState,
) -> Result<reply::Response, Rejection> {
    let (name, email) = match request.validate() {
        Ok(fields) => fields,
        Err(message) => return Ok(error_response(message, StatusCode::BAD_REQUEST)),
    };

    match state.storage.create_user(name, email).await {
        Ok(user) => {
            info!("User created: {}", user.id);
            Ok(json_response(&ApiResponse::ok(user), StatusCode::CREATED))
        }
        Err(e) => Ok(storage_error_response("Error creating user", &e)),
    }
}

/// GET /api/slow-query?delay=<ms>
pub async fn slow_query(
    params: SlowQueryParams,
    state: AppState,
) -> Result<reply::Response, Rejection> {
    let delay = simulation::positive_or_default(
        params.delay.as_deref(),
        state.simulation.default_delay_ms,
    );
    info!("Executing slow query with {}ms delay", delay);

    tokio::time::sleep(Duration::from_millis(delay)).await;

    match state.storage.list_users().await {
        Ok(users) => Ok(json_response(
            &ApiResponse::ok_with_message(
                users,
                format!("Intentionally slow response ({}ms)", delay),
            ),
            StatusCode::OK,
        )),
        Err(e) => Ok(storage_error_response("Error in slow query", &e)),
    }
}

/// GET /api/memory-intensive?size=<n>
pub async fn memory_intensive(
    params: MemoryParams,
    state: AppState,
) -> Result<reply::Response, Rejection> {
    let size = simulation::positive_or_default(
        params.size.as_deref(),
        state.simulation.default_array_size as u64,
    );
    if size > state.simulation.max_array_size as u64 {
        warn!("Rejected memory-intensive request for {} elements", size);
        return Ok(error_response(
            format!(
                "size must not exceed {} elements",
                state.simulation.max_array_size
            ),
            StatusCode::BAD_REQUEST,
        ));
    }
    let size = size as usize;
    info!("Creating large array with {} elements", size);

    let records = simulation::allocate_records(size);
    let report = MemoryReport {
        elements: records.len(),
        approximate_bytes: simulation::approximate_bytes(&records),
    };
    let message = format!("Created array with {} elements", records.len());
    drop(records);

    Ok(json_response(
        &ApiResponse::ok_with_message(report, message),
        StatusCode::OK,
    ))
}

/// GET /api/random-error
pub async fn random_error() -> Result<reply::Response, Rejection> {
    respond_to_roll(rand::random::<f64>())
}

pub fn respond_to_roll(roll: f64) -> Result<reply::Response, Rejection> {
    match simulation::random_outcome(roll) {
        RandomOutcome::Fault => {
            error!("Random error occurred!");
            Err(warp::reject::custom(UnhandledFault {
                message: String::from(
                    "Random error occurred! This is for testing error tracking.",
                ),
            }))
        }
        RandomOutcome::NotFound => {
            warn!("Returning 404 error");
            Ok(error_response("Resource not found", StatusCode::NOT_FOUND))
        }
        RandomOutcome::ServerError => {
            warn!("Returning 500 error");
            Ok(error_response(
                "Internal server error",
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
        RandomOutcome::Success => Ok(json_response(
            &ApiResponse::message("No error this time!"),
            StatusCode::OK,
        )),
    }
}

/// GET /api/external-call
pub async fn external_call(state: AppState) -> Result<reply::Response, Rejection> {
    info!("Simulating external API call");
    let delay = state.simulation.external_call_delay_ms;
    tokio::time::sleep(Duration::from_millis(delay)).await;

    let body = ExternalCallData {
        service: "external-api",
        data: ExternalPayload {
            message: "This simulates an external service call",
        },
        response_time: delay,
    };
    Ok(json_response(&ApiResponse::ok(body), StatusCode::OK))
}

/// GET /api/custom-metrics
pub async fn custom_metrics() -> Result<reply::Response, Rejection> {
    instrumentation::record_metric("custom.business_metric", rand::random::<f64>() * 100.0);
    instrumentation::increment_counter("custom.user_actions");
    instrumentation::add_custom_attribute("customerId", "12345");
    instrumentation::add_custom_attribute("planType", "premium");

    info!("Custom metrics recorded");
    Ok(json_response(
        &ApiResponse::message("Custom metrics recorded"),
        StatusCode::OK,
    ))
}

/// GET /api/complex-operation
///
/// List, pause, fetch the first three users concurrently, pause again.
pub async fn complex_operation(state: AppState) -> Result<reply::Response, Rejection> {
    info!("Starting complex operation");
    let step = Duration::from_millis(state.simulation.complex_step_delay_ms);

    let users = match state.storage.list_users().await {
        Ok(users) => users,
        Err(e) => return Ok(storage_error_response("Error in complex operation", &e)),
    };
    tokio::time::sleep(step).await;

    let lookups: Vec<_> = users
        .iter()
        .take(3)
        .map(|user| {
            let storage = state.storage.clone();
            let id = user.id;
            tokio::spawn(async move { storage.get_user(id).await })
        })
        .collect();

    let mut sample_users = Vec::with_capacity(lookups.len());
    for lookup in lookups {
        match lookup.await {
            Ok(Ok(user)) => sample_users.push(user),
            Ok(Err(e)) => return Ok(storage_error_response("Error in complex operation", &e)),
            Err(e) => {
                return Err(warp::reject::custom(UnhandledFault {
                    message: format!("user lookup task failed: {}", e),
                }))
            }
        }
    }
    tokio::time::sleep(step).await;

    let body = ComplexOperationData {
        total_users: users.len(),
        sample_users,
    };
    Ok(json_response(&ApiResponse::ok(body), StatusCode::OK))
}
