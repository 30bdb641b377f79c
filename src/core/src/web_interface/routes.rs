use std::convert::Infallible;

use log::{error, info};
use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use super::handlers::{self, json_response, AppState, UnhandledFault};
use super::types::{ApiResponse, MemoryParams, SlowQueryParams};
use crate::instrumentation;

/// Largest accepted JSON body, in bytes
const MAX_BODY_BYTES: u64 = 16 * 1024;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// GET /api/health
pub fn health_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "health")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::health)
}

/// GET /api/users
pub fn list_users_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "users")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::list_users)
}

/// GET /api/users/:id
pub fn get_user_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "users" / String)
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::get_user)
}

/// POST /api/users
pub fn create_user_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "users")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(handlers::create_user)
}

/// GET /api/slow-query?delay=<ms>
pub fn slow_query_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "slow-query")
        .and(warp::get())
        .and(warp::query::<SlowQueryParams>())
        .and(with_state(state))
        .and_then(handlers::slow_query)
}

/// GET /api/memory-intensive?size=<n>
pub fn memory_intensive_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "memory-intensive")
        .and(warp::get())
        .and(warp::query::<MemoryParams>())
        .and(with_state(state))
        .and_then(handlers::memory_intensive)
}

/// GET /api/random-error
pub fn random_error_route() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "random-error")
        .and(warp::get())
        .and_then(handlers::random_error)
}

/// GET /api/external-call
pub fn external_call_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "external-call")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::external_call)
}

/// GET /api/custom-metrics
pub fn custom_metrics_route() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
{
    warp::path!("api" / "custom-metrics")
        .and(warp::get())
        .and_then(handlers::custom_metrics)
}

/// GET /api/complex-operation
pub fn complex_operation_route(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "complex-operation")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::complex_operation)
}

/// Every API route, without middleware.
pub fn api(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    health_route(state.clone())
        .or(list_users_route(state.clone()))
        .or(get_user_route(state.clone()))
        .or(create_user_route(state.clone()))
        .or(slow_query_route(state.clone()))
        .or(memory_intensive_route(state.clone()))
        .or(random_error_route())
        .or(external_call_route(state.clone()))
        .or(custom_metrics_route())
        .or(complex_operation_route(state))
}

/// The full service: API routes wrapped with CORS and request logging, with
/// every rejection turned into a JSON envelope.
///
/// Rejections are recovered inside the CORS wrapper so error envelopes carry
/// the same CORS headers as successful replies. The outer `recover` only sees
/// a refused preflight.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    let request_log = warp::log::custom(|req: warp::log::Info<'_>| {
        info!(
            "{} {} -> {} ({:?})",
            req.method(),
            req.path(),
            req.status().as_u16(),
            req.elapsed()
        );
        instrumentation::record_request(
            req.method().as_str(),
            req.status().as_u16(),
            req.elapsed(),
        );
    });

    api(state)
        .recover(handle_rejection)
        .with(cors)
        .recover(handle_rejection)
        .with(request_log)
}

/// Maps rejections onto the error envelope.
///
/// Specific causes are checked before "not found": a combined rejection can
/// carry both a body error from one route and a method mismatch from another.
pub async fn handle_rejection(err: Rejection) -> Result<reply::Response, Infallible> {
    let (status, message) = if let Some(fault) = err.find::<UnhandledFault>() {
        instrumentation::notice_error(fault);
        (StatusCode::INTERNAL_SERVER_ERROR, fault.message.clone())
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        (StatusCode::BAD_REQUEST, String::from("Invalid request body"))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            String::from("Request body too large"),
        )
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        (
            StatusCode::FORBIDDEN,
            String::from("CORS request forbidden"),
        )
    } else if err.is_not_found() || err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::NOT_FOUND, String::from("Route not found"))
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("Internal server error"),
        )
    };

    Ok(json_response(&ApiResponse::error(message), status))
}
