use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use warp::{Filter, Reply};

use super::handlers::AppState;
use super::routes;
use crate::configuration::types::SimulationConfig;
use crate::error_handling::types::WebError;
use crate::storage::storage_trait::UserStorage;

/// Human-readable list of the routes served, logged at startup.
pub const ENDPOINTS: [&str; 10] = [
    "GET  /api/health - Health check",
    "GET  /api/users - Fast endpoint",
    "GET  /api/slow-query - Slow endpoint (add ?delay=5000)",
    "GET  /api/memory-intensive - Memory intensive (add ?size=1000000)",
    "GET  /api/random-error - Random errors",
    "GET  /api/external-call - External API simulation",
    "GET  /api/custom-metrics - Custom metrics",
    "GET  /api/complex-operation - Complex operation",
    "POST /api/users - Create user",
    "GET  /api/users/:id - Get user by ID",
];

/// Web server for the HTTP API
pub struct WebServer {
    state: AppState,
}

impl WebServer {
    /// Create a new WebServer instance around an already initialized store
    pub fn new(storage: Arc<dyn UserStorage>, simulation: SimulationConfig) -> Self {
        Self {
            state: AppState::new(storage, simulation),
        }
    }

    /// The complete filter tree, usable with `warp::serve` or `warp::test`
    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        routes::routes(self.state.clone())
    }

    /// Serve on `addr` until Ctrl+C is received
    pub async fn start(&self, addr: SocketAddr) -> Result<(), WebError> {
        let server = warp::serve(self.routes()).run(addr);

        info!("Server running on http://{}", addr);
        info!("Available endpoints:");
        for endpoint in ENDPOINTS {
            info!("  {}", endpoint);
        }

        tokio::select! {
            _ = server => {}
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(WebError::SignalHandler)?;
                info!("Shutdown signal received");
            }
        }

        Ok(())
    }
}
