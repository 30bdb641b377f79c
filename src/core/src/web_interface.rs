// Web Interface module root
pub mod handlers;
pub mod routes;
pub mod simulation;
pub mod types;
pub mod web_server;

// Re-export commonly used items
pub use handlers::AppState;
pub use web_server::WebServer;
