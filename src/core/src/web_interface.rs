// Web Interface module root
pub mod routes;
pub mod templates;
pub mod types;
pub mod web_server;


// Re-export commonly used items
pub use types::AppState;
pub use web_server::WebServer;
