//! HTTP API for the support assistant

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use routes::api_routes;
pub use server::serve_api;
pub use server::build_state;
pub use server::prepare_index;
