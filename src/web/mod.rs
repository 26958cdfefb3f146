//! Web server module (Axum transport for the Open Floor endpoint).

pub mod cors;
pub mod handler;
pub mod router;
pub mod server;

pub use cors::CorsPolicy;
pub use handler::{handle_request, parse_envelope, ApiError};
pub use router::{create_app_router, MAX_BODY_BYTES};
pub use server::run_server;
