//! HTTP surface of the SIGB backend.
//!
//! Everything under `/api` except `/api/auth/login` sits behind the JWT
//! middleware; role checks happen inside the handlers.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
