//! API Module
//!
//! Admin HTTP surface for the cache server. Cache traffic itself goes
//! through the text protocol in `server`.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Get cache statistics
//! - `POST /snapshot` - Persist the cache immediately

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
