//! REST API module

pub mod handlers;
pub mod models;
pub mod openapi;
pub mod routes;

pub use routes::{AppState, create_router};
