pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;
