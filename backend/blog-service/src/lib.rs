/// Blog Service Library
///
/// Users author blogs containing articles, which carry tags and comments.
/// Who may change what is decided in one place, the policy engine in `authz`.
///
/// # Modules
///
/// - `authz`: Ownership policy engine and token claims reader
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Entities, DTOs and the mappings between them
/// - `services`: Business logic layer
/// - `repository`: Persistence traits with PostgreSQL and in-memory backends
/// - `middleware`: Bearer token extraction and request timing
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
/// - `seed`: Startup admin account
pub mod authz;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
