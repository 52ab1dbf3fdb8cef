//! # API Shared
//!
//! Shared definitions for the MedBot HTTP API.
//!
//! Contains:
//! - Request and response bodies (`models` module), documented for OpenAPI
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; kept free of core logic so the wire shapes can be reviewed on their own.

pub mod health;
pub mod models;

pub use health::HealthService;
pub use models::*;
