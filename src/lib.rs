//! BrewMaster SIGB - Inventory and point-of-sale backend for breweries and bars
//!
//! Tracks beer barrels across warehouses, runs the single shared cash
//! register, records sales and refunds against barrel volume, and keeps an
//! audit trail of every administrative change and login.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Business entities and the pure rules over them
//! - **services**: Use cases, one service per resource
//! - **infra**: Postgres access (migrations, entities, repositories)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Create the schema and seed roles
//! cargo run -- migrate up
//!
//! # Bootstrap an administrator
//! cargo run -- create-admin --rut 12.345.678-5 --nombre Admin \
//!     --email admin@brewmaster.cl --password secreto123
//!
//! # Start the server
//! cargo run -- serve
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Rut};
pub use errors::{AppError, AppResult};
