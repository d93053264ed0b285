//! # Taskboard
//!
//! A small server-rendered task tracker: one `items` table, five HTML pages
//! (list/filter/search, create, detail, edit, delete) and two probes.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server and routing
//! - **SQLx**: asynchronous database access; Postgres in production, SQLite
//!   for local development, both behind the `Any` driver
//! - **Maud**: compile-time checked HTML templates
//! - **Tokio**: async runtime
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration and database URL normalization
//! - [`db`]: the item store (pool, schema, queries)
//! - [`error`]: request error type and HTML error responses
//! - [`render`]: view-models and page templates
//! - [`routes`]: HTTP endpoint handlers
//! - [`state`]: shared application state
//! - [`types`]: the item model and form/query types

pub mod config;
pub mod db;
pub mod error;
pub mod render;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
