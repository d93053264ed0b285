//! Integration and unit tests for the application.
//!
//! ## Test Modules
//!
//! - **config_tests**: configuration layering, env overrides and database
//!   URL resolution
//! - **store_tests**: item store CRUD, filtering and counts over a
//!   temporary SQLite database
//! - **items_api_tests**: the five HTML endpoints end to end
//! - **health_api_tests**: probe endpoints
//! - **error_tests**: error mapping and response codes

pub mod error_tests;
pub mod items_api_tests;
