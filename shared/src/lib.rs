//! Menu Planner Shared Library
//!
//! This crate contains the closed domain enumerations, validation helpers,
//! and API types shared between the backend and its integration tests.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::*;
pub use types::*;
