//! Wire types for the ConfigWeaver backend API
//!
//! Plain serde mirrors of the backend's request and response bodies.
//! No behavior lives here; the console crate owns all orchestration.

pub mod models;

pub use models::*;
