//! Challenge service API layer: wire types, error taxonomy, and the HTTP client.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
