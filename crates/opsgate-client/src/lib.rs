//! Typed client for the OpsRamp-style management API.
//!
//! Owns authentication, pagination, and filter-parameter translation so the
//! gateway above it only passes tool arguments through.

pub mod auth;
pub mod client;
pub mod error;
pub mod integrations;
pub mod resources;
pub mod types;

pub use auth::AuthClient;
pub use client::{ApiClient, UpstreamConfig};
pub use error::{ClientError, ClientResult};
pub use integrations::IntegrationsApi;
pub use resources::ResourcesApi;
