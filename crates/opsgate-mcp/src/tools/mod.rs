//! Tool adapters and dispatch.

pub mod dispatch;
pub mod integrations;
pub mod resources;

pub use dispatch::{ToolAdapter, ToolDispatcher};
pub use integrations::IntegrationsTool;
pub use resources::ResourcesTool;
