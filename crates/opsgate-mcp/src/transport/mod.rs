//! HTTP and SSE transport.

pub mod encoder;
pub mod http;

pub use encoder::{negotiate, render_sse_frame, Framing};
pub use http::{build_router, run, GatewayState};
