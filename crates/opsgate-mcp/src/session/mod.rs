//! Session tracking for push channels and handshake state.

pub mod registry;

pub use registry::{HandshakeState, SessionRegistry, SessionState};
