//! Protocol engine: message classification, handshake, and routing.

pub mod classifier;
pub mod handshake;
pub mod router;

pub use classifier::{classify, Classified, MalformedReason};
pub use handshake::HandshakeOutcome;
pub use router::{ProtocolRouter, RouteReply};
