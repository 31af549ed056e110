//! Live API: a persistent bidirectional session over a WebSocket.
//!
//! Open a session with [`Client::connect_live`](crate::Client::connect_live),
//! send [`ClientMessage`](crate::ClientMessage)s, and read
//! [`ServerMessage`](crate::ServerMessage)s from [`LiveSession::receive`].

mod framing;
mod session;
pub mod transport;

pub use framing::{AssemblerState, FrameAssembler, decode_server_message};
pub use session::{LiveSession, SessionState};
pub use transport::{Connector, Fragment, FrameSink, FrameSource, WebSocketConnector};
