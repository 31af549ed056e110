//! Message-socket seam under [`LiveSession`](super::LiveSession).
//!
//! A [`Connector`] opens a connection and hands back two independent halves:
//! a [`FrameSink`] that writes whole text messages and a [`FrameSource`] that
//! yields inbound data as [`Fragment`]s. The session never touches the
//! socket library directly, so tests can drive it with in-memory halves.

use crate::errors::GenaiError;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::borrow::Cow;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

/// Close code for a normal, client-initiated shutdown.
pub const NORMAL_CLOSURE: u16 = 1000;

/// One unit read from the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    /// Message bytes. `last` marks the end of the message.
    Data { payload: Vec<u8>, last: bool },
    /// The peer sent a close frame.
    Close,
}

impl Fragment {
    /// A complete single-fragment message.
    #[must_use]
    pub fn whole(payload: impl Into<Vec<u8>>) -> Self {
        Self::Data {
            payload: payload.into(),
            last: true,
        }
    }
}

/// Write half of a connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Writes `text` as one complete text message.
    async fn send(&mut self, text: String) -> Result<(), GenaiError>;

    /// Sends a close control frame.
    async fn close(&mut self, code: u16, reason: &str) -> Result<(), GenaiError>;
}

/// Read half of a connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Returns the next fragment, or `None` once the connection has ended.
    async fn next(&mut self) -> Option<Result<Fragment, GenaiError>>;
}

/// The write and read halves of one open connection.
pub type TransportHalves = (Box<dyn FrameSink>, Box<dyn FrameSource>);

/// Opens connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, url: &str) -> Result<TransportHalves, GenaiError>;
}

/// [`Connector`] backed by `tokio-tungstenite`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketConnector;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn open(&self, url: &str) -> Result<TransportHalves, GenaiError> {
        let (ws_stream, response) = connect_async(url)
            .await
            .map_err(|e| GenaiError::Connection(format!("WebSocket connect failed: {e}")))?;
        debug!("WebSocket handshake complete: status={}", response.status());

        let (write, read): (SplitSink<WsStream, Message>, SplitStream<WsStream>) =
            ws_stream.split();
        Ok((Box::new(WebSocketSink(write)), Box::new(WebSocketSource(read))))
    }
}

/// Adapts any tungstenite message sink to [`FrameSink`].
pub struct WebSocketSink<S>(pub S);

#[async_trait]
impl<S> FrameSink for WebSocketSink<S>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin + Send,
{
    async fn send(&mut self, text: String) -> Result<(), GenaiError> {
        self.0
            .send(Message::Text(text))
            .await
            .map_err(|e| GenaiError::Connection(format!("WebSocket write failed: {e}")))
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), GenaiError> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: Cow::Owned(reason.to_string()),
        };
        self.0
            .send(Message::Close(Some(frame)))
            .await
            .map_err(|e| GenaiError::Connection(format!("WebSocket close failed: {e}")))
    }
}

/// Adapts any tungstenite message stream to [`FrameSource`].
///
/// tungstenite reassembles continuation frames itself, so text and binary
/// messages arrive whole. Raw frames are passed through with their FIN bit.
pub struct WebSocketSource<S>(pub S);

#[async_trait]
impl<S> FrameSource for WebSocketSource<S>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin + Send,
{
    async fn next(&mut self) -> Option<Result<Fragment, GenaiError>> {
        loop {
            let message = match self.0.next().await? {
                Ok(message) => message,
                Err(e) => {
                    return Some(Err(GenaiError::Connection(format!(
                        "WebSocket read failed: {e}"
                    ))));
                }
            };

            match message {
                Message::Text(text) => return Some(Ok(Fragment::whole(text))),
                Message::Binary(data) => return Some(Ok(Fragment::whole(data))),
                Message::Frame(frame) => {
                    let last = frame.header().is_final;
                    return Some(Ok(Fragment::Data {
                        payload: frame.into_data(),
                        last,
                    }));
                }
                Message::Close(frame) => {
                    debug!("Peer sent close frame: {:?}", frame);
                    return Some(Ok(Fragment::Close));
                }
                Message::Ping(_) | Message::Pong(_) => trace!("Ignoring ping/pong"),
            }
        }
    }
}
