use super::framing::{FrameAssembler, decode_server_message};
use super::transport::{
    Connector, Fragment, FrameSink, FrameSource, NORMAL_CLOSURE, WebSocketConnector,
};
use crate::errors::GenaiError;
use crate::http::loud_wire;
use crate::types::{
    ClientMessage, LiveClientContent, LiveRealtimeInput, LiveSetup, LiveToolResponse,
    ServerMessage,
};
use async_stream::stream;
use futures_util::Stream;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const CLOSE_REASON: &str = "Closed by client";

/// Liveness of a [`LiveSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Transport open, setup frame not yet sent.
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Read half of the connection plus any frame it has only partly delivered.
struct ReadHalf {
    source: Box<dyn FrameSource>,
    assembler: FrameAssembler,
}

enum ReadOutcome {
    SessionCancelled,
    CallCancelled,
    Read(Option<Result<Fragment, GenaiError>>),
}

/// One established Live connection.
///
/// Sending and receiving may happen concurrently from different tasks: share
/// the session through an `Arc`. Writes are serialized by an internal mutex;
/// only one [`receive`](Self::receive) stream may be active at a time.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use genai_net::{Client, LiveClientContent, LiveSetup, model_names};
///
/// # async fn run() -> Result<(), genai_net::GenaiError> {
/// let client = Client::from_env()?;
/// let session = client
///     .connect_live(LiveSetup::new(model_names::GEMINI_2_0_FLASH_LIVE))
///     .await?;
///
/// session
///     .send_client_content(LiveClientContent::user_text("Hello!"))
///     .await?;
///
/// {
///     let messages = session.receive();
///     futures_util::pin_mut!(messages);
///     while let Some(message) = messages.next().await {
///         let message = message?;
///         if let Some(text) = message.text() {
///             print!("{text}");
///         }
///         if message.is_turn_complete() {
///             break;
///         }
///     }
/// }
///
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct LiveSession {
    id: usize,
    state: AtomicU8,
    close_started: AtomicBool,
    writer: Mutex<Option<Box<dyn FrameSink>>>,
    reader: Mutex<Option<ReadHalf>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSession")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Resolves when `token` is cancelled, or never if there is no token.
async fn call_cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

impl LiveSession {
    /// Connects over a WebSocket to `url` and sends `setup`.
    pub async fn connect(url: &str, setup: LiveSetup) -> Result<Self, GenaiError> {
        Self::connect_with(&WebSocketConnector, url, setup, None).await
    }

    /// Connects through `connector` and sends `setup` as the first frame.
    ///
    /// The session is only returned once the setup frame has been written.
    /// If that write fails the transport is closed before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`GenaiError::Connection`] if the transport cannot be opened or the
    ///   setup frame cannot be written
    /// - [`GenaiError::Protocol`] if `setup` cannot be serialized
    /// - [`GenaiError::Cancelled`] if `cancel` fires first
    pub async fn connect_with(
        connector: &dyn Connector,
        url: &str,
        setup: LiveSetup,
        cancel: Option<&CancellationToken>,
    ) -> Result<Self, GenaiError> {
        let id = loud_wire::next_session_id();
        loud_wire::log_ws_connect(id, url);
        debug!("Opening Live session #{} for model {}", id, setup.model);

        let (sink, source) = tokio::select! {
            biased;
            _ = call_cancelled(cancel) => return Err(GenaiError::Cancelled),
            halves = connector.open(url) => halves?,
        };

        let session = Self {
            id,
            state: AtomicU8::new(SessionState::Connecting as u8),
            close_started: AtomicBool::new(false),
            writer: Mutex::new(Some(sink)),
            reader: Mutex::new(Some(ReadHalf {
                source,
                assembler: FrameAssembler::new(),
            })),
            cancel: CancellationToken::new(),
        };

        if let Err(e) = session.write(&ClientMessage::Setup(setup), cancel).await {
            warn!("Live session #{} setup failed: {}", id, e);
            if let Err(close_err) = session.close().await {
                debug!("Ignoring close error after failed setup: {}", close_err);
            }
            return Err(e);
        }

        session.set_state(SessionState::Open);
        info!("Live session #{} open", id);
        Ok(session)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: SessionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open && !self.cancel.is_cancelled()
    }

    /// The session-wide cancellation scope.
    ///
    /// Cancelling it ends any active receive and makes further sends fail;
    /// [`close`](Self::close) cancels it too.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Sends one message.
    ///
    /// # Errors
    ///
    /// [`GenaiError::Connection`] if the session is not open or the write
    /// fails, [`GenaiError::Protocol`] if `message` cannot be serialized.
    pub async fn send(&self, message: &ClientMessage) -> Result<(), GenaiError> {
        self.send_inner(message, None).await
    }

    /// Like [`send`](Self::send), abandoned with [`GenaiError::Cancelled`]
    /// if `cancel` fires first.
    pub async fn send_with_cancellation(
        &self,
        message: &ClientMessage,
        cancel: &CancellationToken,
    ) -> Result<(), GenaiError> {
        self.send_inner(message, Some(cancel)).await
    }

    pub async fn send_client_content(&self, content: LiveClientContent) -> Result<(), GenaiError> {
        self.send(&ClientMessage::ClientContent(content)).await
    }

    pub async fn send_realtime_input(&self, input: LiveRealtimeInput) -> Result<(), GenaiError> {
        self.send(&ClientMessage::RealtimeInput(input)).await
    }

    pub async fn send_tool_response(&self, response: LiveToolResponse) -> Result<(), GenaiError> {
        self.send(&ClientMessage::ToolResponse(response)).await
    }

    pub async fn send_client_content_with_cancellation(
        &self,
        content: LiveClientContent,
        cancel: &CancellationToken,
    ) -> Result<(), GenaiError> {
        self.send_inner(&ClientMessage::ClientContent(content), Some(cancel))
            .await
    }

    pub async fn send_realtime_input_with_cancellation(
        &self,
        input: LiveRealtimeInput,
        cancel: &CancellationToken,
    ) -> Result<(), GenaiError> {
        self.send_inner(&ClientMessage::RealtimeInput(input), Some(cancel))
            .await
    }

    pub async fn send_tool_response_with_cancellation(
        &self,
        response: LiveToolResponse,
        cancel: &CancellationToken,
    ) -> Result<(), GenaiError> {
        self.send_inner(&ClientMessage::ToolResponse(response), Some(cancel))
            .await
    }

    /// Sends a complete user turn containing `text`.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), GenaiError> {
        self.send_client_content(LiveClientContent::user_text(text))
            .await
    }

    async fn send_inner(
        &self,
        message: &ClientMessage,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), GenaiError> {
        if !self.is_open() {
            return Err(GenaiError::Connection(format!(
                "Live session #{} is not open ({:?})",
                self.id,
                self.state()
            )));
        }
        self.write(message, cancel).await
    }

    /// Serializes and writes under the write mutex.
    async fn write(
        &self,
        message: &ClientMessage,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), GenaiError> {
        let write = async {
            let mut writer = self.writer.lock().await;
            let sink = writer.as_mut().ok_or_else(|| {
                GenaiError::Connection(format!("Live session #{} is closed", self.id))
            })?;

            let payload = serde_json::to_string(message).map_err(|e| {
                GenaiError::Protocol(format!("Failed to serialize {}: {e}", message.kind()))
            })?;
            loud_wire::log_ws_send(self.id, &payload);
            debug!("Live session #{} sending {}", self.id, message.kind());
            sink.send(payload).await
        };

        tokio::select! {
            biased;
            _ = call_cancelled(cancel) => Err(GenaiError::Cancelled),
            _ = self.cancel.cancelled() => Err(GenaiError::Connection(format!(
                "Live session #{} was closed during send",
                self.id
            ))),
            result = write => result,
        }
    }

    /// Inbound messages, in wire order.
    ///
    /// The stream ends when the connection closes or the session is
    /// cancelled. Frames that are empty, `null` or not valid JSON are skipped.
    /// A transport failure is yielded once as an error, then the stream ends.
    ///
    /// Only one receive stream may be active per session; a second one
    /// yields [`GenaiError::Protocol`] and ends.
    pub fn receive(&self) -> impl Stream<Item = Result<ServerMessage, GenaiError>> + Send + '_ {
        self.receive_inner(None)
    }

    /// Like [`receive`](Self::receive), but also ends when `cancel` fires.
    /// The session stays open, and a later receive picks up where this one
    /// stopped, including a frame whose fragments have only partly arrived.
    pub fn receive_with_cancellation(
        &self,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<ServerMessage, GenaiError>> + Send + '_ {
        self.receive_inner(Some(cancel))
    }

    fn receive_inner(
        &self,
        cancel: Option<CancellationToken>,
    ) -> impl Stream<Item = Result<ServerMessage, GenaiError>> + Send + '_ {
        stream! {
            let Ok(mut reader) = self.reader.try_lock() else {
                yield Err(GenaiError::Protocol(format!(
                    "Live session #{} already has an active receive",
                    self.id
                )));
                return;
            };

            let mut yielded = 0usize;

            loop {
                if !self.is_open() {
                    break;
                }
                let Some(half) = reader.as_mut() else {
                    break;
                };

                let outcome = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => ReadOutcome::SessionCancelled,
                    _ = call_cancelled(cancel.as_ref()) => ReadOutcome::CallCancelled,
                    fragment = half.source.next() => ReadOutcome::Read(fragment),
                };

                match outcome {
                    ReadOutcome::SessionCancelled => {
                        reader.take();
                        break;
                    }
                    ReadOutcome::CallCancelled => {
                        debug!("Live session #{} receive cancelled by caller", self.id);
                        break;
                    }
                    ReadOutcome::Read(None) | ReadOutcome::Read(Some(Ok(Fragment::Close))) => {
                        self.on_remote_close();
                        reader.take();
                        break;
                    }
                    ReadOutcome::Read(Some(Err(e))) => {
                        warn!("Live session #{} transport failed: {}", self.id, e);
                        self.on_remote_close();
                        reader.take();
                        yield Err(e);
                        break;
                    }
                    ReadOutcome::Read(Some(Ok(Fragment::Data { payload, last }))) => {
                        if !half.assembler.push(&payload, last) {
                            continue;
                        }
                        let decoded = half.assembler.frame().and_then(|frame| {
                            loud_wire::log_ws_receive(self.id, &String::from_utf8_lossy(frame));
                            decode_server_message(frame)
                        });
                        half.assembler.finish();

                        if let Some(message) = decoded {
                            yielded += 1;
                            yield Ok(message);
                        }
                    }
                }
            }

            debug!(
                "Live session #{} receive finished after {} messages",
                self.id, yielded
            );
        }
    }

    /// The peer closed the connection or the transport failed.
    fn on_remote_close(&self) {
        if self.state() == SessionState::Open {
            info!("Live session #{} closed by server", self.id);
            loud_wire::log_ws_close(self.id, "server");
        }
        self.set_state(SessionState::Closed);
        self.cancel.cancel();
    }

    /// Closes the session.
    ///
    /// Sends a normal-closure frame if the connection is still open, cancels
    /// the session scope and releases the transport. Calling it again is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GenaiError::Connection`] if the close frame could not be
    /// written. The session is closed regardless.
    pub async fn close(&self) -> Result<(), GenaiError> {
        if self.close_started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let previous = self.state();
        let transport_open = matches!(previous, SessionState::Connecting | SessionState::Open);
        if transport_open {
            self.set_state(SessionState::Closing);
        }
        self.cancel.cancel();

        let mut result = Ok(());
        if let Some(mut sink) = self.writer.lock().await.take()
            && transport_open
        {
            if let Err(e) = sink.close(NORMAL_CLOSURE, CLOSE_REASON).await {
                warn!("Live session #{} close frame not sent: {}", self.id, e);
                result = Err(e);
            }
        }

        // An active receive releases the reader itself once it sees the
        // cancellation.
        if let Ok(mut reader) = self.reader.try_lock() {
            reader.take();
        }

        self.set_state(SessionState::Closed);
        if transport_open {
            loud_wire::log_ws_close(self.id, "client");
            info!("Live session #{} closed", self.id);
        }
        result
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if !self.close_started.load(Ordering::Acquire) && self.state() != SessionState::Closed {
            debug!("Live session #{} dropped without close", self.id);
        }
        self.cancel.cancel();
    }
}
