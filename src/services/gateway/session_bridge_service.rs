//! The session bridge: one instance handles one WebSocket connection and owns
//! the lifecycle of every upstream execution stream opened on its behalf.
//!
//! Per session there are exactly two concurrent activities: the client loop
//! (this task, reading WebSocket frames) and at most one stream reader task
//! consuming the current upstream response stream. The pair installed in
//! [`SharedStream`] is the single source of truth for "the current stream":
//! the client loop replaces it on resubmission, and the reader's deferred
//! cleanup releases it, guarded by a generation counter so a late reader
//! cannot tear down its successor.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::error_models::GatewayError;
use crate::models::ws_message_models::{status, ClientCommand, ServerFrame};
use crate::proto::compiler_service::{execute_request, Code, ExecuteRequest, Input};
use crate::services::gateway::executor_registry_service::{ExecutorRegistry, ResponseStream};
use crate::services::gateway::frame_service::{decode_client, encode_server, translate_upstream};
use crate::services::gateway::screening_service::SafetyScreener;

/// Hard deadline on every WebSocket write. A slow client must not be able to
/// stall the bridge; a timeout surfaces as a write error and tears the
/// session down.
pub const WRITE_DEADLINE: Duration = Duration::from_secs(5);

const INVALID_MESSAGE: &str =
    "Invalid message. Send JSON with 'language' and 'code' or 'input' for an active session";

/// `WAITING_FOR_INPUT` and `EXECUTION_COMPLETE` are status-channel values.
/// A frame carrying one of them as its *output* is upstream bookkeeping and
/// is never written to the wire.
pub fn is_sentinel_output(output: &str) -> bool {
    output == status::WAITING_FOR_INPUT || output == status::EXECUTION_COMPLETE
}

/// Mutex-guarded single writer to the WebSocket.
pub struct WsWriter {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl WsWriter {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Writes one frame, serialized against all other writers on this
    /// session, under [`WRITE_DEADLINE`]. Sentinel-output frames are dropped.
    pub async fn write(&self, frame: &ServerFrame) -> Result<(), GatewayError> {
        if is_sentinel_output(&frame.output) {
            return Ok(());
        }
        let text = encode_server(frame)?;
        let mut sink = self.sink.lock().await;
        match tokio::time::timeout(WRITE_DEADLINE, sink.send(Message::Text(text))).await {
            Ok(result) => result.map_err(GatewayError::from),
            Err(_) => Err(GatewayError::WriteTimeout),
        }
    }

    /// Sends a close frame. Used when the gateway itself ends the session.
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        let _ = sink.send(Message::Close(None)).await;
    }
}

struct ActiveStream {
    session_id: String,
    generation: u64,
    sender: mpsc::Sender<ExecuteRequest>,
    cancel: CancellationToken,
}

type SharedStream = Arc<Mutex<Option<ActiveStream>>>;

/// Cancels and clears whatever stream is active. Safe to call repeatedly and
/// when nothing is active.
async fn cleanup_current(current: &SharedStream) {
    let mut guard = current.lock().await;
    if let Some(active) = guard.take() {
        info!(session_id = %active.session_id, "cleaning up current stream");
        active.cancel.cancel();
    }
}

/// Reader-side cleanup: releases the slot only while `generation` still owns
/// it, so a reader draining after a resubmission cannot cancel the new
/// stream.
async fn release_stream(current: &SharedStream, generation: u64) {
    let mut guard = current.lock().await;
    if guard.as_ref().map(|active| active.generation) == Some(generation) {
        if let Some(active) = guard.take() {
            active.cancel.cancel();
        }
    }
}

/// Protocol-translation engine between one WebSocket session and the
/// executor fleet. Stateless across sessions; all per-session state lives in
/// [`SessionBridge::handle`].
pub struct SessionBridge {
    registry: Arc<ExecutorRegistry>,
    screener: Arc<SafetyScreener>,
}

impl SessionBridge {
    pub fn new(registry: Arc<ExecutorRegistry>, screener: Arc<SafetyScreener>) -> Self {
        Self { registry, screener }
    }

    /// Terminal per-connection entry point: returns only when the session is
    /// over, and always releases the current stream before returning.
    pub async fn handle(&self, socket: WebSocket, session_id: String) {
        let (sink, mut receiver) = socket.split();
        let writer = Arc::new(WsWriter::new(sink));
        let current: SharedStream = Arc::new(Mutex::new(None));
        let mut generation: u64 = 0;
        let mut session_id = session_id;

        loop {
            let message = match receiver.next().await {
                Some(Ok(message)) => message,
                Some(Err(err)) => {
                    error!(%session_id, error = %err, "error reading from WebSocket");
                    break;
                }
                None => {
                    debug!(%session_id, "WebSocket receiver drained");
                    break;
                }
            };

            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => {
                    info!(%session_id, "WebSocket closed by client");
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Binary(_) => {
                    warn!(%session_id, "ignoring non-text message from WebSocket");
                    let frame = ServerFrame::error("Non-text message received");
                    if writer.write(&frame).await.is_err() {
                        break;
                    }
                    continue;
                }
            };

            let command = match decode_client(&text) {
                Ok(command) => command,
                Err(err) => {
                    warn!(%session_id, error = %err, "invalid JSON message");
                    let frame = ServerFrame::error(format!("Invalid JSON: {err}"));
                    if writer.write(&frame).await.is_err() {
                        break;
                    }
                    continue;
                }
            };

            let flow = match command {
                ClientCommand::Submission { language, code } => {
                    match self
                        .handle_submission(language, code, &writer, &current, &mut generation)
                        .await
                    {
                        Ok(Some(new_id)) => {
                            session_id = new_id;
                            Flow::Continue
                        }
                        Ok(None) => Flow::Continue,
                        Err(err) => {
                            warn!(%session_id, error = %err, "submission terminated the session");
                            Flow::Terminate
                        }
                    }
                }
                ClientCommand::Input { input } => {
                    match self.handle_input(&session_id, input, &writer, &current).await {
                        Ok(()) => Flow::Continue,
                        Err(err) => {
                            warn!(%session_id, error = %err, "input forwarding failed");
                            Flow::Terminate
                        }
                    }
                }
                ClientCommand::Invalid => {
                    warn!(%session_id, "invalid or unexpected JSON message");
                    if writer.write(&ServerFrame::error(INVALID_MESSAGE)).await.is_err() {
                        Flow::Terminate
                    } else {
                        Flow::Continue
                    }
                }
            };

            if matches!(flow, Flow::Terminate) {
                writer.close().await;
                break;
            }
        }

        cleanup_current(&current).await;
        info!(%session_id, "session ended");
    }

    /// Routes, screens, and starts a new execution stream, tearing down the
    /// previous one first. `Ok(Some(id))` carries the rotated session id;
    /// `Ok(None)` means the submission was refused but the session lives on;
    /// `Err` terminates the session.
    async fn handle_submission(
        &self,
        language: String,
        code: String,
        writer: &Arc<WsWriter>,
        current: &SharedStream,
        generation: &mut u64,
    ) -> Result<Option<String>, GatewayError> {
        let Some(executor) = self.registry.lookup(&language) else {
            warn!(%language, "unsupported language");
            let frame = ServerFrame::error(format!("Language '{language}' is not supported"));
            writer.write(&frame).await?;
            return Ok(None);
        };

        if let Some(keyword) = self.screener.find_forbidden(&language, &code) {
            warn!(%language, %keyword, "dangerous code detected");
            writer
                .write(&ServerFrame::error("Dangerous script detected"))
                .await?;
            return Err(GatewayError::UnsafeCode);
        }

        cleanup_current(current).await;

        let session_id = Uuid::new_v4().to_string();
        *generation += 1;
        let generation = *generation;
        info!(%session_id, %language, code_length = code.len(), "received new code submission");

        let stream = match executor.open_stream().await {
            Ok(stream) => stream,
            Err(err) => {
                error!(%session_id, %language, error = %err, "failed to start execution stream");
                let frame = ServerFrame::error(format!(
                    "Failed to connect to {language} execution service: {err}"
                ));
                let _ = writer.write(&frame).await;
                return Err(err);
            }
        };

        let cancel = CancellationToken::new();
        {
            let mut guard = current.lock().await;
            *guard = Some(ActiveStream {
                session_id: session_id.clone(),
                generation,
                sender: stream.sender.clone(),
                cancel: cancel.clone(),
            });
        }

        tokio::spawn(run_stream_reader(
            stream.responses,
            cancel,
            Arc::clone(writer),
            Arc::clone(current),
            session_id.clone(),
            generation,
        ));

        let request = ExecuteRequest {
            session_id: session_id.clone(),
            payload: Some(execute_request::Payload::Code(Code {
                language: language.clone(),
                source_code: code,
            })),
        };
        if stream.sender.send(request).await.is_err() {
            error!(%session_id, %language, "failed to send code to execution stream");
            let _ = writer
                .write(&ServerFrame::error("Failed to send code: execution stream is gone"))
                .await;
            cleanup_current(current).await;
            return Err(GatewayError::StreamGone);
        }
        info!(%session_id, %language, "sent code to execution stream");

        Ok(Some(session_id))
    }

    /// Forwards an input chunk on the active stream, tagged with the most
    /// recently rotated session id.
    async fn handle_input(
        &self,
        session_id: &str,
        input: String,
        writer: &Arc<WsWriter>,
        current: &SharedStream,
    ) -> Result<(), GatewayError> {
        let active = {
            let guard = current.lock().await;
            guard
                .as_ref()
                .map(|active| (active.session_id.clone(), active.sender.clone()))
        };

        let Some((stream_session_id, sender)) = active else {
            warn!(%session_id, "input received with no active stream");
            return writer.write(&ServerFrame::error(INVALID_MESSAGE)).await;
        };

        let request = ExecuteRequest {
            session_id: stream_session_id.clone(),
            payload: Some(execute_request::Payload::Input(Input { input_text: input })),
        };
        if sender.send(request).await.is_err() {
            error!(session_id = %stream_session_id, "failed to send input to execution stream");
            let _ = writer
                .write(&ServerFrame::error("Failed to send input: execution stream is gone"))
                .await;
            cleanup_current(current).await;
            return Err(GatewayError::StreamGone);
        }
        debug!(session_id = %stream_session_id, "sent input to execution stream");
        Ok(())
    }
}

enum Flow {
    Continue,
    Terminate,
}

/// Reader task for one upstream stream: translates every response into
/// client frames until EOF, error, or cancellation, then runs its deferred
/// cleanup and announces `STREAM_CLOSED`.
async fn run_stream_reader(
    mut responses: ResponseStream,
    cancel: CancellationToken,
    writer: Arc<WsWriter>,
    current: SharedStream,
    session_id: String,
    generation: u64,
) {
    'read: loop {
        tokio::select! {
            // cancellation wins over a simultaneously ready response so a
            // superseded reader reports "Stream cancelled" rather than racing
            // the transport teardown
            biased;

            _ = cancel.cancelled() => {
                warn!(%session_id, "execution stream cancelled");
                let _ = writer.write(&ServerFrame::error("Stream cancelled")).await;
                break 'read;
            }
            next = responses.next() => match next {
                Some(Ok(response)) => {
                    for frame in translate_upstream(response) {
                        if let Err(err) = writer.write(&frame).await {
                            error!(%session_id, error = %err, "error writing to WebSocket");
                            break 'read;
                        }
                    }
                }
                Some(Err(status)) if status.code() == tonic::Code::Cancelled => {
                    warn!(%session_id, "execution stream cancelled by transport");
                    let _ = writer.write(&ServerFrame::error("Stream cancelled")).await;
                    break 'read;
                }
                Some(Err(status)) => {
                    warn!(%session_id, error = %status, "error receiving from execution stream");
                    let frame = ServerFrame::error(format!("gRPC stream error: {status}"));
                    let _ = writer.write(&frame).await;
                    break 'read;
                }
                None => {
                    info!(%session_id, "execution stream closed cleanly by server");
                    let frame = ServerFrame::info("Execution stream closed by server");
                    let _ = writer.write(&frame).await;
                    break 'read;
                }
            }
        }
    }

    release_stream(&current, generation).await;
    let _ = writer
        .write(&ServerFrame::new("Execution stream closed", status::STREAM_CLOSED))
        .await;
    info!(%session_id, "execution stream reader stopped");
}
