//! Live voice consultation over the Gemini Live WebSocket API.
//!
//! A consult runs outside the request lane: it holds its own connection for
//! as long as the user talks, and is released with [`ConsultSession::stop`].
//!
//! # Example
//!
//! ```no_run
//! use atelier_models::{ConsultEvent, EnvCredentials, LiveConsult};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let consult = LiveConsult::default();
//! let session = consult
//!     .start(&EnvCredentials::new(), "gemini-2.5-flash-native-audio-preview-09-2025", |event: ConsultEvent| {
//!         if let ConsultEvent::Transcript { text, from_model } = event {
//!             println!("{}: {}", if from_model { "stylist" } else { "you" }, text);
//!         }
//!     })
//!     .await?;
//!
//! session.send(&[0.0; 4096]).await?;
//! session.stop().await;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use atelier_error::{GeminiError, GeminiErrorKind};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, trace, warn};

use super::playback::{PlaybackScheduler, PlaybackState, ScheduledBuffer};
use super::protocol::{
    RealtimeInput, RealtimeInputMessage, ServerMessage, SetupConfig, SetupMessage,
};
use crate::audio::{INPUT_MIME_TYPE, decode_base64, decode_pcm16, encode_base64, encode_pcm16};
use crate::gemini::InlineData;
use crate::{CredentialProvider, GeminiResult};

/// WebSocket endpoint for the Gemini Live API.
pub const LIVE_API_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Voice the stylist speaks with during a consult.
pub const CONSULT_VOICE: &str = "Kore";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

/// Something that happened during a consult.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsultEvent {
    /// A transcript fragment
    Transcript {
        /// Transcribed text
        text: String,
        /// Spoken by the stylist rather than the user
        from_model: bool,
    },
    /// Speech to play at the buffer's start offset
    Playback(ScheduledBuffer),
    /// The user barged in; stop all queued playback
    Interrupted,
    /// The session ended; no further events follow
    Closed,
}

/// Receives consult events.
///
/// Implemented for any `Fn(ConsultEvent)` closure.
pub trait ConsultSink: Send + Sync + 'static {
    /// Handle one event. Called from the session's reader task.
    fn on_event(&self, event: ConsultEvent);
}

impl<F> ConsultSink for F
where
    F: Fn(ConsultEvent) + Send + Sync + 'static,
{
    fn on_event(&self, event: ConsultEvent) {
        self(event)
    }
}

/// Connection settings for live consults.
#[derive(Debug, Clone, PartialEq, derive_builder::Builder)]
#[builder(setter(into), default)]
pub struct LiveConsult {
    /// WebSocket endpoint
    endpoint: String,
    /// Prebuilt voice for replies
    voice: String,
    /// Connection attempts, including the first
    connect_attempts: usize,
    /// First reconnect delay in milliseconds
    initial_backoff_ms: u64,
    /// Upper bound on a reconnect delay
    max_backoff: Duration,
}

impl Default for LiveConsult {
    fn default() -> Self {
        Self {
            endpoint: LIVE_API_ENDPOINT.to_string(),
            voice: CONSULT_VOICE.to_string(),
            connect_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff: Duration::from_secs(8),
        }
    }
}

fn lock(scheduler: &Mutex<PlaybackScheduler>) -> MutexGuard<'_, PlaybackScheduler> {
    scheduler.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A decoded WebSocket frame.
enum Frame {
    Server(Box<ServerMessage>),
    Close,
    Other,
}

fn decode_frame(frame: &Message) -> GeminiResult<Frame> {
    let payload: &[u8] = match frame {
        Message::Text(text) => text.as_str().as_bytes(),
        Message::Binary(bytes) => bytes.as_ref(),
        Message::Close(_) => return Ok(Frame::Close),
        _ => return Ok(Frame::Other),
    };

    serde_json::from_slice(payload)
        .map(|msg| Frame::Server(Box::new(msg)))
        .map_err(|e| {
            GeminiError::new(GeminiErrorKind::InvalidServerMessage(format!(
                "Parse error: {}",
                e
            )))
        })
}

impl LiveConsult {
    /// Builder starting from the defaults.
    pub fn builder() -> LiveConsultBuilder {
        LiveConsultBuilder::default()
    }

    /// Open a consult with `model`, delivering events to `sink`.
    ///
    /// Connection and handshake failures are retried with exponential backoff
    /// and jitter.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` without a selected key, or the last connection
    /// error once every attempt has failed.
    #[instrument(skip(self, credentials, sink))]
    pub async fn start<S: ConsultSink>(
        &self,
        credentials: &dyn CredentialProvider,
        model: &str,
        sink: S,
    ) -> GeminiResult<ConsultSession> {
        let api_key = credentials.api_key()?;
        let url = format!("{}?key={}", self.endpoint, api_key);
        let setup = SetupMessage {
            setup: SetupConfig::voice_consult(model, &self.voice),
        };

        let strategy = ExponentialBackoff::from_millis(self.initial_backoff_ms)
            .factor(2)
            .max_delay(self.max_backoff)
            .map(jitter)
            .take(self.connect_attempts.saturating_sub(1));

        let ws = Retry::spawn(strategy, || {
            let url = url.clone();
            let setup = setup.clone();
            async move {
                match connect(&url, &setup).await {
                    Ok(ws) => Ok(ws),
                    Err(e) if e.kind.is_retryable_connection() => {
                        warn!(error = %e, "Live API connection failed, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        warn!(error = %e, "Permanent Live API error, failing immediately");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await?;

        let (writer, reader) = ws.split();
        let sink: Arc<dyn ConsultSink> = Arc::new(sink);
        let scheduler = Arc::new(Mutex::new(PlaybackScheduler::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let reader = tokio::spawn(read_loop(
            reader,
            Arc::clone(&scheduler),
            Arc::clone(&sink),
            Arc::clone(&closed),
            Instant::now(),
        ));

        info!("Live consult started");
        Ok(ConsultSession {
            writer: Arc::new(tokio::sync::Mutex::new(writer)),
            reader,
            scheduler,
            sink,
            closed,
        })
    }
}

/// Connect and complete the setup handshake.
async fn connect(url: &str, setup: &SetupMessage) -> GeminiResult<WsStream> {
    let (mut ws, _) = connect_async(url).await.map_err(|e| {
        error!("WebSocket connection failed: {}", e);
        GeminiError::new(GeminiErrorKind::WebSocketConnection(e.to_string()))
    })?;
    debug!("WebSocket connection established");

    let json = serde_json::to_string(setup).map_err(|e| {
        GeminiError::new(GeminiErrorKind::WebSocketHandshake(format!(
            "Serialization error: {}",
            e
        )))
    })?;
    trace!("Setup message JSON: {}", json);

    ws.send(Message::Text(json.into())).await.map_err(|e| {
        GeminiError::new(GeminiErrorKind::WebSocketHandshake(format!(
            "Send error: {}",
            e
        )))
    })?;

    while let Some(frame) = ws.next().await {
        let frame = frame.map_err(|e| {
            GeminiError::new(GeminiErrorKind::WebSocketHandshake(format!(
                "Receive error: {}",
                e
            )))
        })?;

        match decode_frame(&frame)? {
            Frame::Server(msg) if msg.is_setup_complete() => {
                debug!("Received setupComplete");
                return Ok(ws);
            }
            Frame::Server(msg) if msg.is_go_away() => {
                let time_left = msg.go_away.map(|g| g.time_left).unwrap_or_default();
                error!(%time_left, "Server sent goAway during setup");
                return Err(GeminiError::new(GeminiErrorKind::ServerDisconnect(
                    "goAway during setup".to_string(),
                )));
            }
            Frame::Server(msg) => warn!("Unexpected message during setup: {:?}", msg),
            Frame::Close => break,
            Frame::Other => {}
        }
    }

    Err(GeminiError::new(GeminiErrorKind::WebSocketHandshake(
        "Connection closed before setup complete".to_string(),
    )))
}

/// Turn one server message into events, updating the playback queue.
fn route(msg: ServerMessage, scheduler: &mut PlaybackScheduler, now: Duration) -> Vec<ConsultEvent> {
    let Some(mut content) = msg.server_content else {
        return Vec::new();
    };

    let mut events = Vec::new();
    scheduler.retire(now);

    if let Some(t) = content.output_transcription.take() {
        events.push(ConsultEvent::Transcript {
            text: t.text,
            from_model: true,
        });
    }
    if let Some(t) = content.input_transcription.take() {
        events.push(ConsultEvent::Transcript {
            text: t.text,
            from_model: false,
        });
    }

    for chunk in content.audio_chunks() {
        match decode_base64(chunk) {
            Ok(bytes) => {
                if let Some(buffer) = scheduler.schedule(decode_pcm16(&bytes), now) {
                    events.push(ConsultEvent::Playback(buffer));
                }
            }
            Err(e) => warn!(error = %e, "Dropping undecodable audio chunk"),
        }
    }

    if content.interrupted {
        scheduler.interrupt();
        events.push(ConsultEvent::Interrupted);
    }

    events
}

async fn read_loop(
    mut reader: WsReader,
    scheduler: Arc<Mutex<PlaybackScheduler>>,
    sink: Arc<dyn ConsultSink>,
    closed: Arc<AtomicBool>,
    clock: Instant,
) {
    while let Some(frame) = reader.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Live stream interrupted");
                break;
            }
        };

        match decode_frame(&frame) {
            Ok(Frame::Server(msg)) => {
                if msg.is_go_away() {
                    info!("Server announced disconnect");
                }
                let events = route(*msg, &mut lock(&scheduler), clock.elapsed());
                for event in events {
                    sink.on_event(event);
                }
            }
            Ok(Frame::Close) => break,
            Ok(Frame::Other) => {}
            Err(e) => warn!(error = %e, "Skipping unreadable server message"),
        }
    }

    if !closed.swap(true, Ordering::SeqCst) {
        lock(&scheduler).stop();
        sink.on_event(ConsultEvent::Closed);
        debug!("Live consult closed by server");
    }
}

/// An open voice consult.
///
/// Dropping the session stops reading but does not close the socket
/// politely; call [`ConsultSession::stop`] for that.
pub struct ConsultSession {
    writer: Arc<tokio::sync::Mutex<WsWriter>>,
    reader: JoinHandle<()>,
    scheduler: Arc<Mutex<PlaybackScheduler>>,
    sink: Arc<dyn ConsultSink>,
    closed: Arc<AtomicBool>,
}

impl ConsultSession {
    /// Stream one chunk of 16 kHz mono microphone samples.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` after [`stop`](Self::stop) or a server
    /// disconnect, or `StreamInterrupted` if the socket write fails.
    pub async fn send(&self, samples: &[f32]) -> GeminiResult<()> {
        if self.is_closed() {
            return Err(GeminiError::new(GeminiErrorKind::SessionClosed));
        }

        let message = RealtimeInputMessage {
            realtime_input: RealtimeInput {
                media_chunks: vec![InlineData {
                    mime_type: INPUT_MIME_TYPE.to_string(),
                    data: encode_base64(&encode_pcm16(samples)),
                }],
            },
        };
        let json = serde_json::to_string(&message).map_err(|e| {
            GeminiError::new(GeminiErrorKind::ApiRequest(format!(
                "Serialization error: {}",
                e
            )))
        })?;

        self.writer
            .lock()
            .await
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::StreamInterrupted(e.to_string())))
    }

    /// End the consult: close the socket, stop reading, drop queued audio.
    ///
    /// Calling it again does nothing.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.reader.abort();
        lock(&self.scheduler).stop();
        self.sink.on_event(ConsultEvent::Closed);

        if let Err(e) = self.writer.lock().await.close().await {
            debug!(error = %e, "Socket already closed");
        }
        info!("Live consult stopped");
    }

    /// Whether the consult has ended.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// State of the playback queue.
    pub fn playback_state(&self) -> PlaybackState {
        lock(&self.scheduler).state()
    }
}

impl Drop for ConsultSession {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for ConsultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsultSession")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
