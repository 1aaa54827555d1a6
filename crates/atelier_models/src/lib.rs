//! Gemini-backed stylist for the Atelier wardrobe assistant.
//!
//! - [`Stylist`] - image, video, shopping and outfit operations, each
//!   submitted to the shared request lane
//! - [`GeminiBackend`] / [`GeminiRestClient`] - REST transport
//! - [`CredentialProvider`] - where the API key comes from
//! - [`LiveConsult`] - real-time voice consults over WebSocket
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use atelier_core::Wardrobe;
//! use atelier_models::{EnvCredentials, GeminiRestClient, Stylist};
//! use atelier_throttle::{AtelierConfig, RequestManager};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AtelierConfig::load()?;
//! let stylist = Stylist::new(
//!     Arc::new(GeminiRestClient::new()?),
//!     Arc::new(EnvCredentials::new()),
//!     RequestManager::new(&config.throttle),
//!     config.models,
//! );
//!
//! let outfits = stylist.suggest_outfits(&Wardrobe::default(), "gallery opening").await?;
//! println!("{} outfits", outfits.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audio;
mod credential;
mod gemini;
mod live;
mod stylist;

pub use audio::{
    INPUT_MIME_TYPE, INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, decode_base64, decode_pcm16,
    duration_of, encode_base64, encode_pcm16,
};
pub use credential::{API_KEY_VAR, CredentialProvider, EnvCredentials, StaticCredentials};
pub use gemini::{
    Candidate, Content, Enabled, GEMINI_API_BASE, GeminiBackend, GeminiRestClient, GeminiResult,
    GenerateContentRequest, GenerateContentResponse, GeneratedVideo, GeneratedVideos,
    GenerationConfig, GroundingMetadata, ImageConfig, InlineData, OperationError, Part,
    PrebuiltVoiceConfig, RetrievalConfig, SpeechConfig, ThinkingConfig, Tool, ToolConfig,
    VideoFile, VideoInstance, VideoOperation, VideoParameters, VideoRequest, VideoResponse,
    VoiceConfig,
};
pub use live::{
    CONSULT_VOICE, ConsultEvent, ConsultSession, ConsultSink, GoAway, LIVE_API_ENDPOINT,
    LiveConsult, LiveConsultBuilder, LiveConsultBuilderError, LiveGenerationConfig,
    PlaybackScheduler, PlaybackState, RealtimeInput, RealtimeInputMessage, ScheduledBuffer,
    ServerContent, ServerMessage, SetupConfig, SetupMessage, Transcription,
};
pub use stylist::{DEEP_THINKING_BUDGET, SPEECH_VOICE, Stylist, VIDEO_POLL_INTERVAL};
