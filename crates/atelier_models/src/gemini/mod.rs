//! Google Gemini REST transport.
//!
//! - [`GeminiBackend`] - the calls the stylist needs, as a trait
//! - [`GeminiRestClient`] - `reqwest` implementation against the public API
//! - wire types for requests, replies and long-running video jobs

mod backend;
mod protocol;
mod rest;

pub use backend::GeminiBackend;
pub use protocol::{
    Candidate, Content, Enabled, GenerateContentRequest, GenerateContentResponse, GeneratedVideo,
    GeneratedVideos, GenerationConfig, GroundingMetadata, ImageConfig, InlineData, OperationError,
    Part, PrebuiltVoiceConfig, RetrievalConfig, SpeechConfig, ThinkingConfig, Tool, ToolConfig,
    VideoFile, VideoInstance, VideoOperation, VideoParameters, VideoRequest, VideoResponse,
    VoiceConfig,
};
pub use rest::{GEMINI_API_BASE, GeminiRestClient};

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, atelier_error::GeminiError>;
