//! Transport seam between the stylist and the Gemini API.

use async_trait::async_trait;

use super::{GenerateContentRequest, GenerateContentResponse, GeminiResult, VideoOperation, VideoRequest};

/// Calls the stylist makes against the generative backend.
///
/// The API key is passed on every call so a key reselected by the user takes
/// effect on the next request.
#[async_trait]
pub trait GeminiBackend: Send + Sync {
    /// Run `models/{model}:generateContent`.
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse>;

    /// Start a long-running video job.
    async fn start_video(
        &self,
        api_key: &str,
        model: &str,
        request: &VideoRequest,
    ) -> GeminiResult<VideoOperation>;

    /// Fetch the current state of a video job.
    async fn poll_video(&self, api_key: &str, operation: &VideoOperation)
    -> GeminiResult<VideoOperation>;

    /// Download a generated file.
    async fn download(&self, api_key: &str, uri: &str) -> GeminiResult<Vec<u8>>;
}
