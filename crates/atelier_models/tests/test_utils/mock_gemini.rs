//! Scripted in-memory Gemini backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use atelier_error::{GeminiError, GeminiErrorKind};
use atelier_models::{
    GeminiBackend, GeminiResult, GenerateContentRequest, GenerateContentResponse, VideoOperation,
    VideoRequest,
};
use tokio::time::Instant;

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// `generate_content`, `start_video`, `poll_video` or `download`
    pub method: &'static str,
    /// Model, operation name or download uri
    pub target: String,
    /// Key the call was made with
    pub api_key: String,
    /// Request body as JSON, `null` for polls and downloads
    pub body: serde_json::Value,
    /// When the call happened on the test clock
    pub at: Instant,
}

/// Backend that replays scripted results and records every call.
///
/// When the generate script runs dry, calls fail with `GenerationFailed`.
#[derive(Debug, Default)]
pub struct MockGemini {
    replies: Mutex<VecDeque<GeminiResult<GenerateContentResponse>>>,
    video_states: Mutex<VecDeque<VideoOperation>>,
    video_bytes: Vec<u8>,
    calls: Mutex<Vec<MockCall>>,
}

#[allow(dead_code)]
impl MockGemini {
    /// A backend with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful `generate_content` reply.
    pub fn reply(self, response: GenerateContentResponse) -> Self {
        self.replies.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a failed `generate_content` call.
    pub fn fail(self, kind: GeminiErrorKind) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(GeminiError::new(kind)));
        self
    }

    /// Script a video job: `start_video` returns the first state, each poll
    /// the next one.
    pub fn video(self, states: Vec<VideoOperation>, bytes: &[u8]) -> Self {
        *self.video_states.lock().unwrap() = states.into();
        Self {
            video_bytes: bytes.to_vec(),
            ..self
        }
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Body of the most recent `generate_content` call.
    pub fn last_request(&self) -> serde_json::Value {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.method == "generate_content")
            .map(|c| c.body.clone())
            .unwrap_or_default()
    }

    fn record(&self, method: &'static str, target: &str, api_key: &str, body: serde_json::Value) {
        self.calls.lock().unwrap().push(MockCall {
            method,
            target: target.to_string(),
            api_key: api_key.to_string(),
            body,
            at: Instant::now(),
        });
    }

    fn next_video_state(&self) -> GeminiResult<VideoOperation> {
        self.video_states.lock().unwrap().pop_front().ok_or_else(|| {
            GeminiError::new(GeminiErrorKind::GenerationFailed(
                "no scripted video state".to_string(),
            ))
        })
    }
}

#[async_trait]
impl GeminiBackend for MockGemini {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        self.record(
            "generate_content",
            model,
            api_key,
            serde_json::to_value(request).unwrap(),
        );
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(GeminiError::new(GeminiErrorKind::GenerationFailed(
                "no scripted reply".to_string(),
            )))
        })
    }

    async fn start_video(
        &self,
        api_key: &str,
        model: &str,
        request: &VideoRequest,
    ) -> GeminiResult<VideoOperation> {
        self.record(
            "start_video",
            model,
            api_key,
            serde_json::to_value(request).unwrap(),
        );
        self.next_video_state()
    }

    async fn poll_video(
        &self,
        api_key: &str,
        operation: &VideoOperation,
    ) -> GeminiResult<VideoOperation> {
        self.record("poll_video", &operation.name, api_key, serde_json::Value::Null);
        self.next_video_state()
    }

    async fn download(&self, api_key: &str, uri: &str) -> GeminiResult<Vec<u8>> {
        self.record("download", uri, api_key, serde_json::Value::Null);
        Ok(self.video_bytes.clone())
    }
}
