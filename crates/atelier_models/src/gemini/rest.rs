//! `reqwest` implementation of [`GeminiBackend`].

use async_trait::async_trait;
use atelier_error::{GeminiError, GeminiErrorKind};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, trace};

use super::{
    GeminiBackend, GeminiResult, GenerateContentRequest, GenerateContentResponse, VideoOperation,
    VideoRequest,
};

/// Gemini REST endpoint.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// REST client for the Gemini API.
///
/// # Example
///
/// ```no_run
/// use atelier_models::{GeminiBackend, GeminiRestClient, GenerateContentRequest};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiRestClient::new()?;
/// let reply = client
///     .generate_content(
///         &std::env::var("GEMINI_API_KEY")?,
///         "gemini-flash-lite-latest",
///         &GenerateContentRequest::text("Name one neutral colour."),
///     )
///     .await?;
/// println!("{}", reply.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GeminiRestClient {
    http: Client,
    base_url: String,
}

/// Error envelope returned by the API on non-2xx replies.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Extract a readable message from an error body.
///
/// The API status name (e.g. `RESOURCE_EXHAUSTED`) is kept because failure
/// classification matches on it.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => match error.status {
            Some(status) if !status.is_empty() => format!("{} ({})", error.message, status),
            _ => error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

impl GeminiRestClient {
    /// Create a client for the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> GeminiResult<Self> {
        Self::with_base_url(GEMINI_API_BASE)
    }

    /// Create a client for a different endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> GeminiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("atelier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeminiError::new(GeminiErrorKind::ClientCreation(e.to_string())))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-2xx reply into `HttpError`.
    async fn check(response: Response) -> GeminiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        error!(status = status.as_u16(), %message, "Gemini API returned an error");

        Err(GeminiError::new(GeminiErrorKind::HttpError {
            status_code: status.as_u16(),
            message,
        }))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> GeminiResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;
        trace!(len = body.len(), "Decoding response body");

        serde_json::from_str(&body)
            .map_err(|e| GeminiError::new(GeminiErrorKind::InvalidResponse(e.to_string())))
    }

    async fn post_json<B, T>(&self, url: &str, api_key: &str, body: &B) -> GeminiResult<T>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        Self::decode(Self::check(response).await?).await
    }
}

#[async_trait]
impl GeminiBackend for GeminiRestClient {
    #[instrument(skip(self, api_key, request))]
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!("Sending generateContent request");
        self.post_json(&url, api_key, request).await
    }

    #[instrument(skip(self, api_key, request))]
    async fn start_video(
        &self,
        api_key: &str,
        model: &str,
        request: &VideoRequest,
    ) -> GeminiResult<VideoOperation> {
        let url = format!("{}/models/{}:predictLongRunning", self.base_url, model);
        debug!("Starting video generation");
        self.post_json(&url, api_key, request).await
    }

    #[instrument(skip(self, api_key, operation), fields(operation = %operation.name))]
    async fn poll_video(
        &self,
        api_key: &str,
        operation: &VideoOperation,
    ) -> GeminiResult<VideoOperation> {
        let url = format!("{}/{}", self.base_url, operation.name);
        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        Self::decode(Self::check(response).await?).await
    }

    #[instrument(skip(self, api_key))]
    async fn download(&self, api_key: &str, uri: &str) -> GeminiResult<Vec<u8>> {
        let response = self
            .http
            .get(uri)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        debug!(bytes = bytes.len(), "Downloaded file");
        Ok(bytes.to_vec())
    }
}
