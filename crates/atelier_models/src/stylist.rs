//! Stylist operations routed through the shared request lane.
//!
//! Every generative call except speech synthesis is submitted to one
//! [`RequestManager`] under its traffic class, so cooldowns and quota resets
//! apply across the whole assistant.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use atelier_core::{
    BoutiqueReport, DetectedItem, ItemCategorization, LatLng, OutfitSuggestions,
    ShoppingRecommendation, Wardrobe,
};
use atelier_error::{GeminiError, GeminiErrorKind};
use atelier_throttle::{ModelCatalog, RequestManager, TrafficClass};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::audio::{decode_base64, decode_pcm16};
use crate::gemini::{
    GeminiBackend, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig,
    Part, ThinkingConfig, Tool, VideoOperation, VideoRequest,
};
use crate::{CredentialProvider, GeminiResult};

/// Interval between video job polls.
pub const VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Thinking budget for deep stylist answers.
pub const DEEP_THINKING_BUDGET: u32 = 32_768;

/// Voice used for spoken replies.
pub const SPEECH_VOICE: &str = "Puck";

const FASHION_DIRECTOR: &str = "You are a senior fashion director. Analyze the user request with extreme depth, considering archival fashion, color theory, and lifestyle constraints.";
const BOUTIQUE_QUESTION: &str =
    "What are the best independent clothing boutiques or tailors nearby?";
const CATEGORIZE_PROMPT: &str =
    "Categorize this clothing item. Return JSON: category, color, season, occasion, tags.";
const SEPARATE_PROMPT: &str = "Detect and separate distinct clothing items in this photo. Return a JSON list of items with their category, color, and metadata.";
const CLEAN_BACKGROUND_PROMPT: &str = "Remove background, pure white.";

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn categorization_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": { "type": "STRING" },
            "color": { "type": "STRING" },
            "season": string_array(),
            "occasion": string_array(),
            "tags": string_array(),
        }
    })
}

fn shopping_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "wardrobeAnalysis": { "type": "STRING" },
            "styleProfile": {
                "type": "OBJECT",
                "properties": {
                    "dominantColors": string_array(),
                    "topOccasions": string_array(),
                    "coreAesthetic": { "type": "STRING" },
                }
            },
            "gaps": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "reason": { "type": "STRING" },
                    }
                }
            },
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "itemType": { "type": "STRING" },
                        "whyItFits": { "type": "STRING" },
                        "stylingIdea": { "type": "STRING" },
                    }
                }
            },
            "brandMatches": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "style": { "type": "STRING" },
                        "url": { "type": "STRING" },
                    }
                }
            },
        }
    })
}

/// Parse a JSON reply, using `empty` when the model returned no text.
fn parse_reply<T: DeserializeOwned>(text: &str, empty: &str) -> GeminiResult<T> {
    let text = text.trim();
    let text = if text.is_empty() { empty } else { text };
    serde_json::from_str(text).map_err(|e| {
        warn!(error = %e, "Model returned malformed JSON");
        GeminiError::new(GeminiErrorKind::InvalidResponse(e.to_string()))
    })
}

#[derive(Debug, Default, Deserialize)]
struct DetectedItems {
    #[serde(default)]
    items: Vec<ItemCategorization>,
}

/// AI stylist backed by Gemini.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use atelier_models::{EnvCredentials, GeminiRestClient, Stylist};
/// use atelier_throttle::{AtelierConfig, RequestManager};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AtelierConfig::load()?;
/// let stylist = Stylist::new(
///     Arc::new(GeminiRestClient::new()?),
///     Arc::new(EnvCredentials::new()),
///     RequestManager::new(&config.throttle),
///     config.models,
/// );
///
/// println!("{}", stylist.fast_analyze("Does rust pair with navy?").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Stylist {
    backend: Arc<dyn GeminiBackend>,
    credentials: Arc<dyn CredentialProvider>,
    lane: RequestManager,
    models: ModelCatalog,
    video_poll_interval: Duration,
}

impl std::fmt::Debug for Stylist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stylist")
            .field("lane", &self.lane)
            .field("models", &self.models)
            .field("video_poll_interval", &self.video_poll_interval)
            .finish_non_exhaustive()
    }
}

impl Stylist {
    /// Create a stylist that submits work to `lane`.
    pub fn new(
        backend: Arc<dyn GeminiBackend>,
        credentials: Arc<dyn CredentialProvider>,
        lane: RequestManager,
        models: ModelCatalog,
    ) -> Self {
        Self {
            backend,
            credentials,
            lane,
            models,
            video_poll_interval: VIDEO_POLL_INTERVAL,
        }
    }

    /// Override how often video jobs are polled.
    pub fn with_video_poll_interval(mut self, interval: Duration) -> Self {
        self.video_poll_interval = interval;
        self
    }

    /// The lane this stylist submits to.
    pub fn lane(&self) -> &RequestManager {
        &self.lane
    }

    /// Model ids in use.
    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    /// Credentials the stylist reads its key from.
    pub fn credentials(&self) -> &dyn CredentialProvider {
        self.credentials.as_ref()
    }

    /// Submit one `generateContent` call to the lane.
    ///
    /// The key is read on every attempt, so a key reselected while the
    /// request waits is the one that gets used.
    fn generate(
        &self,
        class: TrafficClass,
        model: &str,
        request: GenerateContentRequest,
    ) -> impl Future<Output = GeminiResult<GenerateContentResponse>> + Send + 'static {
        let backend = Arc::clone(&self.backend);
        let credentials = Arc::clone(&self.credentials);
        let model = model.to_string();
        let request = Arc::new(request);

        self.lane.enqueue(class, move || {
            let backend = Arc::clone(&backend);
            let credentials = Arc::clone(&credentials);
            let model = model.clone();
            let request = Arc::clone(&request);
            async move {
                let api_key = credentials.api_key()?;
                debug!(%model, "Calling generateContent");
                backend.generate_content(&api_key, &model, &request).await
            }
        })
    }

    /// Generate an image and return it as a PNG data URL.
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailed` when the reply carries no image.
    #[instrument(skip(self, prompt))]
    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: &str,
        size: &str,
    ) -> GeminiResult<String> {
        let request = GenerateContentRequest::text(prompt)
            .with_tool(Tool::google_search())
            .with_generation_config(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: aspect_ratio.to_string(),
                    image_size: size.to_string(),
                }),
                ..Default::default()
            });

        let response = self
            .generate(TrafficClass::HighCapability, &self.models.image, request)
            .await?;

        match response.first_inline_data() {
            Some(image) => Ok(format!("data:image/png;base64,{}", image.data)),
            None => Err(GeminiError::new(GeminiErrorKind::GenerationFailed(
                "no image in response".to_string(),
            ))),
        }
    }

    /// Answer a styling question with extended reasoning.
    #[instrument(skip_all)]
    pub async fn ask_stylist_deep(&self, message: &str) -> GeminiResult<String> {
        let request = GenerateContentRequest::text(message)
            .with_system_instruction(FASHION_DIRECTOR)
            .with_generation_config(GenerationConfig {
                thinking_config: Some(ThinkingConfig {
                    thinking_budget: DEEP_THINKING_BUDGET,
                }),
                ..Default::default()
            });

        let response = self
            .generate(TrafficClass::HighCapability, &self.models.deep, request)
            .await?;
        Ok(response.text())
    }

    /// Generate a short portrait video and return its bytes.
    ///
    /// The whole job, polling included, occupies the lane, so nothing else
    /// dispatches until the video is ready.
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailed` if the job reports an error or finishes
    /// without a video.
    #[instrument(skip(self, prompt))]
    pub async fn generate_style_video(&self, prompt: &str) -> GeminiResult<Vec<u8>> {
        let backend = Arc::clone(&self.backend);
        let credentials = Arc::clone(&self.credentials);
        let model = self.models.video.clone();
        let request = Arc::new(VideoRequest::portrait(prompt));
        let poll_interval = self.video_poll_interval;

        self.lane
            .enqueue(TrafficClass::HighCapability, move || {
                let backend = Arc::clone(&backend);
                let credentials = Arc::clone(&credentials);
                let model = model.clone();
                let request = Arc::clone(&request);
                async move {
                    let api_key = credentials.api_key()?;
                    let mut operation = backend.start_video(&api_key, &model, &request).await?;
                    info!(operation = %operation.name, "Video job started");

                    while !operation.done {
                        tokio::time::sleep(poll_interval).await;
                        operation = backend.poll_video(&api_key, &operation).await?;
                        debug!(operation = %operation.name, done = operation.done, "Polled video job");
                    }

                    let uri = finished_video_uri(&operation)?;
                    backend.download(&api_key, &uri).await
                }
            })
            .await
    }

    /// Analyse the wardrobe and recommend purchases, with web sources.
    #[instrument(skip_all, fields(items = wardrobe.items.len()))]
    pub async fn shopping_recommendations(
        &self,
        wardrobe: &Wardrobe,
    ) -> GeminiResult<ShoppingRecommendation> {
        let prompt = format!(
            "User Wardrobe:\n{}\nAnalyze style DNA, identify gaps, and suggest investments with Google Search grounding. Return JSON.",
            wardrobe.context_lines()
        );
        let request = GenerateContentRequest::text(prompt)
            .with_tool(Tool::google_search())
            .with_generation_config(GenerationConfig::json(Some(shopping_schema())));

        let response = self
            .generate(TrafficClass::HighCapability, &self.models.shopping, request)
            .await?;

        let mut recommendation: ShoppingRecommendation = parse_reply(&response.text(), "{}")?;
        recommendation.sources = response.grounding_chunks();
        Ok(recommendation)
    }

    /// Edit an image; returns the input unchanged if no image comes back.
    #[instrument(skip_all)]
    pub async fn edit_image(&self, image_base64: &str, prompt: &str) -> GeminiResult<String> {
        let request =
            GenerateContentRequest::user(vec![Part::jpeg(image_base64), Part::text(prompt)]);
        self.image_or_original(&self.models.edit_image, request, image_base64)
            .await
    }

    /// Quick answer from the lightweight model.
    #[instrument(skip_all)]
    pub async fn fast_analyze(&self, text: &str) -> GeminiResult<String> {
        let response = self
            .generate(
                TrafficClass::Fast,
                &self.models.fast_analyze,
                GenerateContentRequest::text(text),
            )
            .await?;
        Ok(response.text())
    }

    /// Find boutiques and tailors near `location`.
    #[instrument(skip(self))]
    pub async fn find_local_boutiques(&self, location: LatLng) -> GeminiResult<BoutiqueReport> {
        let request = GenerateContentRequest::text(BOUTIQUE_QUESTION)
            .with_tool(Tool::google_maps())
            .with_tool(Tool::google_search())
            .with_location(location);

        let response = self
            .generate(TrafficClass::Fast, &self.models.boutiques, request)
            .await?;

        Ok(BoutiqueReport {
            text: response.text(),
            places: response.grounding_chunks(),
        })
    }

    /// Categorise a single garment photo.
    #[instrument(skip_all)]
    pub async fn analyze_clothing_image(
        &self,
        image_base64: &str,
    ) -> GeminiResult<ItemCategorization> {
        let request =
            GenerateContentRequest::user(vec![Part::jpeg(image_base64), Part::text(CATEGORIZE_PROMPT)])
                .with_generation_config(GenerationConfig::json(Some(categorization_schema())));

        let response = self
            .generate(TrafficClass::Fast, &self.models.categorize, request)
            .await?;
        parse_reply(&response.text(), "{}")
    }

    /// Detect every garment in a photo.
    ///
    /// Each detected item carries the source photo, since the model does not
    /// crop.
    #[instrument(skip_all)]
    pub async fn separate_clothing_items(
        &self,
        image_base64: &str,
    ) -> GeminiResult<Vec<DetectedItem>> {
        let schema = json!({
            "type": "OBJECT",
            "properties": { "items": { "type": "ARRAY", "items": categorization_schema() } }
        });
        let request =
            GenerateContentRequest::user(vec![Part::jpeg(image_base64), Part::text(SEPARATE_PROMPT)])
                .with_generation_config(GenerationConfig::json(Some(schema)));

        let response = self
            .generate(TrafficClass::Fast, &self.models.separate, request)
            .await?;
        let detected: DetectedItems = parse_reply(&response.text(), r#"{"items": []}"#)?;

        debug!(count = detected.items.len(), "Detected clothing items");
        Ok(detected
            .items
            .into_iter()
            .map(|tags| DetectedItem {
                tags,
                image: image_base64.to_string(),
            })
            .collect())
    }

    /// Put a garment on a plain white background.
    #[instrument(skip_all)]
    pub async fn clean_image_background(&self, image_base64: &str) -> GeminiResult<String> {
        let request = GenerateContentRequest::user(vec![
            Part::jpeg(image_base64),
            Part::text(CLEAN_BACKGROUND_PROMPT),
        ]);
        self.image_or_original(&self.models.clean_background, request, image_base64)
            .await
    }

    /// Suggest outfits for an occasion as lists of wardrobe item ids.
    #[instrument(skip(self, wardrobe))]
    pub async fn suggest_outfits(
        &self,
        wardrobe: &Wardrobe,
        prompt: &str,
    ) -> GeminiResult<OutfitSuggestions> {
        let request = GenerateContentRequest::text(format!(
            "Wardrobe:\n{}\nSuggest 3 outfits for \"{}\". JSON array of ID arrays.",
            wardrobe.inventory_lines(),
            prompt
        ))
        .with_generation_config(GenerationConfig::json(None));

        let response = self
            .generate(TrafficClass::Fast, &self.models.outfits, request)
            .await?;
        parse_reply(&response.text(), "[]")
    }

    /// Speak `text` and return 24 kHz mono samples.
    ///
    /// Runs outside the lane. An empty vector means the model returned no
    /// audio.
    #[instrument(skip_all)]
    pub async fn synthesize_speech(&self, text: &str) -> GeminiResult<Vec<f32>> {
        let api_key = self.credentials.api_key()?;
        let request = GenerateContentRequest::text(text)
            .with_generation_config(GenerationConfig::audio(SPEECH_VOICE));

        let response = self
            .backend
            .generate_content(&api_key, &self.models.speech, &request)
            .await?;

        match response.first_inline_data() {
            Some(audio) => Ok(decode_pcm16(&decode_base64(&audio.data)?)),
            None => {
                debug!("No audio in speech response");
                Ok(Vec::new())
            }
        }
    }

    async fn image_or_original(
        &self,
        model: &str,
        request: GenerateContentRequest,
        original: &str,
    ) -> GeminiResult<String> {
        let response = self.generate(TrafficClass::Fast, model, request).await?;
        match response.first_inline_data() {
            Some(image) => Ok(image.data.clone()),
            None => {
                debug!("No image in response, keeping the original");
                Ok(original.to_string())
            }
        }
    }
}

fn finished_video_uri(operation: &VideoOperation) -> GeminiResult<String> {
    if let Some(error) = &operation.error {
        return Err(GeminiError::new(GeminiErrorKind::GenerationFailed(
            error.message.clone(),
        )));
    }

    operation.video_uri().map(str::to_string).ok_or_else(|| {
        GeminiError::new(GeminiErrorKind::GenerationFailed(
            "video job finished without a video".to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_uses_fallback_for_empty_text() {
        let outfits: OutfitSuggestions = parse_reply("  ", "[]").unwrap();
        assert!(outfits.is_empty());
    }

    #[test]
    fn test_parse_reply_rejects_malformed_json() {
        let result: GeminiResult<OutfitSuggestions> = parse_reply("[[\"a\"", "[]");
        assert!(matches!(
            result,
            Err(GeminiError {
                kind: GeminiErrorKind::InvalidResponse(_),
                ..
            })
        ));
    }

    #[test]
    fn test_shopping_schema_is_camel_case() {
        let schema = shopping_schema();
        assert!(schema["properties"]["styleProfile"]["properties"]["dominantColors"].is_object());
        assert!(schema["properties"]["brandMatches"]["items"]["properties"]["url"].is_object());
    }
}
