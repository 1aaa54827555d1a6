//! Wire types for the Gemini REST API.
//!
//! Only the fields the stylist uses are modelled. Field names follow the
//! API's camelCase JSON.

use atelier_core::{GroundingChunk, LatLng};
use serde::{Deserialize, Serialize};

/// Body of a `models/{model}:generateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; a single user turn for every stylist call
    pub contents: Vec<Content>,
    /// System prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Grounding tools
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Tool parameters such as the user's location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    /// Generation parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A request with one user turn made of `parts`.
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content::user(parts)],
            ..Default::default()
        }
    }

    /// A request with one plain text user turn.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self::user(vec![Part::text(prompt)])
    }

    /// Set the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(Content {
            role: None,
            parts: vec![Part::text(instruction)],
        });
        self
    }

    /// Add a grounding tool.
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set the generation parameters.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    /// Ground the request at a location.
    pub fn with_location(mut self, location: LatLng) -> Self {
        self.tool_config = Some(ToolConfig {
            retrieval_config: RetrievalConfig { lat_lng: location },
        });
        self
    }
}

/// A role-tagged list of parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn.
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

/// One piece of content: text or inline media.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// A JPEG image part from base64 data.
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: data.into(),
            }),
        }
    }
}

/// Base64 media with its MIME type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type, e.g. `image/png` or `audio/pcm;rate=24000`
    #[serde(default)]
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

/// Generation parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested response MIME type, `application/json` for structured output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// JSON schema for structured output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    /// Output modalities, e.g. `["AUDIO"]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    /// Reasoning budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    /// Image output parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
    /// Voice selection for audio output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

impl GenerationConfig {
    /// Structured JSON output, optionally constrained by `schema`.
    pub fn json(schema: Option<serde_json::Value>) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: schema,
            ..Default::default()
        }
    }

    /// Spoken output in the given prebuilt voice.
    pub fn audio(voice: &str) -> Self {
        Self {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig::voice(voice)),
            ..Default::default()
        }
    }
}

/// Reasoning budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Maximum thinking tokens
    pub thinking_budget: u32,
}

/// Image output parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// e.g. `1:1`, `9:16`
    pub aspect_ratio: String,
    /// e.g. `1K`, `2K`
    pub image_size: String,
}

/// Voice selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    /// Voice configuration
    pub voice_config: VoiceConfig,
}

impl SpeechConfig {
    /// Use a prebuilt voice by name.
    pub fn voice(name: &str) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: name.to_string(),
                },
            },
        }
    }
}

/// Voice configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    /// Prebuilt voice
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

/// A named prebuilt voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    /// Voice name, e.g. `Puck`
    pub voice_name: String,
}

/// Marker object serialized as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enabled {}

/// A grounding tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Google Search grounding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<Enabled>,
    /// Google Maps grounding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<Enabled>,
}

impl Tool {
    /// Google Search grounding.
    pub fn google_search() -> Self {
        Self {
            google_search: Some(Enabled {}),
            ..Default::default()
        }
    }

    /// Google Maps grounding.
    pub fn google_maps() -> Self {
        Self {
            google_maps: Some(Enabled {}),
            ..Default::default()
        }
    }
}

/// Tool parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    /// Retrieval parameters
    pub retrieval_config: RetrievalConfig,
}

/// Location used by maps grounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// User location
    pub lat_lng: LatLng,
}

/// Reply to a `generateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidates; the stylist only reads the first
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// Concatenated text of the first candidate.
    pub fn text(&self) -> String {
        self.parts().filter_map(|p| p.text.as_deref()).collect()
    }

    /// First inline media part of the first candidate.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }

    /// Grounding citations of the first candidate.
    pub fn grounding_chunks(&self) -> Vec<GroundingChunk> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.clone())
            .unwrap_or_default()
    }
}

/// One generated candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Citations for grounded replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
    /// Why generation stopped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Citations for a grounded reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    /// Web and maps sources
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// Body of a `models/{model}:predictLongRunning` video call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    /// Prompts, one per video
    pub instances: Vec<VideoInstance>,
    /// Output parameters
    pub parameters: VideoParameters,
}

impl VideoRequest {
    /// One portrait 720p video for `prompt`.
    pub fn portrait(prompt: impl Into<String>) -> Self {
        Self {
            instances: vec![VideoInstance {
                prompt: prompt.into(),
            }],
            parameters: VideoParameters {
                aspect_ratio: "9:16".to_string(),
                resolution: "720p".to_string(),
                sample_count: 1,
            },
        }
    }
}

/// Video prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInstance {
    /// Text prompt
    pub prompt: String,
}

/// Video output parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    /// e.g. `9:16`
    pub aspect_ratio: String,
    /// e.g. `720p`
    pub resolution: String,
    /// Number of videos
    pub sample_count: u32,
}

/// A long-running video generation job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperation {
    /// Operation resource name, polled at `{base}/{name}`
    pub name: String,
    /// Finished, successfully or not
    #[serde(default)]
    pub done: bool,
    /// Result once done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<VideoResponse>,
    /// Failure once done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl VideoOperation {
    /// Download link of the first generated video.
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()
            .map(|v| v.uri.as_str())
    }
}

/// Finished video job payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    /// Generated samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_video_response: Option<GeneratedVideos>,
}

/// Generated samples of a video job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideos {
    /// One entry per video
    #[serde(default)]
    pub generated_samples: Vec<GeneratedVideo>,
}

/// One generated video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedVideo {
    /// Stored file
    #[serde(default)]
    pub video: Option<VideoFile>,
}

/// A stored video file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFile {
    /// Download link; requires the API key
    pub uri: String,
}

/// Error status attached to a finished operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Numeric status code
    #[serde(default)]
    pub code: Option<i32>,
    /// Error message
    #[serde(default)]
    pub message: String,
}
