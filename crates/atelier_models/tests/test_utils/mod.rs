//! Test utilities for the stylist tests.
//!
//! This module provides a scripted backend and reply builders.

pub mod mock_gemini;

#[allow(unused_imports)]
pub use mock_gemini::{MockCall, MockGemini};

use atelier_core::GroundingChunk;
use atelier_models::{GenerateContentResponse, VideoOperation};

/// A reply whose first candidate is `text`.
#[allow(dead_code)]
pub fn text_reply(text: &str) -> GenerateContentResponse {
    serde_json::from_value(serde_json::json!({
        "candidates": [ { "content": { "role": "model", "parts": [ { "text": text } ] } } ]
    }))
    .expect("valid reply")
}

/// A reply carrying one inline image.
#[allow(dead_code)]
pub fn image_reply(data: &str) -> GenerateContentResponse {
    serde_json::from_value(serde_json::json!({
        "candidates": [ { "content": { "parts": [
            { "text": "Here you go." },
            { "inlineData": { "mimeType": "image/png", "data": data } }
        ] } } ]
    }))
    .expect("valid reply")
}

/// A text reply with grounding citations.
#[allow(dead_code)]
pub fn grounded_reply(text: &str, chunks: Vec<GroundingChunk>) -> GenerateContentResponse {
    let mut reply = text_reply(text);
    reply.candidates[0].grounding_metadata = Some(atelier_models::GroundingMetadata {
        grounding_chunks: chunks,
    });
    reply
}

/// A video job in progress.
#[allow(dead_code)]
pub fn pending_video(name: &str) -> VideoOperation {
    VideoOperation {
        name: name.to_string(),
        ..Default::default()
    }
}

/// A finished video job pointing at `uri`.
#[allow(dead_code)]
pub fn finished_video(name: &str, uri: &str) -> VideoOperation {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "done": true,
        "response": { "generateVideoResponse": { "generatedSamples": [ { "video": { "uri": uri } } ] } }
    }))
    .expect("valid operation")
}
