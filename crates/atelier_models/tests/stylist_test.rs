// Stylist operations against a scripted backend.
//
// Every test runs on a paused clock so cooldowns, quota resets and video
// polling complete instantly.

mod test_utils;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use atelier_core::{Category, GroundingChunk, GroundingSource, LatLng, Wardrobe};
use atelier_error::{GeminiError, GeminiErrorKind};
use atelier_models::{
    CredentialProvider, GeminiResult, StaticCredentials, Stylist, encode_base64, encode_pcm16,
};
use atelier_throttle::{ModelCatalog, RequestManager, ThrottleConfig, TrafficClass};
use test_utils::{
    MockGemini, finished_video, grounded_reply, image_reply, pending_video, text_reply,
};
use tokio::time::Instant;

fn stylist_with(mock: &Arc<MockGemini>, credentials: Arc<dyn CredentialProvider>) -> Stylist {
    Stylist::new(
        mock.clone(),
        credentials,
        RequestManager::new(&ThrottleConfig::default()),
        ModelCatalog::default(),
    )
}

fn stylist(mock: &Arc<MockGemini>) -> Stylist {
    stylist_with(mock, Arc::new(StaticCredentials::new("test-key")))
}

fn wardrobe() -> Wardrobe {
    serde_json::from_value(serde_json::json!({
        "items": [
            {
                "id": "a1", "imageUrl": "", "category": "Tops", "color": "navy",
                "tags": ["linen"], "createdAt": 1_700_000_000_000_i64
            },
            {
                "id": "b2", "imageUrl": "", "category": "Bottoms", "color": "cream",
                "tags": ["wide-leg", "wool"], "createdAt": 1_700_000_000_000_i64
            }
        ]
    }))
    .unwrap()
}

fn web(uri: &str, title: &str) -> GroundingChunk {
    GroundingChunk {
        web: Some(GroundingSource {
            uri: uri.to_string(),
            title: title.to_string(),
        }),
        maps: None,
    }
}

fn assert_close(actual: Duration, expected: Duration) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= Duration::from_millis(50),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn test_generate_image_returns_data_url() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(image_reply("iVBORw0KGgo=")));
    let stylist = stylist(&mock);

    let url = stylist
        .generate_image("camel coat on a rainy street", "3:4", "2K")
        .await?;

    assert_eq!(url, "data:image/png;base64,iVBORw0KGgo=");

    let calls = mock.calls();
    assert_eq!(calls[0].target, "gemini-3-pro-image-preview");
    assert_eq!(calls[0].api_key, "test-key");

    let body = mock.last_request();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "camel coat on a rainy street");
    assert_eq!(body["tools"][0]["googleSearch"], serde_json::json!({}));
    assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");
    assert_eq!(body["generationConfig"]["imageConfig"]["imageSize"], "2K");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_generate_image_without_image_fails() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply("I can only describe it.")));
    let stylist = stylist(&mock);

    let err = stylist
        .generate_image("linen suit", "1:1", "1K")
        .await
        .unwrap_err();

    assert!(matches!(err.kind, GeminiErrorKind::GenerationFailed(_)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_edit_image_falls_back_to_input() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockGemini::new()
            .reply(image_reply("edited"))
            .reply(text_reply("No changes needed.")),
    );
    let stylist = stylist(&mock);

    assert_eq!(stylist.edit_image("original", "make it red").await?, "edited");
    assert_eq!(stylist.edit_image("original", "make it red").await?, "original");

    let body = mock.last_request();
    assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "original");
    assert_eq!(body["contents"][0]["parts"][1]["text"], "make it red");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_clean_background_falls_back_to_input() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply("")));
    let stylist = stylist(&mock);

    assert_eq!(stylist.clean_image_background("photo").await?, "photo");
    assert_eq!(
        mock.last_request()["contents"][0]["parts"][1]["text"],
        "Remove background, pure white."
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_deep_question_uses_thinking_budget() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply("Anchor the look with charcoal.")));
    let stylist = stylist(&mock);

    let answer = stylist
        .ask_stylist_deep("How do I dress for a winter wedding?")
        .await?;
    assert_eq!(answer, "Anchor the look with charcoal.");

    let body = mock.last_request();
    assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 32768);
    assert!(
        body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("You are a senior fashion director.")
    );
    assert_eq!(mock.calls()[0].target, "gemini-3-pro-preview");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_shopping_recommendations_include_sources() -> anyhow::Result<()> {
    let reply = serde_json::json!({
        "wardrobeAnalysis": "Strong neutral base.",
        "styleProfile": { "dominantColors": ["navy", "cream"], "topOccasions": ["Work"], "coreAesthetic": "quiet luxury" },
        "gaps": [ { "category": "Outerwear", "reason": "No coat for winter." } ],
        "suggestions": [ { "itemType": "Camel overcoat", "whyItFits": "Warms the palette.", "stylingIdea": "Over the navy knit." } ],
        "brandMatches": [ { "name": "Studio Nicholson", "style": "minimal", "url": "https://example.com" } ]
    });
    let sources = vec![web("https://example.com/coats", "Coat guide")];
    let mock = Arc::new(MockGemini::new().reply(grounded_reply(&reply.to_string(), sources.clone())));
    let stylist = stylist(&mock);

    let recommendation = stylist.shopping_recommendations(&wardrobe()).await?;

    assert_eq!(recommendation.wardrobe_analysis, "Strong neutral base.");
    assert_eq!(recommendation.style_profile.core_aesthetic, "quiet luxury");
    assert_eq!(recommendation.gaps[0].category, "Outerwear");
    assert_eq!(recommendation.suggestions[0].item_type, "Camel overcoat");
    assert_eq!(recommendation.brand_matches[0].name, "Studio Nicholson");
    assert_eq!(recommendation.sources, sources);

    let body = mock.last_request();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.starts_with("User Wardrobe:\nTops: navy (linen)\nBottoms: cream (wide-leg, wool)\n"));
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert!(body["generationConfig"]["responseSchema"]["properties"]["styleProfile"].is_object());
    assert_eq!(body["tools"][0]["googleSearch"], serde_json::json!({}));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_shopping_recommendations_tolerate_empty_reply() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply("")));
    let stylist = stylist(&mock);

    let recommendation = stylist.shopping_recommendations(&Wardrobe::default()).await?;
    assert!(recommendation.gaps.is_empty());
    assert!(recommendation.sources.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_suggest_outfits_parses_id_lists() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockGemini::new()
            .reply(text_reply(r#"[["a1","b2"],["a1"],["b2"]]"#))
            .reply(text_reply("")),
    );
    let stylist = stylist(&mock);
    let wardrobe = wardrobe();

    let outfits = stylist.suggest_outfits(&wardrobe, "gallery opening").await?;
    assert_eq!(outfits.len(), 3);
    assert_eq!(outfits[0], vec!["a1".to_string(), "b2".to_string()]);
    assert_eq!(wardrobe.resolve(&outfits[0]).count(), 2);

    let body = mock.last_request();
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        "Wardrobe:\nID:a1, Tops, navy\nID:b2, Bottoms, cream\nSuggest 3 outfits for \"gallery opening\". JSON array of ID arrays."
    );
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");

    assert!(stylist.suggest_outfits(&wardrobe, "brunch").await?.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_malformed_json_is_invalid_response() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply("three outfits: a1, b2")));
    let stylist = stylist(&mock);

    let err = stylist
        .suggest_outfits(&wardrobe(), "brunch")
        .await
        .unwrap_err();
    assert!(matches!(err.kind, GeminiErrorKind::InvalidResponse(_)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_analyze_clothing_image() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply(
        r#"{"category":"outerwear","color":"camel","season":["Winter"],"occasion":["Work"],"tags":["wool"]}"#,
    )));
    let stylist = stylist(&mock);

    let tags = stylist.analyze_clothing_image("photo").await?;
    assert_eq!(tags.category(), Some(Category::Outerwear));
    assert_eq!(tags.color, "camel");
    assert_eq!(tags.tags, vec!["wool".to_string()]);
    assert_eq!(mock.calls()[0].target, "gemini-flash-lite-latest");
    assert_eq!(
        mock.last_request()["contents"][0]["parts"][1]["text"],
        "Categorize this clothing item. Return JSON: category, color, season, occasion, tags."
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_separate_items_attach_source_image() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply(
        r#"{"items":[{"category":"Tops","color":"white","tags":["tee"]},{"category":"Shoes","color":"black"}]}"#,
    )));
    let stylist = stylist(&mock);

    let items = stylist.separate_clothing_items("flatlay").await?;
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.image == "flatlay"));
    assert_eq!(items[1].tags.category(), Some(Category::Shoes));
    assert!(items[1].tags.tags.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_find_local_boutiques_sends_location() -> anyhow::Result<()> {
    let places = vec![GroundingChunk {
        web: None,
        maps: Some(GroundingSource {
            uri: "https://maps.google.com/?cid=1".to_string(),
            title: "Tailor & Co".to_string(),
        }),
    }];
    let mock = Arc::new(MockGemini::new().reply(grounded_reply("Try Tailor & Co.", places.clone())));
    let stylist = stylist(&mock);

    let report = stylist
        .find_local_boutiques(LatLng {
            latitude: 51.5,
            longitude: -0.12,
        })
        .await?;

    assert_eq!(report.text, "Try Tailor & Co.");
    assert_eq!(report.places, places);

    let body = mock.last_request();
    assert_eq!(body["tools"][0]["googleMaps"], serde_json::json!({}));
    assert_eq!(body["tools"][1]["googleSearch"], serde_json::json!({}));
    assert_eq!(body["toolConfig"]["retrievalConfig"]["latLng"]["latitude"], 51.5);
    assert_eq!(body["toolConfig"]["retrievalConfig"]["latLng"]["longitude"], -0.12);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_video_is_polled_until_done() -> anyhow::Result<()> {
    let uri = "https://generativelanguage.googleapis.com/v1beta/files/abc:download?alt=media";
    let mock = Arc::new(MockGemini::new().video(
        vec![
            pending_video("operations/v1"),
            pending_video("operations/v1"),
            finished_video("operations/v1", uri),
        ],
        b"mp4 bytes",
    ));
    let stylist = stylist(&mock);

    let start = Instant::now();
    let video = stylist.generate_style_video("runway walk in a trench coat").await?;

    assert_eq!(video, b"mp4 bytes");
    assert_close(start.elapsed(), Duration::from_secs(20));

    let calls = mock.calls();
    let methods: Vec<_> = calls.iter().map(|c| c.method).collect();
    assert_eq!(methods, vec!["start_video", "poll_video", "poll_video", "download"]);
    assert_eq!(calls[0].target, "veo-3.1-fast-generate-preview");
    assert_eq!(calls[0].body["parameters"]["aspectRatio"], "9:16");
    assert_eq!(calls[0].body["parameters"]["resolution"], "720p");
    assert_eq!(calls[3].target, uri);
    assert_eq!(calls[3].api_key, "test-key");

    // The whole job held the lane, and the cooldown starts when it ends.
    assert_eq!(stylist.lane().wait_seconds(TrafficClass::HighCapability), 32);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failed_video_job_reports_generation_failure() -> anyhow::Result<()> {
    let mut failed = pending_video("operations/v2");
    failed.done = true;
    failed.error = Some(atelier_models::OperationError {
        code: Some(3),
        message: "prompt was blocked".to_string(),
    });
    let mock = Arc::new(MockGemini::new().video(vec![failed], b""));
    let stylist = stylist(&mock);

    let err = stylist.generate_style_video("anything").await.unwrap_err();
    match err.kind {
        GeminiErrorKind::GenerationFailed(message) => assert_eq!(message, "prompt was blocked"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mock.call_count(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_quota_error_is_retried_after_reset() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockGemini::new()
            .fail(GeminiErrorKind::HttpError {
                status_code: 429,
                message: "Resource has been exhausted (RESOURCE_EXHAUSTED)".to_string(),
            })
            .reply(text_reply("Navy and rust work.")),
    );
    let stylist = stylist(&mock);

    assert_eq!(stylist.fast_analyze("navy with rust?").await?, "Navy and rust work.");

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_close(calls[1].at - calls[0].at, Duration::from_secs(60));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_missing_key_never_reaches_backend() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply("unused")));
    let stylist = stylist_with(&mock, Arc::new(StaticCredentials::new("")));

    let err = stylist.fast_analyze("hello").await.unwrap_err();

    assert!(matches!(err.kind, GeminiErrorKind::InvalidCredential));
    assert_eq!(mock.call_count(), 0);
    Ok(())
}

/// Key holder whose selection can change between requests.
struct SwitchableKey(Mutex<String>);

impl CredentialProvider for SwitchableKey {
    fn api_key(&self) -> GeminiResult<String> {
        Ok(self.0.lock().unwrap().clone())
    }

    fn open_select_key(&self) -> GeminiResult<()> {
        *self.0.lock().unwrap() = "second-key".to_string();
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_reselected_key_is_used_by_next_request() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockGemini::new()
            .reply(text_reply("one"))
            .reply(text_reply("two")),
    );
    let credentials = Arc::new(SwitchableKey(Mutex::new("first-key".to_string())));
    let stylist = stylist_with(&mock, credentials.clone());

    stylist.fast_analyze("first").await?;
    credentials.open_select_key()?;
    stylist.fast_analyze("second").await?;

    let keys: Vec<_> = mock.calls().into_iter().map(|c| c.api_key).collect();
    assert_eq!(keys, vec!["first-key".to_string(), "second-key".to_string()]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_fast_call_starts_fast_cooldown_only() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply("ok")));
    let stylist = stylist(&mock);

    stylist.fast_analyze("quick check").await?;

    assert_eq!(stylist.lane().wait_seconds(TrafficClass::Fast), 5);
    assert_eq!(stylist.lane().wait_seconds(TrafficClass::HighCapability), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_speech_bypasses_the_lane() -> anyhow::Result<()> {
    let pcm = encode_base64(&encode_pcm16(&[0.5, -0.5, 0.0]));
    let mock = Arc::new(
        MockGemini::new()
            .reply(text_reply("Wear the blazer."))
            .reply(image_reply(&pcm)),
    );
    let stylist = stylist(&mock);

    stylist.fast_analyze("what should I wear?").await?;
    let start = Instant::now();
    let samples = stylist.synthesize_speech("Wear the blazer.").await?;

    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(samples.len(), 3);
    assert!((samples[0] - 0.5).abs() < 0.001);
    assert!((samples[1] + 0.5).abs() < 0.001);

    let body = mock.last_request();
    assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
    assert_eq!(
        body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
        "Puck"
    );
    assert_eq!(mock.calls()[1].target, "gemini-2.5-flash-preview-tts");

    // Speech does not touch the lane's cooldown bookkeeping.
    assert_eq!(stylist.lane().wait_seconds(TrafficClass::Fast), 5);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_speech_without_audio_is_empty() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().reply(text_reply("")));
    let stylist = stylist(&mock);

    assert!(stylist.synthesize_speech("hello").await?.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_backend_errors_pass_through() -> anyhow::Result<()> {
    let mock = Arc::new(MockGemini::new().fail(GeminiErrorKind::HttpError {
        status_code: 400,
        message: "Invalid argument".to_string(),
    }));
    let stylist = stylist(&mock);

    let err: GeminiError = stylist.fast_analyze("hi").await.unwrap_err();
    assert!(matches!(
        err.kind,
        GeminiErrorKind::HttpError {
            status_code: 400,
            ..
        }
    ));
    assert_eq!(mock.call_count(), 1);
    Ok(())
}
