//! Message types for the Gemini Live WebSocket protocol.

use serde::{Deserialize, Serialize};

use crate::gemini::{Content, Enabled, InlineData, SpeechConfig};

/// First message on a new connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupMessage {
    /// Session configuration
    pub setup: SetupConfig,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupConfig {
    /// `models/{id}`
    pub model: String,
    /// Output settings
    pub generation_config: LiveGenerationConfig,
    /// Transcribe what the user says
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<Enabled>,
    /// Transcribe what the model says
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_audio_transcription: Option<Enabled>,
}

impl SetupConfig {
    /// Spoken replies in `voice` with both transcriptions enabled.
    pub fn voice_consult(model: &str, voice: &str) -> Self {
        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };

        Self {
            model,
            generation_config: LiveGenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig::voice(voice)),
            },
            input_audio_transcription: Some(Enabled {}),
            output_audio_transcription: Some(Enabled {}),
        }
    }
}

/// Output settings for a live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveGenerationConfig {
    /// e.g. `["AUDIO"]`
    pub response_modalities: Vec<String>,
    /// Voice selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

/// Streamed microphone input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInputMessage {
    /// Input chunks
    pub realtime_input: RealtimeInput,
}

/// Input chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    /// Base64 media chunks
    pub media_chunks: Vec<InlineData>,
}

/// Any message the server sends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    /// Setup acknowledged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_complete: Option<Enabled>,
    /// Model output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_content: Option<ServerContent>,
    /// Server is about to disconnect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_away: Option<GoAway>,
}

impl ServerMessage {
    /// Setup acknowledged.
    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete.is_some()
    }

    /// Server is about to disconnect.
    pub fn is_go_away(&self) -> bool {
        self.go_away.is_some()
    }
}

/// Model output for the current turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    /// Spoken reply chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_turn: Option<Content>,
    /// Transcript of the user's speech
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_transcription: Option<Transcription>,
    /// Transcript of the model's speech
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_transcription: Option<Transcription>,
    /// The user barged in
    #[serde(default)]
    pub interrupted: bool,
    /// The model finished its turn
    #[serde(default)]
    pub turn_complete: bool,
}

impl ServerContent {
    /// Base64 audio payloads in this message.
    pub fn audio_chunks(&self) -> impl Iterator<Item = &str> {
        self.model_turn
            .iter()
            .flat_map(|turn| turn.parts.iter())
            .filter_map(|part| part.inline_data.as_ref())
            .map(|data| data.data.as_str())
    }
}

/// A transcript fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text
    #[serde(default)]
    pub text: String,
}

/// Disconnect notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoAway {
    /// Time left before the connection closes
    #[serde(default)]
    pub time_left: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_message_shape() {
        let setup = SetupMessage {
            setup: SetupConfig::voice_consult("gemini-2.5-flash-native-audio-preview-09-2025", "Kore"),
        };
        let json = serde_json::to_value(&setup).unwrap();

        assert_eq!(json["setup"]["model"], "models/gemini-2.5-flash-native-audio-preview-09-2025");
        assert_eq!(json["setup"]["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            json["setup"]["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
        assert_eq!(json["setup"]["inputAudioTranscription"], serde_json::json!({}));
        assert_eq!(json["setup"]["outputAudioTranscription"], serde_json::json!({}));
    }

    #[test]
    fn test_server_message_parsing() {
        let msg: ServerMessage = serde_json::from_str(
            r#"{"serverContent":{"modelTurn":{"parts":[{"inlineData":{"mimeType":"audio/pcm;rate=24000","data":"AAA="}}]},"outputTranscription":{"text":"Hello"}}}"#,
        )
        .unwrap();

        let content = msg.server_content.unwrap();
        assert_eq!(content.audio_chunks().collect::<Vec<_>>(), vec!["AAA="]);
        assert_eq!(content.output_transcription.unwrap().text, "Hello");
        assert!(!content.interrupted);

        let setup: ServerMessage = serde_json::from_str(r#"{"setupComplete":{}}"#).unwrap();
        assert!(setup.is_setup_complete());
        assert!(!setup.is_go_away());
    }
}
