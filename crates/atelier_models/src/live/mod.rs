//! Live voice consultation.
//!
//! - [`LiveConsult`] - connection settings and session start
//! - [`ConsultSession`] - an open consult: stream microphone audio, stop
//! - [`PlaybackScheduler`] - gapless placement of the stylist's speech

mod playback;
mod protocol;
mod session;

pub use playback::{PlaybackScheduler, PlaybackState, ScheduledBuffer};
pub use protocol::{
    GoAway, LiveGenerationConfig, RealtimeInput, RealtimeInputMessage, ServerContent,
    ServerMessage, SetupConfig, SetupMessage, Transcription,
};
pub use session::{
    CONSULT_VOICE, ConsultEvent, ConsultSession, ConsultSink, LIVE_API_ENDPOINT, LiveConsult,
    LiveConsultBuilder, LiveConsultBuilderError,
};
