//! Client-side orchestration for the transcription app: who is logged in,
//! which preferences are set, how recognized speech flows through the rewrite
//! relay into the transcript.
//!
//! The vendor speech SDK and the browser UI stay outside this crate; the SDK
//! is reached only through [`recognition::Recognizer`].

pub mod auth;
pub mod prefs;
pub mod recognition;
pub mod relay_client;
pub mod session;
pub mod state;
#[cfg(test)]
mod test_utils;

pub use auth::{Authenticator, StaticCredentials};
pub use prefs::{MemoryPreferences, PreferenceStore, Preferences, TomlFilePreferences};
pub use recognition::{RecognitionEvent, RecognitionSettings, Recognizer, SpeechCredential};
pub use relay_client::RelayClient;
pub use session::{run_session, SessionEnd};
pub use state::{ClientState, Status, StatusKind, Transcript, TranscriptLine};
