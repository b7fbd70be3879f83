use protocol::ClientConfig;
use std::time::SystemTime;

use crate::auth::Authenticator;
use crate::prefs::{PreferenceStore, Preferences};
use crate::recognition::{custom_model_available, SIMPLIFIED_CHINESE};

pub const DEFAULT_SERVICE_REGION: &str = "eastus";
pub const DEFAULT_RELEVANT_PHRASES: &str =
    "佛性,釋迦牟尼佛,般若波羅蜜多心經,戒定慧,空性,南無,眾生,三大阿僧祇劫";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Listening,
    Stopped,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub kind: StatusKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptLine {
    Original(String),
    Rewritten(String),
}

/// Rendered lines plus the raw and rewritten text buffers used for export.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
    interim: Option<String>,
    raw: String,
    rewritten: String,
    last_original: String,
}

impl Transcript {
    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn interim(&self) -> Option<&str> {
        self.interim.as_deref()
    }

    pub fn show_interim(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.interim = Some(text.to_string());
    }

    /// Appends a finalized segment. Returns `false` when the segment repeats
    /// the previous one and was dropped.
    pub fn push_original(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.interim = None;
        if text == self.last_original {
            return false;
        }
        self.raw.push_str(text);
        self.raw.push(' ');
        self.last_original = text.to_string();
        self.lines.push(TranscriptLine::Original(text.to_string()));
        true
    }

    pub fn push_rewritten(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.interim = None;
        self.rewritten.push_str(text);
        self.rewritten.push(' ');
        self.lines.push(TranscriptLine::Rewritten(text.to_string()));
    }

    /// Whitespace-separated words in the raw transcript.
    pub fn word_count(&self) -> usize {
        self.raw.split_whitespace().count()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty() && self.rewritten.trim().is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Plain-text download body, `None` when there is nothing to save.
    pub fn export(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut content = String::new();
        if !self.raw.trim().is_empty() {
            content.push_str("RAW TRANSCRIPT:\n");
            content.push_str(&self.raw);
            content.push_str("\n\n");
        }
        if !self.rewritten.trim().is_empty() {
            content.push_str("REWRITTEN TRANSCRIPT:\n");
            content.push_str(&self.rewritten);
        }
        Some(content)
    }
}

/// `transcript-YYYY-MM-DD.txt` for the UTC date of `now`.
pub fn export_file_name(now: SystemTime) -> String {
    let stamp = humantime::format_rfc3339_seconds(now).to_string();
    let date = stamp.get(..10).unwrap_or(&stamp);
    format!("transcript-{date}.txt")
}

/// Everything the client tracks between UI events.
#[derive(Debug)]
pub struct ClientState {
    config: Option<ClientConfig>,
    current_user: Option<String>,
    prefs: Preferences,
    language: String,
    relevant_phrases: String,
    listening: bool,
    status: Option<Status>,
    transcript: Transcript,
}

impl ClientState {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            config: None,
            current_user: None,
            prefs,
            language: SIMPLIFIED_CHINESE.to_string(),
            relevant_phrases: DEFAULT_RELEVANT_PHRASES.to_string(),
            listening: false,
            status: None,
            transcript: Transcript::default(),
        }
    }

    pub fn login(&mut self, auth: &dyn Authenticator, user: &str, password: &str) -> bool {
        let user = user.trim();
        if !auth.validate(user, password) {
            tracing::info!(user = %user, "login rejected");
            return false;
        }
        tracing::info!(user = %user, "login accepted");
        self.current_user = Some(user.to_string());
        true
    }

    /// The caller stops any running session first.
    pub fn logout(&mut self) {
        self.current_user = None;
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// Stores the relay config, filling the region default. Without a
    /// subscription key, sessions fall back to relay-issued tokens.
    pub fn apply_config(&mut self, mut config: ClientConfig) {
        if config.azure_service_region.trim().is_empty() {
            config.azure_service_region = DEFAULT_SERVICE_REGION.to_string();
        }
        if config.azure_subscription_key.is_empty() {
            tracing::info!("subscription key withheld by relay, sessions will use issued tokens");
        }
        self.config = Some(config);
    }

    pub fn config(&self) -> Option<&ClientConfig> {
        self.config.as_ref()
    }

    pub fn config_ready(&self) -> bool {
        self.config.is_some()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    /// Effective setting: the stored preference only applies where a custom
    /// model exists for the selected language.
    pub fn use_custom_model(&self) -> bool {
        self.prefs.use_custom_model && custom_model_available(&self.language)
    }

    /// Returns the effective value. Unavailable languages force it off and
    /// leave the stored preference untouched.
    pub fn set_use_custom_model(
        &mut self,
        store: &mut dyn PreferenceStore,
        enabled: bool,
    ) -> anyhow::Result<bool> {
        if !custom_model_available(&self.language) {
            return Ok(false);
        }
        self.prefs.use_custom_model = enabled;
        self.prefs.save_use_custom_model(store)?;
        Ok(enabled)
    }

    pub fn rewrite_enabled(&self) -> bool {
        self.prefs.enable_rewrite
    }

    pub fn set_enable_rewrite(
        &mut self,
        store: &mut dyn PreferenceStore,
        enabled: bool,
    ) -> anyhow::Result<()> {
        self.prefs.enable_rewrite = enabled;
        self.prefs.save_enable_rewrite(store)
    }

    pub fn relevant_phrases(&self) -> &str {
        &self.relevant_phrases
    }

    pub fn set_relevant_phrases(&mut self, phrases: &str) {
        self.relevant_phrases = phrases.to_string();
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub(crate) fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    pub fn can_start(&self) -> bool {
        self.is_logged_in() && !self.listening
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.status = Some(Status {
            message: message.into(),
            kind,
        });
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
        self.set_status("Transcript cleared", StatusKind::Success);
    }
}
