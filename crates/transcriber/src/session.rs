use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::recognition::{RecognitionEvent, RecognitionSettings, Recognizer};
use crate::relay_client::RelayClient;
use crate::state::{ClientState, StatusKind};

/// Why a session loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The stop token fired.
    Stopped,
    /// The recognizer ran out of events.
    Finished,
    /// The recognizer reported an error.
    Canceled(String),
}

/// Picks the credential for a new session: the subscription key when the
/// relay handed one out, otherwise a freshly issued token.
pub async fn resolve_settings(
    state: &ClientState,
    relay: &RelayClient,
) -> anyhow::Result<RecognitionSettings> {
    let config = state
        .config()
        .context("configuration not loaded")?;
    let use_custom_model = state.use_custom_model();
    if !config.azure_subscription_key.is_empty() {
        return Ok(RecognitionSettings::from_subscription(
            config,
            state.language(),
            use_custom_model,
        ));
    }
    let token = relay.fetch_token().await?;
    Ok(RecognitionSettings::from_token(
        token,
        config,
        state.language(),
        use_custom_model,
    ))
}

/// Runs one recognition session until `stop` fires, the recognizer ends, or it
/// reports an error. The recognizer is always stopped before returning.
/// A rewrite already in flight when `stop` fires is awaited, not abandoned.
pub async fn run_session<R>(
    state: &mut ClientState,
    recognizer: &mut R,
    relay: &RelayClient,
    stop: CancellationToken,
) -> anyhow::Result<SessionEnd>
where
    R: Recognizer + ?Sized,
{
    if !state.is_logged_in() {
        anyhow::bail!("not logged in");
    }
    if state.is_listening() {
        anyhow::bail!("a session is already running");
    }
    if !state.config_ready() {
        state.set_status(
            "Configuration not loaded. Please wait and try again.",
            StatusKind::Error,
        );
        anyhow::bail!("configuration not loaded");
    }

    state.set_status("Connecting to speech service", StatusKind::Info);
    let settings = match resolve_settings(state, relay).await {
        Ok(settings) => settings,
        Err(err) => {
            state.set_status("Error initializing speech recognition", StatusKind::Error);
            return Err(err.context("failed to prepare recognition settings"));
        }
    };
    if let Err(err) = recognizer.start(&settings).await {
        state.set_status("Error starting speech recognition", StatusKind::Error);
        return Err(err.context("failed to start recognizer"));
    }

    state.set_listening(true);
    let model = if settings.uses_custom_model() {
        "Custom Model"
    } else {
        "Standard Model"
    };
    let rewrite = if state.rewrite_enabled() {
        " + Text Rewriting"
    } else {
        ""
    };
    tracing::info!(
        language = %settings.language,
        region = %settings.region,
        custom_model = settings.uses_custom_model(),
        rewrite = state.rewrite_enabled(),
        "recognition session started"
    );
    state.set_status(
        format!("Listening... Speak now! ({model}{rewrite})"),
        StatusKind::Listening,
    );

    let end = loop {
        let next = tokio::select! {
            biased;
            _ = stop.cancelled() => break SessionEnd::Stopped,
            next = recognizer.next_event() => next,
        };
        match next {
            Ok(Some(event)) => handle_event(state, relay, event).await,
            Ok(None) => break SessionEnd::Finished,
            Err(err) => {
                tracing::warn!(error = %err, "recognition canceled");
                state.set_status(format!("Recognition error: {err}"), StatusKind::Error);
                break SessionEnd::Canceled(err.to_string());
            }
        }
    };

    let stopped = recognizer.stop().await;
    state.set_listening(false);
    match stopped {
        Ok(()) => {
            if !matches!(end, SessionEnd::Canceled(_)) {
                state.set_status("Transcription stopped", StatusKind::Stopped);
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to stop recognizer");
            state.set_status("Error stopping recognition", StatusKind::Error);
        }
    }
    tracing::info!(end = ?end, "recognition session ended");
    Ok(end)
}

async fn handle_event(state: &mut ClientState, relay: &RelayClient, event: RecognitionEvent) {
    if !event.is_final {
        state.transcript_mut().show_interim(&event.text);
        return;
    }
    if !state.transcript_mut().push_original(&event.text) {
        return;
    }
    if !state.rewrite_enabled() {
        return;
    }
    let phrases = state.relevant_phrases().to_string();
    let rewritten = match relay.rewrite(&event.text, &phrases).await {
        Ok(rewritten) => rewritten,
        Err(err) => {
            tracing::warn!(error = %err, "rewrite failed, keeping original text");
            state.set_status(
                "Text rewriting service error. Using original text instead.",
                StatusKind::Error,
            );
            event.text.clone()
        }
    };
    state.transcript_mut().push_rewritten(&rewritten);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;
    use crate::prefs::Preferences;
    use crate::recognition::SpeechCredential;
    use crate::state::TranscriptLine;
    use crate::test_utils::{Scripted, ScriptedRecognizer};
    use protocol::{ClientConfig, REWRITE_PATH, SPEECH_TOKEN_PATH};
    use std::time::Duration;

    fn logged_in_state(enable_rewrite: bool, subscription_key: &str) -> ClientState {
        let mut state = ClientState::new(Preferences {
            use_custom_model: true,
            enable_rewrite,
        });
        let auth = StaticCredentials::new([("reader", "lotus")]);
        assert!(state.login(&auth, "reader", "lotus"));
        state.apply_config(ClientConfig {
            azure_subscription_key: subscription_key.to_string(),
            azure_service_region: "eastus".to_string(),
            azure_custom_endpoint_id: "endpoint-1".to_string(),
            ..ClientConfig::default()
        });
        state
    }

    fn events(texts: &[(&str, bool)]) -> Vec<Scripted> {
        texts
            .iter()
            .map(|&(text, is_final)| {
                Scripted::Event(if is_final {
                    RecognitionEvent::finalized(text)
                } else {
                    RecognitionEvent::interim(text)
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn final_segments_are_rewritten_and_rendered() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.path(REWRITE_PATH).body_contains("拉摩本是釋迦牟尼佛");
                then.status(200)
                    .body(r#"{"rewrittenText":"南無本師釋迦牟尼佛"}"#);
            })
            .await;
        let relay = RelayClient::new(server.base_url()).expect("client");
        let mut state = logged_in_state(true, "sub-key");
        let mut recognizer = ScriptedRecognizer::new(events(&[
            ("拉摩", false),
            ("拉摩本是釋迦牟尼佛", true),
            ("拉摩本是釋迦牟尼佛", true),
        ]));

        let end = run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .expect("session");

        assert_eq!(end, SessionEnd::Finished);
        assert_eq!(
            state.transcript().lines(),
            &[
                TranscriptLine::Original("拉摩本是釋迦牟尼佛".to_string()),
                TranscriptLine::Rewritten("南無本師釋迦牟尼佛".to_string()),
            ]
        );
        assert_eq!(mock.hits(), 1);
        assert_eq!(recognizer.stop_calls, 1);
        assert!(!state.is_listening());
        let settings = &recognizer.started_with[0];
        assert_eq!(
            settings.credential,
            SpeechCredential::SubscriptionKey("sub-key".to_string())
        );
        assert_eq!(settings.endpoint_id.as_deref(), Some("endpoint-1"));
    }

    #[tokio::test]
    async fn rewrite_failure_keeps_original_text() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.path(REWRITE_PATH);
                then.status(500)
                    .body(r#"{"error":"Failed to rewrite text on the server."}"#);
            })
            .await;
        let relay = RelayClient::new(server.base_url()).expect("client");
        let mut state = logged_in_state(true, "sub-key");
        let mut recognizer = ScriptedRecognizer::new(events(&[("空性", true)]));

        run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .expect("session");

        assert_eq!(
            state.transcript().lines(),
            &[
                TranscriptLine::Original("空性".to_string()),
                TranscriptLine::Rewritten("空性".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn rewrite_disabled_makes_no_relay_calls() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200).body("{}");
            })
            .await;
        let relay = RelayClient::new(server.base_url()).expect("client");
        let mut state = logged_in_state(false, "sub-key");
        let mut recognizer = ScriptedRecognizer::new(events(&[("眾生", true), ("南無", true)]));

        run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .expect("session");

        assert_eq!(state.transcript().word_count(), 2);
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn missing_subscription_key_uses_issued_token() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path(SPEECH_TOKEN_PATH);
                then.status(200).body(r#"{"token":"abc123","region":"eastus"}"#);
            })
            .await;
        let relay = RelayClient::new(server.base_url()).expect("client");
        let mut state = logged_in_state(false, "");
        let mut recognizer = ScriptedRecognizer::new(Vec::new());

        run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .expect("session");

        assert_eq!(mock.hits(), 1);
        assert_eq!(
            recognizer.started_with[0].credential,
            SpeechCredential::AuthorizationToken("abc123".to_string())
        );
    }

    #[tokio::test]
    async fn stop_token_ends_a_live_session() {
        let relay = RelayClient::new("http://127.0.0.1:1").expect("client");
        let mut state = logged_in_state(false, "sub-key");
        let mut recognizer = ScriptedRecognizer::new(events(&[("眾生", true)]));
        recognizer.hold_open = true;
        let stop = CancellationToken::new();
        let trigger = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let end = tokio::time::timeout(
            Duration::from_secs(5),
            run_session(&mut state, &mut recognizer, &relay, stop),
        )
        .await
        .expect("session returned")
        .expect("session");

        assert_eq!(end, SessionEnd::Stopped);
        assert_eq!(recognizer.stop_calls, 1);
        assert_eq!(state.transcript().word_count(), 1);
        assert_eq!(
            state.status().map(|status| status.kind),
            Some(StatusKind::Stopped)
        );

        recognizer.hold_open = false;
        let end = run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .expect("restart");
        assert_eq!(end, SessionEnd::Finished);
        assert_eq!(recognizer.started_with.len(), 2);
    }

    #[tokio::test]
    async fn recognizer_error_cancels_and_reports() {
        let relay = RelayClient::new("http://127.0.0.1:1").expect("client");
        let mut state = logged_in_state(false, "sub-key");
        let mut script = events(&[("眾生", false)]);
        script.push(Scripted::Fail("network disconnected"));
        let mut recognizer = ScriptedRecognizer::new(script);

        let end = run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .expect("session");

        assert_eq!(end, SessionEnd::Canceled("network disconnected".to_string()));
        assert_eq!(recognizer.stop_calls, 1);
        let status = state.status().expect("status");
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.message.contains("network disconnected"));
    }

    #[tokio::test]
    async fn refuses_to_start_without_login_or_config() {
        let relay = RelayClient::new("http://127.0.0.1:1").expect("client");
        let mut recognizer = ScriptedRecognizer::new(Vec::new());

        let mut state = ClientState::new(Preferences::default());
        assert!(run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .is_err());

        let auth = StaticCredentials::new([("reader", "lotus")]);
        assert!(state.login(&auth, "reader", "lotus"));
        assert!(run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .is_err());
        assert!(recognizer.started_with.is_empty());
        assert_eq!(
            state.status().map(|status| status.kind),
            Some(StatusKind::Error)
        );
    }

    #[tokio::test]
    async fn start_failure_is_reported() {
        let relay = RelayClient::new("http://127.0.0.1:1").expect("client");
        let mut state = logged_in_state(false, "sub-key");
        let mut recognizer = ScriptedRecognizer::new(Vec::new());
        recognizer.fail_start = true;

        let err = run_session(&mut state, &mut recognizer, &relay, CancellationToken::new())
            .await
            .err()
            .expect("expected error");

        assert!(format!("{err:#}").contains("microphone unavailable"));
        assert!(!state.is_listening());
        assert_eq!(recognizer.stop_calls, 0);
    }
}
