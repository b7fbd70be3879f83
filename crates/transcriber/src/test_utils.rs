use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::recognition::{RecognitionEvent, RecognitionSettings, Recognizer};

pub(crate) fn temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{prefix}-{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) enum Scripted {
    Event(RecognitionEvent),
    Fail(&'static str),
}

/// Plays back a fixed script. When the script runs out it either ends the
/// stream or, with `hold_open`, waits forever like a live microphone.
#[derive(Default)]
pub(crate) struct ScriptedRecognizer {
    pub(crate) script: VecDeque<Scripted>,
    pub(crate) hold_open: bool,
    pub(crate) started_with: Vec<RecognitionSettings>,
    pub(crate) stop_calls: usize,
    pub(crate) fail_start: bool,
}

impl ScriptedRecognizer {
    pub(crate) fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn start(&mut self, settings: &RecognitionSettings) -> anyhow::Result<()> {
        if self.fail_start {
            anyhow::bail!("microphone unavailable");
        }
        self.started_with.push(settings.clone());
        Ok(())
    }

    async fn next_event(&mut self) -> anyhow::Result<Option<RecognitionEvent>> {
        match self.script.pop_front() {
            Some(Scripted::Event(event)) => Ok(Some(event)),
            Some(Scripted::Fail(reason)) => Err(anyhow::anyhow!(reason)),
            None if self.hold_open => std::future::pending().await,
            None => Ok(None),
        }
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        self.stop_calls += 1;
        Ok(())
    }
}
