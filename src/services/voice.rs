// src/services/voice.rs
use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use super::provider::{check_status, with_retry};
use crate::{
    config::{ProviderSettings, SpeechConfig},
    error::ProviderError,
};

#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Returns encoded audio (mp3).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsSpeech {
    client: Client,
    config: SpeechConfig,
    settings: ProviderSettings,
}

impl ElevenLabsSpeech {
    pub fn new(client: Client, config: SpeechConfig, settings: ProviderSettings) -> Self {
        Self { client, config, settings }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.voice_id
        );
        let body = SpeechRequest {
            text,
            model_id: &self.config.model_id,
        };
        let (client, url, body, key) = (&self.client, &url, &body, &self.config.api_key);

        let resp = with_retry(&self.settings, "elevenlabs", move || async move {
            let resp = client
                .post(url)
                .header("xi-api-key", key.expose())
                .header(reqwest::header::ACCEPT, "audio/mpeg")
                .json(body)
                .send()
                .await?;
            check_status(resp).await
        })
        .await?;

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(ProviderError::InvalidResponse("empty audio payload".into()));
        }
        Ok(bytes.to_vec())
    }
}

/// Where generated audio lands and how it is addressed from outside.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
    public_base_url: Option<String>,
    max_age: Option<Duration>,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url,
            max_age: None,
        }
    }

    /// Remove stored audio older than `max_age` whenever new audio is saved.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Write the audio under a fresh name and return its URL.
    pub async fn save(&self, audio: &[u8]) -> Result<String, ProviderError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}.mp3", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&file_name), audio).await?;

        if let Some(max_age) = self.max_age {
            match self.prune(max_age, &file_name).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "pruned old audio files"),
                Err(e) => tracing::warn!(error = %e, "could not prune old audio files"),
            }
        }

        let relative = format!("/audio/{file_name}");
        Ok(match &self.public_base_url {
            Some(base) => format!("{base}{relative}"),
            None => relative,
        })
    }
}

impl AudioStore {
    async fn prune(&self, max_age: Duration, keep: &str) -> std::io::Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_name() == keep || path.extension().is_none_or(|ext| ext != "mp3") {
                continue;
            }
            let expired = entry
                .metadata()
                .await?
                .modified()?
                .elapsed()
                .is_ok_and(|age| age >= max_age);
            if expired {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Optional voice stage. Failures are logged and yield `None`.
pub struct VoiceSynthesizer {
    provider: Box<dyn SpeechProvider>,
    store: AudioStore,
}

impl VoiceSynthesizer {
    pub fn new(provider: Box<dyn SpeechProvider>, store: AudioStore) -> Self {
        Self { provider, store }
    }

    pub async fn synthesize(&self, text: &str) -> Option<String> {
        let stored = match self.provider.synthesize(text).await {
            Ok(audio) => self.store.save(&audio).await,
            Err(e) => Err(e),
        };
        match stored {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, "voice synthesis failed, replying without audio");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn each_save_gets_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = AudioStore::new(dir.path(), None);

        let first = store.save(b"one").await.unwrap();
        let second = store.save(b"two").await.unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("/audio/") && first.ends_with(".mp3"));

        let name = first.trim_start_matches("/audio/");
        assert_eq!(std::fs::read(dir.path().join(name)).unwrap(), b"one");
    }

    #[tokio::test]
    async fn expired_audio_is_removed_on_save() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.mp3"), b"old").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        let store = AudioStore::new(dir.path(), None).with_max_age(Duration::ZERO);
        let url = store.save(b"new").await.unwrap();

        assert!(!dir.path().join("old.mp3").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join(url.trim_start_matches("/audio/")).exists());
    }

    #[tokio::test]
    async fn recent_audio_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("recent.mp3"), b"recent").unwrap();

        let store = AudioStore::new(dir.path(), None).with_max_age(Duration::from_secs(3600));
        store.save(b"new").await.unwrap();

        assert!(dir.path().join("recent.mp3").exists());
    }

    #[tokio::test]
    async fn public_base_url_is_prefixed() {
        let dir = tempfile::tempdir().unwrap();
        let store = AudioStore::new(dir.path(), Some("https://bot.example.com".into()));
        let url = store.save(b"x").await.unwrap();
        assert!(url.starts_with("https://bot.example.com/audio/"));
    }
}
