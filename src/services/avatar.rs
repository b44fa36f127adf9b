// src/services/avatar.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use super::provider::{check_status, with_retry};
use crate::{
    config::{AvatarSource, ProviderSettings, VideoConfig},
    error::ProviderError,
};

/// What the avatar speaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoInput {
    Text(String),
    AudioUrl(String),
}

#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Returns the URL of the generated video.
    async fn generate(&self, input: &VideoInput) -> Result<String, ProviderError>;
}

#[derive(Deserialize)]
struct VideoResponse {
    video_url: Option<String>,
    data: Option<VideoData>,
}

#[derive(Deserialize)]
struct VideoData {
    video_url: Option<String>,
}

/// HeyGen talking-avatar client.
pub struct HeyGenVideo {
    client: Client,
    config: VideoConfig,
    settings: ProviderSettings,
}

impl HeyGenVideo {
    pub fn new(client: Client, config: VideoConfig, settings: ProviderSettings) -> Self {
        Self { client, config, settings }
    }

    fn request_body(&self, input: &VideoInput) -> Value {
        let voice = match input {
            VideoInput::Text(text) => json!({
                "type": "text",
                "input_text": text,
                "voice_id": self.config.voice_id,
            }),
            VideoInput::AudioUrl(url) => json!({
                "type": "audio",
                "audio_url": url,
            }),
        };
        json!({
            "video_inputs": [{
                "character": {
                    "type": "avatar",
                    "avatar_id": self.config.avatar_id,
                    "avatar_style": "normal",
                },
                "voice": voice,
            }],
        })
    }
}

#[async_trait]
impl VideoProvider for HeyGenVideo {
    async fn generate(&self, input: &VideoInput) -> Result<String, ProviderError> {
        let url = format!("{}/v2/video/generate", self.config.base_url.trim_end_matches('/'));
        let body = self.request_body(input);
        let (client, url, body, key) = (&self.client, &url, &body, &self.config.api_key);

        let resp = with_retry(&self.settings, "heygen", move || async move {
            let resp = client
                .post(url)
                .bearer_auth(key.expose())
                .json(body)
                .send()
                .await?;
            check_status(resp).await
        })
        .await?;

        let data: VideoResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        data.video_url
            .or_else(|| data.data.and_then(|d| d.video_url))
            .ok_or_else(|| ProviderError::InvalidResponse("response carries no video_url".into()))
    }
}

/// Optional avatar stage. Failures are logged and yield `None`.
pub struct AvatarSynthesizer {
    provider: Box<dyn VideoProvider>,
    source: AvatarSource,
}

impl AvatarSynthesizer {
    pub fn new(provider: Box<dyn VideoProvider>, source: AvatarSource) -> Self {
        Self { provider, source }
    }

    /// Pick the input for this stage, or `None` when it should be skipped.
    pub fn input_for(&self, reply: &str, voice_url: Option<&str>) -> Option<VideoInput> {
        match self.source {
            AvatarSource::Text => Some(VideoInput::Text(reply.to_string())),
            AvatarSource::Audio => voice_url.map(|url| VideoInput::AudioUrl(url.to_string())),
        }
    }

    pub async fn synthesize(&self, input: &VideoInput) -> Option<String> {
        match self.provider.generate(input).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, "avatar video generation failed, replying without video");
                None
            }
        }
    }
}
