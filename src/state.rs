// src/state.rs
use std::sync::Arc;

use crate::config::{ApiKey, AppConfig};
use crate::services::{
    avatar::{AvatarSynthesizer, HeyGenVideo},
    chatbot::ChatBot,
    completion::{FallbackResponder, OpenAiCompletion},
    lookup::LookupTable,
    metrics_manager::MetricsManager,
    provider::http_client,
    voice::{AudioStore, ElevenLabsSpeech, VoiceSynthesizer},
};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub bot: ChatBot,
    pub metrics: MetricsManager,
    pub admin_key: Option<ApiKey>,
}

impl AppState {
    pub fn new(bot: ChatBot) -> Self {
        Self {
            bot,
            metrics: MetricsManager::new(),
            admin_key: None,
        }
    }

    pub fn with_admin_key(mut self, key: ApiKey) -> Self {
        self.admin_key = Some(key);
        self
    }

    /// Wire the real providers from configuration.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let table = LookupTable::load(&config.responses_path).await?;
        let client = http_client(&config.provider)?;

        if config.completion.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set, lookup misses will get an error reply");
        }
        let completion = OpenAiCompletion::new(
            client.clone(),
            config.completion.clone(),
            config.provider.clone(),
        );
        let mut bot = ChatBot::new(table, FallbackResponder::new(Box::new(completion)));

        match &config.speech {
            Some(speech) => {
                let provider = ElevenLabsSpeech::new(client.clone(), speech.clone(), config.provider.clone());
                let mut store = AudioStore::new(&config.audio_dir, config.public_base_url.clone());
                if let Some(max_age) = config.audio_max_age {
                    store = store.with_max_age(max_age);
                }
                bot = bot.with_voice(VoiceSynthesizer::new(Box::new(provider), store));
                tracing::info!(voice_id = %speech.voice_id, "voice stage enabled");
            }
            None => tracing::info!("voice stage disabled"),
        }

        match &config.video {
            Some(video) => {
                let provider = HeyGenVideo::new(client, video.clone(), config.provider.clone());
                bot = bot.with_avatar(AvatarSynthesizer::new(Box::new(provider), video.source));
                tracing::info!(avatar_id = %video.avatar_id, source = ?video.source, "avatar stage enabled");
            }
            None => tracing::info!("avatar stage disabled"),
        }

        let mut state = Self::new(bot);
        state.admin_key = config.admin_key.clone();
        Ok(state)
    }
}
