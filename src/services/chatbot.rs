// src/services/chatbot.rs
use super::{
    avatar::AvatarSynthesizer,
    completion::{FallbackOutcome, FallbackResponder},
    lookup::LookupTable,
    metrics_manager::MetricsManager,
    voice::VoiceSynthesizer,
};
use crate::message::ChatResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Lookup,
    Completion,
    CompletionError,
}

impl ReplySource {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplySource::Lookup => "lookup",
            ReplySource::Completion => "completion",
            ReplySource::CompletionError => "completion_error",
        }
    }
}

/// Lookup, fallback completion, then the optional voice and video stages.
pub struct ChatBot {
    table: LookupTable,
    responder: FallbackResponder,
    voice: Option<VoiceSynthesizer>,
    avatar: Option<AvatarSynthesizer>,
}

impl ChatBot {
    pub fn new(table: LookupTable, responder: FallbackResponder) -> Self {
        Self {
            table,
            responder,
            voice: None,
            avatar: None,
        }
    }

    pub fn with_voice(mut self, voice: VoiceSynthesizer) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn with_avatar(mut self, avatar: AvatarSynthesizer) -> Self {
        self.avatar = Some(avatar);
        self
    }

    /// Text reply only, no artifacts.
    pub async fn answer(&self, message: &str) -> (String, ReplySource) {
        if let Some(reply) = self.table.lookup(message) {
            return (reply.to_string(), ReplySource::Lookup);
        }
        match self.responder.respond(message).await {
            (reply, FallbackOutcome::Completed) => (reply, ReplySource::Completion),
            (reply, FallbackOutcome::Failed) => (reply, ReplySource::CompletionError),
        }
    }

    pub async fn generate_reply(&self, message: &str, metrics: &MetricsManager) -> ChatResponse {
        let (reply, source) = self.answer(message).await;
        tracing::debug!(source = source.as_str(), "reply resolved");
        metrics.increment_source(source.as_str()).await;

        let mut response = ChatResponse::text(reply);

        if let Some(voice) = &self.voice {
            response.voice_url = voice.synthesize(&response.reply).await;
            record(metrics, "voice", response.voice_url.is_some()).await;
        }

        if let Some(avatar) = &self.avatar {
            // Audio-driven avatars are skipped when there is no audio.
            if let Some(input) = avatar.input_for(&response.reply, response.voice_url.as_deref()) {
                response.video_url = avatar.synthesize(&input).await;
                record(metrics, "video", response.video_url.is_some()).await;
            }
        }

        response
    }
}

async fn record(metrics: &MetricsManager, stage: &str, produced: bool) {
    if produced {
        metrics.increment_artifact(stage).await;
    } else {
        metrics.increment_failure(stage).await;
    }
}
