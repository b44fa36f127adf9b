//! In-process stand-ins for the outbound providers.
#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use avatar_chatbot::{
    error::ProviderError,
    services::{
        avatar::{VideoInput, VideoProvider},
        completion::CompletionProvider,
        voice::SpeechProvider,
    },
};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FakeCompletion {
    reply: Option<String>,
    pub calls: CallCounter,
}

impl FakeCompletion {
    pub fn replying(text: &str) -> Self {
        Self { reply: Some(text.to_string()), calls: CallCounter::default() }
    }

    pub fn failing() -> Self {
        Self { reply: None, calls: CallCounter::default() }
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, _message: &str) -> Result<String, ProviderError> {
        self.calls.hit();
        self.reply.clone().ok_or(ProviderError::Status {
            status: 500,
            body: "upstream exploded".into(),
        })
    }
}

pub struct PanickingCompletion;

#[async_trait]
impl CompletionProvider for PanickingCompletion {
    async fn complete(&self, _message: &str) -> Result<String, ProviderError> {
        panic!("completion adapter bug");
    }
}

pub struct FakeSpeech {
    succeed: bool,
    pub calls: CallCounter,
}

impl FakeSpeech {
    pub fn working() -> Self {
        Self { succeed: true, calls: CallCounter::default() }
    }

    pub fn failing() -> Self {
        Self { succeed: false, calls: CallCounter::default() }
    }
}

#[async_trait]
impl SpeechProvider for FakeSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.hit();
        if self.succeed {
            Ok(format!("mp3:{text}").into_bytes())
        } else {
            Err(ProviderError::Status { status: 401, body: "bad key".into() })
        }
    }
}

pub struct FakeVideo {
    succeed: bool,
    pub calls: CallCounter,
    pub inputs: Arc<Mutex<Vec<VideoInput>>>,
}

impl FakeVideo {
    pub fn working() -> Self {
        Self { succeed: true, calls: CallCounter::default(), inputs: Arc::default() }
    }

    pub fn failing() -> Self {
        Self { succeed: false, calls: CallCounter::default(), inputs: Arc::default() }
    }
}

#[async_trait]
impl VideoProvider for FakeVideo {
    async fn generate(&self, input: &VideoInput) -> Result<String, ProviderError> {
        self.calls.hit();
        self.inputs.lock().await.push(input.clone());
        if self.succeed {
            Ok("https://videos.example.com/v/42.mp4".to_string())
        } else {
            Err(ProviderError::InvalidResponse("response carries no video_url".into()))
        }
    }
}
