// src/services/mod.rs
pub mod avatar;
pub mod chatbot;
pub mod completion;
pub mod lookup;
pub mod metrics_manager;
pub mod provider;
pub mod voice;
