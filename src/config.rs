// src/config.rs
use std::{fmt, path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be set {reason}")]
    Required {
        key: &'static str,
        reason: &'static str,
    },
}

/// Provider credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// What the avatar video stage is fed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AvatarSource {
    #[default]
    Audio,
    Text,
}

#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompletionConfig {
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct SpeechConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub voice_id: String,
    pub model_id: String,
}

#[derive(Clone, Debug)]
pub struct VideoConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub avatar_id: String,
    pub voice_id: Option<String>,
    pub source: AvatarSource,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub responses_path: PathBuf,
    pub audio_dir: PathBuf,
    /// Stored audio older than this is removed. `None` keeps everything.
    pub audio_max_age: Option<Duration>,
    pub public_base_url: Option<String>,
    pub admin_key: Option<ApiKey>,
    pub provider: ProviderSettings,
    pub completion: CompletionConfig,
    /// `None` disables the voice stage.
    pub speech: Option<SpeechConfig>,
    /// `None` disables the avatar video stage.
    pub video: Option<VideoConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port = parse_or(get("PORT"), "PORT", 5000u16)?;
        let timeout_secs = parse_or(get("PROVIDER_TIMEOUT_SECS"), "PROVIDER_TIMEOUT_SECS", 30u64)?;
        let max_retries = parse_or(get("PROVIDER_MAX_RETRIES"), "PROVIDER_MAX_RETRIES", 1u32)?;
        let audio_max_age_secs = parse_or(get("AUDIO_MAX_AGE_SECS"), "AUDIO_MAX_AGE_SECS", 86_400u64)?;
        let public_base_url = get("PUBLIC_BASE_URL").map(|u| u.trim_end_matches('/').to_string());

        let source = match get("AVATAR_SOURCE").as_deref().map(str::to_ascii_lowercase) {
            None => AvatarSource::default(),
            Some(v) if v == "audio" => AvatarSource::Audio,
            Some(v) if v == "text" => AvatarSource::Text,
            Some(v) => {
                return Err(ConfigError::Invalid { key: "AVATAR_SOURCE", value: v });
            }
        };

        let speech = get("ELEVENLABS_API_KEY").map(|key| SpeechConfig {
            api_key: ApiKey::new(key),
            base_url: or("ELEVENLABS_BASE_URL", "https://api.elevenlabs.io"),
            voice_id: or("ELEVENLABS_VOICE_ID", "21m00Tcm4TlvDq8Ikwam"),
            model_id: or("ELEVENLABS_MODEL_ID", "eleven_monolingual_v1"),
        });

        let video = match (get("HEYGEN_API_KEY"), get("HEYGEN_AVATAR_ID")) {
            (Some(key), Some(avatar_id)) => {
                let voice_id = get("HEYGEN_VOICE_ID");
                match source {
                    // HeyGen fetches the audio itself, so the URL must be absolute.
                    AvatarSource::Audio if public_base_url.is_none() => {
                        return Err(ConfigError::Required {
                            key: "PUBLIC_BASE_URL",
                            reason: "when the avatar is driven by generated audio",
                        });
                    }
                    AvatarSource::Text if voice_id.is_none() => {
                        return Err(ConfigError::Required {
                            key: "HEYGEN_VOICE_ID",
                            reason: "when the avatar speaks the reply text",
                        });
                    }
                    _ => {}
                }
                Some(VideoConfig {
                    api_key: ApiKey::new(key),
                    base_url: or("HEYGEN_BASE_URL", "https://api.heygen.com"),
                    avatar_id,
                    voice_id,
                    source,
                })
            }
            _ => None,
        };

        Ok(Self {
            host: or("HOST", "0.0.0.0"),
            port,
            responses_path: PathBuf::from(or("RESPONSES_PATH", "responses.json")),
            audio_dir: PathBuf::from(or("AUDIO_DIR", "public/audio")),
            audio_max_age: (audio_max_age_secs > 0).then(|| Duration::from_secs(audio_max_age_secs)),
            public_base_url,
            admin_key: get("ADMIN_API_KEY").map(ApiKey::new),
            provider: ProviderSettings {
                timeout: Duration::from_secs(timeout_secs),
                max_retries,
                ..ProviderSettings::default()
            },
            completion: CompletionConfig {
                api_key: get("OPENAI_API_KEY").map(ApiKey::new),
                base_url: or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                model: or("OPENAI_MODEL", "gpt-4"),
            },
            speech,
            video,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.responses_path, PathBuf::from("responses.json"));
        assert_eq!(cfg.completion.model, "gpt-4");
        assert!(cfg.completion.api_key.is_none());
        assert!(cfg.speech.is_none());
        assert!(cfg.video.is_none());
        assert_eq!(cfg.provider.max_retries, 1);
        assert_eq!(cfg.provider.timeout, Duration::from_secs(30));
    }

    #[test]
    fn video_needs_key_and_avatar() {
        let cfg = config_from(&[("HEYGEN_API_KEY", "k")]).unwrap();
        assert!(cfg.video.is_none());

        let cfg = config_from(&[
            ("HEYGEN_API_KEY", "k"),
            ("HEYGEN_AVATAR_ID", "anna"),
            ("HEYGEN_VOICE_ID", "v1"),
            ("AVATAR_SOURCE", "Text"),
        ])
        .unwrap();
        let video = cfg.video.unwrap();
        assert_eq!(video.avatar_id, "anna");
        assert_eq!(video.source, AvatarSource::Text);
        assert_eq!(video.voice_id.as_deref(), Some("v1"));
    }

    #[test]
    fn text_driven_video_needs_voice_id() {
        let err = config_from(&[
            ("HEYGEN_API_KEY", "k"),
            ("HEYGEN_AVATAR_ID", "anna"),
            ("AVATAR_SOURCE", "text"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Required { key: "HEYGEN_VOICE_ID", .. }));
    }

    #[test]
    fn audio_driven_video_needs_public_base_url() {
        let vars = [
            ("HEYGEN_API_KEY", "k"),
            ("HEYGEN_AVATAR_ID", "anna"),
            ("ELEVENLABS_API_KEY", "xi"),
        ];
        let err = config_from(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Required { key: "PUBLIC_BASE_URL", .. }));

        let mut with_base = vars.to_vec();
        with_base.push(("PUBLIC_BASE_URL", "https://bot.example.com"));
        let video = config_from(&with_base).unwrap().video.unwrap();
        assert_eq!(video.source, AvatarSource::Audio);
        assert!(video.voice_id.is_none());
    }

    #[test]
    fn audio_max_age_zero_disables_cleanup() {
        assert_eq!(
            config_from(&[]).unwrap().audio_max_age,
            Some(Duration::from_secs(86_400))
        );
        assert!(config_from(&[("AUDIO_MAX_AGE_SECS", "0")]).unwrap().audio_max_age.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("AVATAR_SOURCE", "hologram")]).is_err());
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let cfg = config_from(&[("OPENAI_API_KEY", "sk-secret"), ("ELEVENLABS_API_KEY", "xi-secret")])
            .unwrap();
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(!printed.contains("xi-secret"));
    }

    #[test]
    fn public_base_url_loses_trailing_slash() {
        let cfg = config_from(&[("PUBLIC_BASE_URL", "https://bot.example.com/")]).unwrap();
        assert_eq!(cfg.public_base_url.as_deref(), Some("https://bot.example.com"));
    }
}
