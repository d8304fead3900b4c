//! Vendor credentials and endpoints, read once at startup.
//!
//! Nothing here is validated: a missing key is kept as an empty string and
//! surfaces as the vendor's own authentication failure when a call is made.

use std::env;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

#[derive(Clone, Debug)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    /// Base URL for the HTTP streaming endpoint.
    pub api_url: String,
    /// Base URL for the input-streaming WebSocket.
    pub ws_url: String,
}

impl ElevenLabsConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_or("ELEVEN_LABS_API_KEY", ""),
            voice_id: env_or("ELEVEN_LABS_VOICE_ID", "21m00Tcm4TlvDq8ikWAM"),
            model_id: env_or("ELEVEN_LABS_MODEL_ID", "eleven_turbo_v2"),
            api_url: env_or("ELEVEN_LABS_API_URL", "https://api.elevenlabs.io"),
            ws_url: env_or("ELEVEN_LABS_WS_URL", "wss://api.elevenlabs.io"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlayHtConfig {
    pub user_id: String,
    pub api_key: String,
    pub voice: String,
    /// One of PlayHT's quality presets; the benchmarks use `faster`.
    pub quality: String,
    pub api_url: String,
}

impl PlayHtConfig {
    pub fn from_env() -> Self {
        Self {
            user_id: env_or("PLAY_HT_USER_ID", ""),
            api_key: env_or("PLAY_HT_API_KEY", ""),
            voice: env_or(
                "PLAY_HT_VOICE",
                "s3://voice-cloning-zero-shot/801a663f-efd0-4254-98d0-5c175514c3e8/jennifer/manifest.json",
            ),
            quality: env_or("PLAY_HT_QUALITY", "faster"),
            api_url: env_or("PLAY_HT_API_URL", "https://api.play.ht"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OpenAiTtsConfig {
    pub api_key: String,
    pub model: String,
    pub voice: String,
    pub api_url: String,
}

impl OpenAiTtsConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_or("OPENAI_API_KEY", ""),
            model: env_or("OPENAI_TTS_MODEL", "tts-1"),
            voice: env_or("OPENAI_TTS_VOICE", "alloy"),
            api_url: env_or("OPENAI_API_URL", "https://api.openai.com"),
        }
    }
}

/// Settings for every integrated vendor.
#[derive(Clone, Debug)]
pub struct VendorConfig {
    pub eleven_labs: ElevenLabsConfig,
    pub play_ht: PlayHtConfig,
    pub openai: OpenAiTtsConfig,
}

impl VendorConfig {
    pub fn from_env() -> Self {
        Self {
            eleven_labs: ElevenLabsConfig::from_env(),
            play_ht: PlayHtConfig::from_env(),
            openai: OpenAiTtsConfig::from_env(),
        }
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
