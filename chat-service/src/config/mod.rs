use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Suffixes accepted for upload, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "pdf", "txt"];

/// Default request body cap (10MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub uploads: UploadSettings,
    pub static_dir: PathBuf,
}

#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub models: ModelSettings,
    /// Upper bound on one generateContent call.
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// Model for image prompts (e.g., gemini-1.5-pro)
    pub multimodal_model: String,
    /// Model for text prompts (e.g., gemini-2.0-flash)
    pub text_model: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            multimodal_model: "gemini-1.5-pro".to_string(),
            text_model: "gemini-2.0-flash".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Scratch directory holding an upload for the lifetime of its request.
    pub folder: PathBuf,
    pub max_bytes: usize,
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = ModelSettings::default();

        Ok(ChatConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: Secret::new(get_env("GEMINI_API_KEY", None, is_prod)?),
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
                models: ModelSettings {
                    multimodal_model: get_env(
                        "GEMINI_MULTIMODAL_MODEL",
                        Some(&defaults.multimodal_model),
                        is_prod,
                    )?,
                    text_model: get_env("GEMINI_TEXT_MODEL", Some(&defaults.text_model), is_prod)?,
                },
                timeout: Duration::from_secs(parse_env(
                    "GEMINI_TIMEOUT_SECS",
                    DEFAULT_TIMEOUT_SECS,
                    is_prod,
                )?),
            },
            uploads: UploadSettings {
                folder: get_env("UPLOAD_FOLDER", Some("uploads"), is_prod)?.into(),
                max_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES, is_prod)?,
            },
            static_dir: get_env("STATIC_DIR", Some("chat-service/static"), is_prod)?.into(),
        })
    }
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr + ToString,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(&default.to_string()), is_prod)?
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{} is not valid: {}", key, e)))
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_key_is_a_config_error() {
        let err = get_env("CHAT_SERVICE_TEST_UNSET_KEY", None, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: CHAT_SERVICE_TEST_UNSET_KEY is required but not set"
        );
    }

    #[test]
    fn production_refuses_defaults() {
        let err = get_env("CHAT_SERVICE_TEST_UNSET_KEY", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn parse_env_uses_default_and_rejects_garbage() {
        assert_eq!(parse_env("CHAT_SERVICE_TEST_UNSET_NUM", 42u64, false).unwrap(), 42);

        std::env::set_var("CHAT_SERVICE_TEST_BAD_NUM", "forty-two");
        let err = parse_env("CHAT_SERVICE_TEST_BAD_NUM", 1u64, false).unwrap_err();
        assert!(err.to_string().contains("CHAT_SERVICE_TEST_BAD_NUM is not valid"));
    }
}
