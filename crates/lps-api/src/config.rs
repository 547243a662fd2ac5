use lps_core::{
    EngineSettings,
    grouping::GroupNameLocale,
    settings::{BaseMinutes, SettingsError},
};
use serde::Deserialize;
use thiserror::Error;

/// Minimum length of the cookie secret, the size of a cookie `Key` master.
const MIN_COOKIE_SECRET_LEN: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),
    #[error("COOKIE_SECRET must be at least {} bytes long", MIN_COOKIE_SECRET_LEN)]
    CookieSecretTooShort,
    #[error("invalid engine settings: {0}")]
    Settings(#[from] SettingsError),
}

/// Service configuration, read from environment variables of the same name
/// in upper case (`DATABASE_URL`, `SESSION_GAP_MINUTES`, ...).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub cookie_secret: String,
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Comma separated list of origins allowed by CORS
    #[serde(default)]
    pub allowed_origins: Option<String>,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_tz_offset_minutes")]
    pub tz_offset_minutes: i32,
    #[serde(default = "default_session_gap_minutes")]
    pub session_gap_minutes: i64,
    #[serde(default = "default_word_base_minutes")]
    pub word_base_minutes: i64,
    #[serde(default = "default_sentence_base_minutes")]
    pub sentence_base_minutes: i64,
    #[serde(default = "default_shadowing_base_minutes")]
    pub shadowing_base_minutes: i64,
    #[serde(default = "default_min_checkin_minutes")]
    pub min_checkin_minutes: i64,
    #[serde(default = "default_group_bucket_size")]
    pub group_bucket_size: usize,
    #[serde(default)]
    pub group_name_locale: GroupNameLocale,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

const fn default_db_max_connections() -> u32 {
    10
}

const fn default_tz_offset_minutes() -> i32 {
    8 * 60
}

const fn default_session_gap_minutes() -> i64 {
    5
}

const fn default_word_base_minutes() -> i64 {
    1
}

const fn default_sentence_base_minutes() -> i64 {
    2
}

const fn default_shadowing_base_minutes() -> i64 {
    3
}

const fn default_min_checkin_minutes() -> i64 {
    10
}

const fn default_group_bucket_size() -> usize {
    20
}

impl ApiConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(ConfigError::CookieSecretTooShort);
        }
        self.engine_settings().validate()?;
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            session_gap_minutes: self.session_gap_minutes,
            base_minutes: BaseMinutes {
                word: self.word_base_minutes,
                sentence: self.sentence_base_minutes,
                shadowing: self.shadowing_base_minutes,
            },
            min_checkin_minutes: self.min_checkin_minutes,
            bucket_size: self.group_bucket_size,
            group_name_locale: self.group_name_locale,
            utc_offset_minutes: self.tz_offset_minutes,
        }
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }
}
