use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use lps_core::EngineSettings;
use sqlx::PgPool;

use crate::ApiConfig;

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub cookie_key: Key,
    pub settings: Arc<EngineSettings>,
}

impl ApiState {
    pub fn new(config: &ApiConfig, pool: PgPool) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            cookie_key: Key::from(config.cookie_secret.as_bytes()),
            settings: Arc::new(config.engine_settings()),
        }
    }
}

/// Configuration needed by the [`AuthUser`](crate::auth::AuthUser) extractor
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            jwt_secret: state.jwt_secret.clone(),
        }
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}
