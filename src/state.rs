use std::sync::Arc;

use crate::{ai::TextGenerator, config::Config};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub ai: Arc<dyn TextGenerator>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn TextGenerator> {
    fn from_ref(state: &AppState) -> Self {
        state.ai.clone()
    }
}
