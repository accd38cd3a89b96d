use std::sync::Arc;

use gatehouse_core::service::AuthorizationService;
use tracing::info;

use crate::settings::config::Settings;
use crate::stop_flag;

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub stop_flag: stop_flag::StopFlag,
    pub auth_service: Arc<AuthorizationService>,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    /// Opens the configured store, seeding it when requested.
    pub async fn with_settings(
        settings: Settings,
        stop_flag: stop_flag::StopFlag,
    ) -> anyhow::Result<SharedAppState> {
        let auth_service = Arc::new(AuthorizationService::from_settings(&settings.store).await?);
        info!("Authorization service ready");

        Ok(Arc::new(AppState {
            settings,
            stop_flag,
            auth_service,
        }))
    }

    pub async fn new_for_config_only() -> anyhow::Result<SharedAppState> {
        let settings = Settings::new()?;

        Ok(Arc::new(AppState {
            settings,
            stop_flag: stop_flag::StopFlag::new(),
            auth_service: Arc::new(AuthorizationService::new(Arc::new(
                gatehouse_core::store::MemoryStore::new(),
            ))),
        }))
    }
}
