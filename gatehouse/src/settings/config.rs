use config::{Config, ConfigError, Environment, File};
use gatehouse_core::settings::{api_server::ApiServer, store::StoreSettings};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
#[allow(unused)]
pub struct Settings {
    pub debug: bool,
    pub telemetry: Option<String>,
    pub api: ApiServer,
    #[serde(default)]
    pub store: StoreSettings,
}

impl Settings {
    pub fn get_environment() -> Environment {
        Environment::default()
            .prefix("GATEHOUSE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("GATEHOUSE_RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("debug", false)?
            .set_default("api.bind_address", "0.0.0.0:21380")?
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Self::get_environment());

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        // Special strings allow disabling telemetry via environment variables,
        // even if it is set in the default config
        settings.telemetry = settings.check_if_optional(&settings.telemetry);
        Ok(settings)
    }

    pub fn traces_enabled(&self) -> bool {
        self.telemetry
            .as_ref()
            .map(|settings| settings.to_lowercase().split(',').any(|s| s.trim() == "traces"))
            .unwrap_or(false)
    }

    fn check_if_optional(&self, s: &Option<String>) -> Option<String> {
        match s {
            None => None,
            Some(s) => match s.to_lowercase().as_str() {
                "no" | "false" | "0" => None,
                _ => Some(s.to_string()),
            },
        }
    }
}
