use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use tether::IndicatorConfig;
use tether::log::warn;

/// Local storage key holding indicator overrides as JSON, e.g. `{"firstDelay": 0}`.
pub const INDICATOR_CONFIG_KEY: &str = "tether.indicator";

pub fn load_indicator_config() -> IndicatorConfig {
    match LocalStorage::get::<IndicatorConfig>(INDICATOR_CONFIG_KEY) {
        Ok(config) => config,
        Err(StorageError::KeyNotFound(_)) => IndicatorConfig::default(),
        Err(err) => {
            warn!(error = %err, "Ignoring invalid indicator configuration");
            IndicatorConfig::default()
        }
    }
}
