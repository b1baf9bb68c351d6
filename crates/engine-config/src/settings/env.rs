use crate::{error::SettingsError, settings::validated::ImportSettingsBuilder};
use std::{collections::HashMap, str::FromStr};
use tracing::debug;

pub const ENV_CHUNK_SIZE: &str = "HEADERIMPORT_CHUNK_SIZE";
pub const ENV_CHANNEL_CAPACITY: &str = "HEADERIMPORT_CHANNEL_CAPACITY";
pub const ENV_VALIDATION_CONCURRENCY: &str = "HEADERIMPORT_VALIDATION_CONCURRENCY";
pub const ENV_SEAL_CHECK_INTERVAL: &str = "HEADERIMPORT_SEAL_CHECK_INTERVAL";
pub const ENV_REPORT_DIR: &str = "HEADERIMPORT_REPORT_DIR";
pub const ENV_REPORT_NAME: &str = "HEADERIMPORT_REPORT_NAME";

fn parse<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    expected: &'static str,
) -> Result<Option<T>, SettingsError> {
    let Some(raw) = vars.get(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| SettingsError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            expected,
        })
}

impl ImportSettingsBuilder {
    /// Overlays values found in `vars`; keys that are absent keep the current
    /// builder value.
    pub fn apply_env(mut self, vars: &HashMap<String, String>) -> Result<Self, SettingsError> {
        if let Some(v) = parse::<usize>(vars, ENV_CHUNK_SIZE, "a positive integer")? {
            self.chunk_size = Some(v);
        }
        if let Some(v) = parse::<usize>(vars, ENV_CHANNEL_CAPACITY, "a positive integer")? {
            self.channel_capacity = Some(v);
        }
        if let Some(v) = parse::<usize>(vars, ENV_VALIDATION_CONCURRENCY, "a positive integer")? {
            self.validation_concurrency = Some(v);
        }
        if let Some(v) = parse::<usize>(vars, ENV_SEAL_CHECK_INTERVAL, "a positive integer")? {
            self.seal_check_interval = Some(v);
        }
        if let Some(dir) = vars.get(ENV_REPORT_DIR) {
            self.report_dir = Some(dir.into());
        }
        if let Some(name) = vars.get(ENV_REPORT_NAME) {
            self.report_name = Some(name.clone());
        }

        debug!(?self, "Applied environment overrides");
        Ok(self)
    }
}
