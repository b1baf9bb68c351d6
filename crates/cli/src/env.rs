use crate::error::CliError;
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

/// Prefix shared by every variable the import reads.
pub const ENV_PREFIX: &str = "HEADERIMPORT_";

/// Environment variables gathered from the process and optional .env files.
/// Later sources override earlier ones.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    /// Starts from the process environment.
    pub fn from_system() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        let loaded = self.parse_env_content(&content)?;
        debug!(path = %path.display(), loaded, "Loaded env file");
        Ok(())
    }

    /// Only the variables meant for the import.
    pub fn import_vars(&self) -> HashMap<String, String> {
        self.vars
            .iter()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn parse_env_content(&mut self, content: &str) -> Result<usize, CliError> {
        let mut loaded = 0;
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
            loaded += 1;
        }

        Ok(loaded)
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_env() {
        let mut env = EnvManager::default();
        let content = r#"
# Comment
HEADERIMPORT_CHUNK_SIZE=512
export HEADERIMPORT_REPORT_NAME=bench
        "#;

        assert_eq!(env.parse_env_content(content).unwrap(), 2);
        assert_eq!(env.vars.get("HEADERIMPORT_CHUNK_SIZE").unwrap(), "512");
        assert_eq!(env.vars.get("HEADERIMPORT_REPORT_NAME").unwrap(), "bench");
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = EnvManager::default();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
UNQUOTED=no_spaces
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.vars.get("QUOTED").unwrap(), "value with spaces");
        assert_eq!(env.vars.get("SINGLE").unwrap(), "single quoted");
        assert_eq!(env.vars.get("UNQUOTED").unwrap(), "no_spaces");
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = EnvManager::default();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
        assert!(env.parse_env_content("=value").is_err());
    }

    #[test]
    fn file_overrides_and_filters_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "HEADERIMPORT_CHUNK_SIZE=64\nOTHER=1\n").unwrap();

        let mut env = EnvManager::default();
        env.vars
            .insert("HEADERIMPORT_CHUNK_SIZE".to_string(), "8".to_string());
        env.load_from_file(&path).unwrap();

        let vars = env.import_vars();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("HEADERIMPORT_CHUNK_SIZE").unwrap(), "64");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let mut env = EnvManager::default();
        let err = env.load_from_file("/definitely/not/here/.env").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
