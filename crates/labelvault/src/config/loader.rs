use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Upper bound on `lookbackDays`; matches the schema's `maximum`.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let mut config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;
    expand_paths(&mut config);

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let archive = &config.archive;
    if archive.labels.is_empty() {
        return Err(ConfigError::Validation {
            message: "At least one label must be configured".to_string(),
        });
    }
    if let Some(blank) = archive.labels.iter().position(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: format!("Label #{} is blank", blank + 1),
        });
    }
    if archive.lookback_days == 0 || archive.lookback_days > MAX_LOOKBACK_DAYS {
        return Err(ConfigError::Validation {
            message: format!(
                "lookbackDays must be between 1 and {}, got {}",
                MAX_LOOKBACK_DAYS, archive.lookback_days
            ),
        });
    }
    if config.schedule.interval_minutes == 0 {
        return Err(ConfigError::Validation {
            message: "intervalMinutes must be greater than zero".to_string(),
        });
    }
    if config.renderer.program.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "Renderer program must not be blank".to_string(),
        });
    }

    Ok(())
}

fn expand_paths(config: &mut Config) {
    config.mailbox.spool_directory = expand_home(&config.mailbox.spool_directory);
    config.storage.root_directory = expand_home(&config.storage.root_directory);
    config.state.database_path = expand_home(&config.state.database_path);
}

/// Expands a leading `~` to the current user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let config = load_config_from_str(r#"{"version": "1.0"}"#).unwrap();
        assert_eq!(config.archive.labels, vec!["PDF"]);
        assert!(!config.mailbox.spool_directory.starts_with("~"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"version": "1.0", "archive": {{"labels": ["PDF", "Factures"], "simulation": true}}}}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.archive.labels, vec!["PDF", "Factures"]);
        assert!(config.archive.simulation);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/labelvault.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_schema_rejects_unknown_field() {
        let result = load_config_from_str(r#"{"version": "1.0", "mystery": 1}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_schema_rejects_wrong_version() {
        let result = load_config_from_str(r#"{"version": "2.0"}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_schema_rejects_empty_label_list() {
        let result = load_config_from_str(r#"{"version": "1.0", "archive": {"labels": []}}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_schema_rejects_zero_lookback() {
        let result =
            load_config_from_str(r#"{"version": "1.0", "archive": {"lookbackDays": 0}}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_schema_rejects_huge_lookback() {
        let result =
            load_config_from_str(r#"{"version": "1.0", "archive": {"lookbackDays": 200000000}}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_validate_config_checks_lookback_bound() {
        let mut config = Config::default();
        config.archive.lookback_days = MAX_LOOKBACK_DAYS + 1;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation { .. })
        ));

        config.archive.lookback_days = MAX_LOOKBACK_DAYS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_blank_label() {
        let result = load_config_from_str(r#"{"version": "1.0", "archive": {"labels": ["PDF", "  "]}}"#);
        match result {
            Err(ConfigError::Validation { message }) => assert!(message.contains("#2")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_config_checks_interval() {
        let mut config = Config::default();
        config.schedule.interval_minutes = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        let path = Path::new("/var/lib/labelvault");
        assert_eq!(expand_home(path), path.to_path_buf());
    }

    #[test]
    #[serial]
    fn test_expand_home_uses_home_directory() {
        let home = tempfile::tempdir().unwrap();
        let previous = std::env::var_os("HOME");
        std::env::set_var("HOME", home.path());

        let expanded = expand_home(Path::new("~/.labelvault/spool"));

        match previous {
            Some(value) => std::env::set_var("HOME", value),
            None => std::env::remove_var("HOME"),
        }
        assert_eq!(expanded, home.path().join(".labelvault/spool"));
    }
}
