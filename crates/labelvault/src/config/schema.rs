use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Immutable settings for a run, loaded once and shared by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            archive: ArchiveConfig::default(),
            mailbox: MailboxConfig::default(),
            storage: StorageConfig::default(),
            state: StateConfig::default(),
            renderer: RendererConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveConfig {
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// Destination folder id; the file store root is used when unset.
    #[serde(default)]
    pub root_folder_id: Option<String>,
    #[serde(default = "default_true")]
    pub save_attachments: bool,
    /// Child label `<label>/<sub>` applied once a conversation is archived.
    /// Blank or null disables relabelling.
    #[serde(default = "default_processed_sub_label")]
    pub processed_sub_label: Option<String>,
    #[serde(default = "default_true")]
    pub archive_conversation: bool,
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Dry run: log what would be archived without touching anything.
    #[serde(default)]
    pub simulation: bool,
}

impl ArchiveConfig {
    /// The configured sub-label, if it is set and not blank.
    pub fn marker_sub_label(&self) -> Option<&str> {
        self.processed_sub_label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            labels: default_labels(),
            root_folder_id: None,
            save_attachments: true,
            processed_sub_label: default_processed_sub_label(),
            archive_conversation: true,
            unread_only: false,
            lookback_days: default_lookback_days(),
            simulation: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_labels() -> Vec<String> {
    vec!["PDF".to_string()]
}

fn default_processed_sub_label() -> Option<String> {
    Some("Traité".to_string())
}

fn default_lookback_days() -> u32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxConfig {
    #[serde(default = "default_spool_directory")]
    pub spool_directory: PathBuf,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            spool_directory: default_spool_directory(),
        }
    }
}

fn default_spool_directory() -> PathBuf {
    PathBuf::from("~/.labelvault/spool")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default = "default_root_directory")]
    pub root_directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_directory: default_root_directory(),
        }
    }
}

fn default_root_directory() -> PathBuf {
    PathBuf::from("~/.labelvault/archive")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("~/.labelvault/data/state.db")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererConfig {
    #[serde(default = "default_renderer_program")]
    pub program: String,
    #[serde(default = "default_renderer_args")]
    pub args: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: default_renderer_program(),
            args: default_renderer_args(),
        }
    }
}

fn default_renderer_program() -> String {
    "wkhtmltopdf".to_string()
}

fn default_renderer_args() -> Vec<String> {
    ["--quiet", "--encoding", "utf-8", "-", "-"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
        }
    }
}

fn default_interval_minutes() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: Config = serde_json::from_str(r#"{"version": "1.0"}"#).unwrap();

        assert_eq!(config.archive.labels, vec!["PDF"]);
        assert_eq!(config.archive.processed_sub_label.as_deref(), Some("Traité"));
        assert_eq!(config.archive.lookback_days, 30);
        assert!(config.archive.save_attachments);
        assert!(config.archive.archive_conversation);
        assert!(!config.archive.unread_only);
        assert!(!config.archive.simulation);
        assert_eq!(config.archive.root_folder_id, None);
        assert_eq!(config.renderer.program, "wkhtmltopdf");
        assert_eq!(config.schedule.interval_minutes, 5);
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{
            "version": "1.0",
            "archive": {
                "labels": ["Factures"],
                "rootFolderId": "Archives",
                "saveAttachments": false,
                "processedSubLabel": null,
                "unreadOnly": true,
                "lookbackDays": 7
            }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.archive.labels, vec!["Factures"]);
        assert_eq!(config.archive.root_folder_id.as_deref(), Some("Archives"));
        assert!(!config.archive.save_attachments);
        assert_eq!(config.archive.processed_sub_label, None);
        assert!(config.archive.unread_only);
        assert_eq!(config.archive.lookback_days, 7);
        assert!(config.archive.archive_conversation);
    }

    #[test]
    fn test_marker_sub_label() {
        let mut archive = ArchiveConfig::default();
        assert_eq!(archive.marker_sub_label(), Some("Traité"));

        archive.processed_sub_label = Some("   ".to_string());
        assert_eq!(archive.marker_sub_label(), None);

        archive.processed_sub_label = None;
        assert_eq!(archive.marker_sub_label(), None);
    }
}
