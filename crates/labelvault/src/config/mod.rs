pub mod loader;
pub mod schema;

pub use loader::{expand_home, load_config, load_config_from_str, MAX_LOOKBACK_DAYS};
pub use schema::{
    ArchiveConfig, Config, MailboxConfig, RendererConfig, ScheduleConfig, StateConfig,
    StorageConfig,
};
