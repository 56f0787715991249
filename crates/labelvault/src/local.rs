//! Collaborators backed by the local machine, wired from configuration.

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::mailbox::SpoolMailbox;
use crate::pipeline::{run_all_labels, RunReport, Services};
use crate::render::CommandPdfBackend;
use crate::state::SqlitePropertyStore;
use crate::storage::LocalFileStore;

/// A spool mailbox, a local folder tree, a SQLite property store and an
/// external PDF converter.
pub struct LocalStack {
    pub mailbox: SpoolMailbox,
    pub files: LocalFileStore,
    pub properties: SqlitePropertyStore,
    pub pdf: CommandPdfBackend,
}

impl LocalStack {
    /// Opens every collaborator named by `config`, creating directories and
    /// the state database as needed.
    pub fn open(config: &Config) -> Result<Self> {
        let mailbox = SpoolMailbox::open(&config.mailbox.spool_directory)?;
        let files = LocalFileStore::new(&config.storage.root_directory)?;
        let properties = SqlitePropertyStore::open(&config.state.database_path)?;
        let pdf = CommandPdfBackend::new(
            config.renderer.program.clone(),
            config.renderer.args.clone(),
        );

        info!(
            "Using spool {:?}, archive {:?}, state {:?}",
            config.mailbox.spool_directory,
            config.storage.root_directory,
            config.state.database_path
        );

        Ok(Self {
            mailbox,
            files,
            properties,
            pdf,
        })
    }

    pub fn services(&self) -> Services<'_> {
        Services {
            mailbox: &self.mailbox,
            files: &self.files,
            properties: &self.properties,
            pdf: &self.pdf,
        }
    }

    /// Runs every configured label once.
    pub fn run(&self, config: &Config) -> RunReport {
        run_all_labels(&config.archive, self.services())
    }
}
