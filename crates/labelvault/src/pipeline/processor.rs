use chrono::{DateTime, Local};
use tracing::{debug, error, info, info_span};

use crate::config::ArchiveConfig;
use crate::mailbox::{build_search_query, Conversation, LabelHandle, Message};
use crate::render::{PdfRenderer, RenderedArtifact};
use crate::state::ProcessedStateStore;
use crate::storage::{find_or_create_folder, resolve_root, FolderHandle};

use super::attachments::AttachmentArchiver;
use super::error::PipelineError;
use super::outcome::{LabelReport, MessageOutcome};
use super::Services;

/// Archives every new message carrying one label.
pub struct LabelProcessor<'a> {
    config: &'a ArchiveConfig,
    services: Services<'a>,
}

/// Everything resolved once per label and shared by its messages.
struct LabelContext<'a> {
    label: &'a str,
    primary: LabelHandle,
    marker: Option<LabelHandle>,
    /// Destination folder; never resolved in simulation mode.
    folder: Option<FolderHandle>,
    tracker: ProcessedStateStore<'a>,
}

impl<'a> LabelProcessor<'a> {
    pub fn new(config: &'a ArchiveConfig, services: Services<'a>) -> Self {
        Self { config, services }
    }

    pub fn process(&self, label: &str) -> Result<LabelReport, PipelineError> {
        self.process_at(label, Local::now())
    }

    /// Processes `label` with the lookback window measured from `now`.
    ///
    /// Errors returned here abort the label; failures of individual messages
    /// are recorded in the report instead.
    pub fn process_at(
        &self,
        label: &str,
        now: DateTime<Local>,
    ) -> Result<LabelReport, PipelineError> {
        let _span = info_span!("label", label = %label).entered();
        let mut report = LabelReport::new(label);

        // Step 1: Labels
        let primary = self.services.mailbox.find_or_create_label(label)?;
        let marker = match self.config.marker_sub_label() {
            Some(sub) => Some(
                self.services
                    .mailbox
                    .find_or_create_label(&format!("{}/{}", label, sub))?,
            ),
            None => None,
        };

        // Step 2+3: Search
        let query = build_search_query(
            label,
            self.config.lookback_days,
            self.config.unread_only,
            now,
        );
        debug!("Searching with query: {}", query);
        let conversations = self.services.mailbox.search(&query)?;
        if conversations.is_empty() {
            debug!("No conversations for label '{}'", label);
            return Ok(report);
        }
        report.conversations = conversations.len();
        info!(
            "Found {} conversations for label '{}'",
            conversations.len(),
            label
        );

        // Step 4: Destination folder
        let folder = if self.config.simulation {
            None
        } else {
            let root = resolve_root(self.services.files, self.config.root_folder_id.as_deref())?;
            Some(find_or_create_folder(self.services.files, &root, label)?)
        };

        let ctx = LabelContext {
            label,
            primary,
            marker,
            folder,
            tracker: ProcessedStateStore::new(self.services.properties, label),
        };

        // Step 5: Messages
        for conversation in &conversations {
            for message in &conversation.messages {
                let outcome = match self.process_message(&ctx, conversation, message) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!("Failed to archive message {}: {}", message.id, e);
                        MessageOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                report.record(&message.id, outcome);
            }
        }

        info!(
            "Label '{}' done: {} archived, {} simulated, {} skipped, {} failed",
            label,
            report.archived(),
            report.simulated(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    fn process_message(
        &self,
        ctx: &LabelContext<'_>,
        conversation: &Conversation,
        message: &Message,
    ) -> Result<MessageOutcome, PipelineError> {
        let _span = info_span!("message", id = %message.id).entered();

        if ctx.tracker.is_processed(&message.id)? {
            debug!("Message {} already processed", message.id);
            return Ok(MessageOutcome::SkippedProcessed);
        }

        if self.config.unread_only && !message.unread {
            debug!("Message {} is read, skipping", message.id);
            return Ok(MessageOutcome::SkippedRead);
        }

        let artifact = PdfRenderer::new(self.services.pdf).render(message)?;

        let Some(folder) = ctx.folder.as_ref() else {
            info!("[SIMULATION] Would archive {}", artifact.base_name);
            return Ok(MessageOutcome::Simulated {
                base_name: artifact.base_name,
            });
        };

        let attachments_saved = self.file_message(ctx, folder, conversation, message, &artifact)?;

        // Written last: any failure above leaves the message eligible next run.
        ctx.tracker.mark_processed(&message.id)?;

        info!("Archived {}", artifact.base_name);
        Ok(MessageOutcome::Archived {
            base_name: artifact.base_name,
            attachments_saved,
        })
    }

    fn file_message(
        &self,
        ctx: &LabelContext<'_>,
        folder: &FolderHandle,
        conversation: &Conversation,
        message: &Message,
        artifact: &RenderedArtifact,
    ) -> Result<usize, PipelineError> {
        let files = self.services.files;
        let pdf = files.create_file(folder, &artifact.file_name(), &artifact.pdf)?;
        files.set_description(&pdf, &describe(ctx.label, &message.id))?;

        let attachments_saved = if self.config.save_attachments {
            AttachmentArchiver::new(files).archive(folder, &artifact.base_name, message)?
        } else {
            0
        };

        let mailbox = self.services.mailbox;
        if let Some(marker) = &ctx.marker {
            mailbox.add_label(conversation, marker)?;
            mailbox.remove_label(conversation, &ctx.primary)?;
        }
        if self.config.archive_conversation {
            mailbox.archive(conversation)?;
        }

        Ok(attachments_saved)
    }
}

/// Description attached to every archived PDF.
pub fn describe(label: &str, message_id: &str) -> String {
    format!(
        "Exporté depuis Gmail (libellé : {}) | ID: {}",
        label, message_id
    )
}
