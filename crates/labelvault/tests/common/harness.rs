//! Test harness for isolated pipeline runs.
//!
//! The `TestHarness` struct wires the archival pipeline to in-memory
//! collaborators:
//! - `MemoryMailbox` recording every mutation
//! - `MemoryFileStore` for the destination tree
//! - `MemoryPropertyStore` for processed records
//! - `FakePdfBackend` recording every rendered document

#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, Local};

use labelvault::error::RenderError;
use labelvault::mailbox::{MailboxError, MemoryMailbox};
use labelvault::{
    run_all_labels, ArchiveConfig, Conversation, LabelHandle, LabelProcessor, LabelReport,
    Mailbox, MemoryFileStore, MemoryPropertyStore, Message, PdfBackend, PipelineError, RunReport,
    Services,
};

/// Bytes every fake PDF starts with.
pub const FAKE_PDF_HEADER: &[u8] = b"%PDF-1.4 fake\n";

/// PDF backend that returns the HTML behind a PDF header.
///
/// Documents containing `fail_marker` make the backend fail.
#[derive(Default)]
pub struct FakePdfBackend {
    documents: Mutex<Vec<String>>,
    fail_marker: Option<String>,
}

impl FakePdfBackend {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            fail_marker: Some(marker.to_string()),
        }
    }

    /// Every HTML document passed to the backend, in order.
    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }
}

impl PdfBackend for FakePdfBackend {
    fn render_html_to_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        self.documents.lock().unwrap().push(html.to_string());
        if let Some(marker) = &self.fail_marker {
            if html.contains(marker.as_str()) {
                return Err(RenderError::InvalidOutput(format!(
                    "refusing document containing '{}'",
                    marker
                )));
            }
        }
        let mut pdf = FAKE_PDF_HEADER.to_vec();
        pdf.extend_from_slice(html.as_bytes());
        Ok(pdf)
    }
}

/// Mailbox whose searches fail for selected labels.
pub struct FlakyMailbox {
    pub inner: MemoryMailbox,
    failing_labels: Vec<String>,
}

impl FlakyMailbox {
    pub fn new(failing_labels: &[&str]) -> Self {
        Self {
            inner: MemoryMailbox::new(),
            failing_labels: failing_labels.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Mailbox for FlakyMailbox {
    fn find_or_create_label(&self, name: &str) -> Result<LabelHandle, MailboxError> {
        self.inner.find_or_create_label(name)
    }

    fn search(&self, query: &str) -> Result<Vec<Conversation>, MailboxError> {
        if self
            .failing_labels
            .iter()
            .any(|l| query.contains(&format!("label:\"{}\"", l)))
        {
            return Err(MailboxError::InvalidQuery {
                query: query.to_string(),
                reason: "search backend unavailable".to_string(),
            });
        }
        self.inner.search(query)
    }

    fn add_label(&self, conversation: &Conversation, label: &LabelHandle) -> Result<(), MailboxError> {
        self.inner.add_label(conversation, label)
    }

    fn remove_label(
        &self,
        conversation: &Conversation,
        label: &LabelHandle,
    ) -> Result<(), MailboxError> {
        self.inner.remove_label(conversation, label)
    }

    fn archive(&self, conversation: &Conversation) -> Result<(), MailboxError> {
        self.inner.archive(conversation)
    }
}

/// Test harness providing an isolated in-memory environment.
pub struct TestHarness {
    pub mailbox: MemoryMailbox,
    pub files: MemoryFileStore,
    pub properties: MemoryPropertyStore,
    pub pdf: FakePdfBackend,
    pub config: ArchiveConfig,
}

impl TestHarness {
    /// Harness with the default archive settings (label `PDF`).
    pub fn new() -> Self {
        Self::with_config(ArchiveConfig::default())
    }

    pub fn with_config(config: ArchiveConfig) -> Self {
        Self {
            mailbox: MemoryMailbox::new(),
            files: MemoryFileStore::new(),
            properties: MemoryPropertyStore::new(),
            pdf: FakePdfBackend::default(),
            config,
        }
    }

    pub fn with_pdf(mut self, pdf: FakePdfBackend) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn services(&self) -> Services<'_> {
        Services {
            mailbox: &self.mailbox,
            files: &self.files,
            properties: &self.properties,
            pdf: &self.pdf,
        }
    }

    /// Adds a conversation carrying `labels`.
    pub fn add_conversation(&self, id: &str, messages: Vec<Message>, labels: &[&str]) {
        self.mailbox.add_conversation(id, messages, labels);
    }

    pub fn run(&self) -> RunReport {
        run_all_labels(&self.config, self.services())
    }

    pub fn process(&self, label: &str) -> Result<LabelReport, PipelineError> {
        LabelProcessor::new(&self.config, self.services()).process(label)
    }

    pub fn process_at(
        &self,
        label: &str,
        now: DateTime<Local>,
    ) -> Result<LabelReport, PipelineError> {
        LabelProcessor::new(&self.config, self.services()).process_at(label, now)
    }
}
