//! Message to PDF rendering.
//!
//! A message is composed into a standalone HTML document (header block with
//! its metadata, then the body with inline images embedded) and handed to a
//! [`PdfBackend`] for conversion.

pub mod backend;
pub mod inline;

use chrono::Local;

use crate::error::RenderError;
use crate::mailbox::Message;
use crate::sanitize::{escape_html, sanitize_filename};

pub use backend::CommandPdfBackend;
pub use inline::resolve_inline_images;

/// Subject used when a message has none.
pub const DEFAULT_SUBJECT: &str = "Sans sujet";

const STYLESHEET: &str = "\
body { font-family: 'Helvetica', sans-serif; font-size: 11pt; color: #333; line-height: 1.4; }
.entete { background-color: #f8f9fa; padding: 15px; border-bottom: 2px solid #e9ecef; margin-bottom: 20px; }
.entete div { margin-bottom: 5px; font-size: 0.95em; }
strong { color: #495057; }
img { max-width: 100%; height: auto; }
hr { border: 0; border-top: 1px solid #ddd; margin: 20px 0; }";

/// Converts a complete HTML document into PDF bytes.
pub trait PdfBackend: Send + Sync {
    fn render_html_to_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}

/// A rendered message: the PDF bytes and the base name they are filed under.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub base_name: String,
    pub pdf: Vec<u8>,
}

impl RenderedArtifact {
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.base_name)
    }
}

pub struct PdfRenderer<'a> {
    backend: &'a dyn PdfBackend,
}

impl<'a> PdfRenderer<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self { backend }
    }

    /// Renders a message into a PDF. Backend failures are returned unchanged.
    pub fn render(&self, message: &Message) -> Result<RenderedArtifact, RenderError> {
        let html = compose_html(message);
        let pdf = self.backend.render_html_to_pdf(&html)?;
        Ok(RenderedArtifact {
            base_name: base_filename(message),
            pdf,
        })
    }
}

/// Builds the HTML document for a message.
///
/// Every header field is escaped; the body is embedded as-is after its
/// `cid:` references have been resolved.
pub fn compose_html(message: &Message) -> String {
    let subject = subject_of(message);
    let date = message.date.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let body = resolve_inline_images(&message.body_html, message);

    let mut header = String::new();
    header.push_str(&header_line("Objet", subject));
    header.push_str(&header_line("De", &message.from));
    header.push_str(&header_line("À", &message.to));
    if !message.cc.is_empty() {
        header.push_str(&header_line("Cc", &message.cc));
    }
    header.push_str(&format!("<div><strong>Date :</strong> {}</div>\n", date));

    format!(
        "<html>\n<head><meta charset=\"UTF-8\"><style>\n{}\n</style></head>\n<body>\n<div class=\"entete\">\n{}</div>\n{}\n</body>\n</html>\n",
        STYLESHEET, header, body
    )
}

/// Derives `<yyyy-MM-dd_HH-mm> - <subject> - <id prefix>` for a message.
pub fn base_filename(message: &Message) -> String {
    let stamp = message.date.with_timezone(&Local).format("%Y-%m-%d_%H-%M");
    let subject = sanitize_filename(subject_of(message));
    let id_prefix: String = message.id.chars().take(8).collect();
    format!("{} - {} - {}", stamp, subject, id_prefix)
}

fn subject_of(message: &Message) -> &str {
    match message.subject.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_SUBJECT,
    }
}

fn header_line(label: &str, value: &str) -> String {
    format!("<div><strong>{} :</strong> {}</div>\n", label, escape_html(value))
}
