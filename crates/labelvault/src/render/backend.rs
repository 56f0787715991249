//! HTML to PDF conversion through an external command.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::RenderError;

use super::PdfBackend;

/// Signature every PDF document starts with.
const PDF_MAGIC: &[u8] = b"%PDF";

/// Converts HTML by piping it through an external program.
///
/// The program receives the document on stdin and must write the PDF to
/// stdout, e.g. `wkhtmltopdf --quiet --encoding utf-8 - -`.
#[derive(Debug, Clone)]
pub struct CommandPdfBackend {
    program: String,
    args: Vec<String>,
}

impl CommandPdfBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl PdfBackend for CommandPdfBackend {
    fn render_html_to_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let _span = tracing::info_span!("render.command", program = %self.program).entered();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RenderError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        // Feed stdin from a separate thread so a large document cannot
        // deadlock against a full stdout pipe.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::InvalidOutput("backend stdin unavailable".to_string()))?;
        let input = html.as_bytes().to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        // Collects stdout and stderr concurrently.
        let output = child.wait_with_output()?;

        let written = writer.join().map_err(|_| {
            RenderError::InvalidOutput("stdin writer thread panicked".to_string())
        })?;

        // A failing converter usually closes stdin early; report its status first.
        if !output.status.success() {
            return Err(RenderError::BackendFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let stdout = output.stdout;
        if !stdout.starts_with(PDF_MAGIC) {
            return Err(RenderError::InvalidOutput(format!(
                "'{}' did not produce a PDF ({} bytes)",
                self.program,
                stdout.len()
            )));
        }

        debug!("Rendered {} bytes of HTML into {} bytes of PDF", html.len(), stdout.len());
        Ok(stdout)
    }
}
