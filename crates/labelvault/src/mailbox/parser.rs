//! RFC 822 message parsing into [`Message`] values.

use chrono::DateTime;
use log::debug;
use mail_parser::{Address, MessageParser, MimeHeaders, PartType};

use super::error::{MailboxError, Result};
use super::{Message, MessagePart, PartKind};

/// Parses a raw message into a [`Message`] with the given id and read state.
pub fn parse_message(id: &str, raw: &[u8], unread: bool) -> Result<Message> {
    let parsed = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| MailboxError::Parse {
            id: id.to_string(),
            reason: "not an RFC 822 message".to_string(),
        })?;

    let date = parsed
        .date()
        .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0))
        .ok_or_else(|| MailboxError::Parse {
            id: id.to_string(),
            reason: "missing or invalid Date header".to_string(),
        })?;

    let mut parts = Vec::new();
    for part in parsed.attachments() {
        let data = match &part.body {
            PartType::Binary(data) | PartType::InlineBinary(data) => data.to_vec(),
            PartType::Text(text) => text.as_bytes().to_vec(),
            PartType::Html(html) => html.as_bytes().to_vec(),
            _ => continue,
        };

        let mime_type = part.content_type().map(|ct| {
            if let Some(subtype) = ct.subtype() {
                format!("{}/{}", ct.ctype(), subtype)
            } else {
                ct.ctype().to_string()
            }
        });

        let content_id = part.content_id().map(str::to_string);
        let declared_attachment = part
            .content_disposition()
            .is_some_and(|d| d.ctype().eq_ignore_ascii_case("attachment"));
        let kind = if content_id.is_some() && !declared_attachment {
            PartKind::Inline
        } else {
            PartKind::Attachment
        };

        let filename = part
            .attachment_name()
            .or_else(|| part.content_type().and_then(|ct| ct.attribute("name")))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_filename(mime_type.as_deref()));

        parts.push(MessagePart {
            filename,
            mime_type,
            content_id,
            kind,
            data,
        });
    }

    let message = Message {
        id: id.to_string(),
        from: parsed.from().map(format_addresses).unwrap_or_default(),
        to: parsed.to().map(format_addresses).unwrap_or_default(),
        cc: parsed.cc().map(format_addresses).unwrap_or_default(),
        subject: parsed.subject().map(str::to_string),
        body_html: parsed
            .body_html(0)
            .map(|body| body.into_owned())
            .unwrap_or_default(),
        date,
        unread,
        parts,
    };

    debug!(
        "Parsed message {} ({} parts, subject {:?})",
        message.id,
        message.parts.len(),
        message.subject.as_deref().unwrap_or("(no subject)")
    );

    Ok(message)
}

/// Formats an address list as `Name <addr>, addr, ...`.
fn format_addresses(address: &Address) -> String {
    address
        .iter()
        .map(format_address)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_address(addr: &mail_parser::Addr) -> String {
    if let Some(name) = addr.name() {
        format!("{} <{}>", name, addr.address().unwrap_or_default())
    } else {
        addr.address().unwrap_or_default().to_string()
    }
}

/// Builds `attachment.<ext>` from a MIME type when a part has no name.
fn default_filename(mime_type: Option<&str>) -> String {
    let extension = mime_type
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("bin");
    format!("attachment.{}", extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTIPART: &str = "From: Billing <billing@example.com>\r\n\
To: Alice <alice@example.com>, bob@example.com\r\n\
Cc: carol@example.com\r\n\
Subject: Invoice #1\r\n\
Date: Fri, 01 Mar 2024 10:30:00 +0000\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"outer\"\r\n\
\r\n\
--outer\r\n\
Content-Type: multipart/related; boundary=\"inner\"\r\n\
\r\n\
--inner\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Hello <img src=\"cid:logo\"></p>\r\n\
--inner\r\n\
Content-Type: image/png\r\n\
Content-ID: <logo>\r\n\
Content-Disposition: inline\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
iVBORw0KGgo=\r\n\
--inner--\r\n\
--outer\r\n\
Content-Type: application/pdf; name=\"report.pdf\"\r\n\
Content-Disposition: attachment; filename=\"report.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0xLjQK\r\n\
--outer--\r\n";

    #[test]
    fn test_parse_headers() {
        let message = parse_message("abc123", MULTIPART.as_bytes(), true).unwrap();

        assert_eq!(message.id, "abc123");
        assert_eq!(message.from, "Billing <billing@example.com>");
        assert_eq!(message.to, "Alice <alice@example.com>, bob@example.com");
        assert_eq!(message.cc, "carol@example.com");
        assert_eq!(message.subject.as_deref(), Some("Invoice #1"));
        assert_eq!(message.date.to_rfc3339(), "2024-03-01T10:30:00+00:00");
        assert!(message.unread);
        assert!(message.body_html.contains("cid:logo"));
    }

    #[test]
    fn test_parse_classifies_parts() {
        let message = parse_message("abc123", MULTIPART.as_bytes(), false).unwrap();

        let inline: Vec<_> = message.inline_parts().collect();
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].normalized_content_id().as_deref(), Some("logo"));
        assert_eq!(inline[0].mime_type.as_deref(), Some("image/png"));

        let attachments: Vec<_> = message.attachments().collect();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "report.pdf");
        assert_eq!(attachments[0].data, b"%PDF-1.4\n");
    }

    #[test]
    fn test_parse_requires_date() {
        let raw = "From: a@example.com\r\nSubject: no date\r\n\r\nbody\r\n";
        let err = parse_message("x", raw.as_bytes(), false).unwrap_err();
        assert!(matches!(err, MailboxError::Parse { .. }));
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(default_filename(None), "attachment.bin");
        assert!(default_filename(Some("application/pdf")).starts_with("attachment."));
    }
}
