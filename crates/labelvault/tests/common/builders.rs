//! Builders for test messages and raw RFC 822 fixtures.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Local, TimeZone, Utc};

use labelvault::{Message, MessagePart, PartKind};

/// Builder for creating `Message` instances.
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    /// A message with the given id, unread, dated one hour ago.
    pub fn new(id: &str) -> Self {
        Self {
            message: Message {
                id: id.to_string(),
                from: "Alice <alice@example.com>".to_string(),
                to: "bob@example.com".to_string(),
                cc: String::new(),
                subject: Some(format!("Message {}", id)),
                body_html: "<p>Hello</p>".to_string(),
                date: Utc::now() - Duration::hours(1),
                unread: true,
                parts: Vec::new(),
            },
        }
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.message.subject = Some(subject.to_string());
        self
    }

    pub fn no_subject(mut self) -> Self {
        self.message.subject = None;
        self
    }

    pub fn from(mut self, from: &str) -> Self {
        self.message.from = from.to_string();
        self
    }

    pub fn to(mut self, to: &str) -> Self {
        self.message.to = to.to_string();
        self
    }

    pub fn cc(mut self, cc: &str) -> Self {
        self.message.cc = cc.to_string();
        self
    }

    pub fn body(mut self, html: &str) -> Self {
        self.message.body_html = html.to_string();
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.message.date = date;
        self
    }

    /// Sets the date from local wall-clock components.
    pub fn local_date(self, y: i32, m: u32, d: u32, h: u32, min: u32) -> Self {
        let local = Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("unambiguous local time");
        self.date(local.with_timezone(&Utc))
    }

    pub fn read(mut self) -> Self {
        self.message.unread = false;
        self
    }

    pub fn inline_image(mut self, cid: &str, mime: &str, data: &[u8]) -> Self {
        self.message.parts.push(MessagePart {
            filename: format!("{}.img", cid.trim_matches(|c| c == '<' || c == '>')),
            mime_type: Some(mime.to_string()),
            content_id: Some(cid.to_string()),
            kind: PartKind::Inline,
            data: data.to_vec(),
        });
        self
    }

    pub fn attachment(mut self, filename: &str, mime: &str, data: &[u8]) -> Self {
        self.message.parts.push(MessagePart {
            filename: filename.to_string(),
            mime_type: Some(mime.to_string()),
            content_id: None,
            kind: PartKind::Attachment,
            data: data.to_vec(),
        });
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}

/// A minimal raw message with an HTML body.
pub fn raw_html_message(message_id: &str, subject: &str, date_rfc2822: &str, html: &str) -> Vec<u8> {
    format!(
        "From: Alice <alice@example.com>\r\n\
         To: bob@example.com\r\n\
         Subject: {subject}\r\n\
         Date: {date_rfc2822}\r\n\
         Message-ID: <{message_id}@example.com>\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         \r\n\
         {html}\r\n"
    )
    .into_bytes()
}
