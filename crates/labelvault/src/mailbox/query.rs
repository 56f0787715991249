//! Search query construction and parsing.
//!
//! The pipeline emits queries of the form
//! `label:"<name>" after:<yyyy/MM/dd> [is:unread]`. Local mailbox stores parse
//! the same language back into a [`SearchQuery`].

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::sanitize::quote_label;

use super::error::{MailboxError, Result};
use super::Message;

/// Date format used by the `after:` term.
const AFTER_DATE_FORMAT: &str = "%Y/%m/%d";

/// Builds the bounded search query for one label.
pub fn build_search_query(
    label: &str,
    lookback_days: u32,
    unread_only: bool,
    now: DateTime<Local>,
) -> String {
    // Out-of-range windows reach back to the earliest representable day.
    let start = now
        .date_naive()
        .checked_sub_signed(Duration::days(i64::from(lookback_days)))
        .unwrap_or(NaiveDate::MIN);
    let mut query = format!(
        "label:{} after:{}",
        quote_label(label),
        start.format(AFTER_DATE_FORMAT)
    );
    if unread_only {
        query.push_str(" is:unread");
    }
    query
}

/// A parsed search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub label: Option<String>,
    pub after: Option<NaiveDate>,
    pub unread_only: bool,
}

impl SearchQuery {
    /// Parses a query string. Unknown terms are rejected.
    pub fn parse(query: &str) -> Result<Self> {
        let invalid = |reason: String| MailboxError::InvalidQuery {
            query: query.to_string(),
            reason,
        };

        let mut parsed = SearchQuery::default();
        let mut rest = query.trim_start();

        while !rest.is_empty() {
            if let Some(label_term) = rest.strip_prefix("label:") {
                let (label, remaining) = read_label(label_term).map_err(invalid)?;
                parsed.label = Some(label);
                rest = remaining;
            } else {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                let token = &rest[..end];
                rest = &rest[end..];

                if let Some(date) = token.strip_prefix("after:") {
                    let date = NaiveDate::parse_from_str(date, AFTER_DATE_FORMAT)
                        .map_err(|e| invalid(format!("invalid date '{}': {}", date, e)))?;
                    parsed.after = Some(date);
                } else if token == "is:unread" {
                    parsed.unread_only = true;
                } else {
                    return Err(invalid(format!("unsupported term '{}'", token)));
                }
            }
            rest = rest.trim_start();
        }

        Ok(parsed)
    }

    /// Checks a conversation, given its labels and messages, against the query.
    pub fn matches(&self, labels: &[String], messages: &[Message]) -> bool {
        if let Some(label) = &self.label {
            if !labels.iter().any(|l| l == label) {
                return false;
            }
        }

        if let Some(after) = self.after {
            let recent = messages
                .iter()
                .any(|m| m.date.with_timezone(&Local).date_naive() >= after);
            if !recent {
                return false;
            }
        }

        if self.unread_only && !messages.iter().any(|m| m.unread) {
            return false;
        }

        true
    }
}

/// Reads a label operand, quoted or bare, and returns it with the remaining input.
fn read_label(input: &str) -> std::result::Result<(String, &str), String> {
    if let Some(quoted) = input.strip_prefix('"') {
        let mut label = String::new();
        let mut chars = quoted.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' if quoted[i + 1..].starts_with('"') => {
                    label.push('"');
                    chars.next();
                }
                '"' => return Ok((label, &quoted[i + 1..])),
                _ => label.push(c),
            }
        }
        return Err("unterminated quoted label".to_string());
    }

    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    if end == 0 {
        return Err("empty label".to_string());
    }
    Ok((input[..end].to_string(), &input[end..]))
}
