//! Resolution of `cid:` image references into embedded data URIs.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{Captures, Regex};

use crate::mailbox::{Message, MessagePart};

static RE_CID_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src=["']cid:([^"']+)["']"#).unwrap());

/// MIME type assumed for inline parts that declare none.
const DEFAULT_IMAGE_TYPE: &str = "image/png";

/// Replaces every `src="cid:ID"` whose id matches one of the message's inline
/// parts with `src="data:<mime>;base64,<bytes>"`. Unknown ids are left as-is.
pub fn resolve_inline_images(html: &str, message: &Message) -> String {
    let by_cid: HashMap<String, &MessagePart> = message
        .inline_parts()
        .filter_map(|part| part.normalized_content_id().map(|cid| (cid, part)))
        .collect();

    if by_cid.is_empty() {
        return html.to_string();
    }

    RE_CID_SRC
        .replace_all(html, |caps: &Captures| match by_cid.get(&caps[1]) {
            Some(part) => {
                let mime = part.mime_type.as_deref().unwrap_or(DEFAULT_IMAGE_TYPE);
                format!("src=\"data:{};base64,{}\"", mime, STANDARD.encode(&part.data))
            }
            None => caps[0].to_string(),
        })
        .into_owned()
}
