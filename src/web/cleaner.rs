//! Regex-based HTML stripping.
//!
//! These are plain string transforms with no attempt at real HTML parsing.
//! Removed elements and tags are replaced by a space so that words on either
//! side of them stay separate.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::{Result, SearchxError};

/// Elements whose content is never visible page text.
pub const BLOCK_ELEMENTS: &[&str] = &["head", "style", "script", "noscript", "svg"];

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").expect("comment pattern should be valid");
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").expect("tag pattern should be valid");
    static ref ENTITY: Regex =
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{0,31});")
            .expect("entity pattern should be valid");
    static ref BLOCK_PATTERNS: Vec<Regex> = BLOCK_ELEMENTS
        .iter()
        .map(|name| Regex::new(&element_pattern(name)).expect("element pattern should be valid"))
        .collect();
}

fn element_pattern(name: &str) -> String {
    format!(r"(?is)<{0}\b[^>]*>.*?</{0}\s*>", regex::escape(name))
}

/// Strips markup from HTML text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlCleaner;

impl HtmlCleaner {
    /// Remove `<!-- ... -->` comments.
    pub fn strip_comments(html: &str) -> String {
        COMMENT.replace_all(html, "").into_owned()
    }

    /// Remove every `name` element including its content, ignoring case.
    pub fn strip_element(html: &str, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(SearchxError::analysis("element name must not be empty"));
        }
        let element = Regex::new(&element_pattern(name))
            .map_err(|e| SearchxError::analysis(format!("Invalid element name {name:?}: {e}")))?;
        Ok(element.replace_all(html, " ").into_owned())
    }

    /// Remove head, style, script, noscript and svg elements.
    pub fn strip_block_elements(html: &str) -> String {
        BLOCK_PATTERNS
            .iter()
            .fold(html.to_string(), |text, element| element.replace_all(&text, " ").into_owned())
    }

    /// Remove all remaining tags, keeping their text content.
    pub fn strip_tags(html: &str) -> String {
        TAG.replace_all(html, " ").into_owned()
    }

    /// Decode character entities. Unknown entities are dropped.
    pub fn strip_entities(html: &str) -> String {
        ENTITY
            .replace_all(html, |caps: &Captures| decode_entity(&caps[1]).unwrap_or_default())
            .into_owned()
    }

    /// Reduce an HTML document to its visible text.
    pub fn strip_html(html: &str) -> String {
        let text = Self::strip_comments(html);
        let text = Self::strip_block_elements(&text);
        let text = Self::strip_tags(&text);
        Self::strip_entities(&text)
    }
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        "eacute" => "\u{00E9}",
        _ => return None,
    };
    Some(decoded.to_string())
}
