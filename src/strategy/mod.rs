//! Heuristics that pull file metadata out of a share page.
//!
//! Each strategy is pure: markup in, partial [`FileDescriptor`] out. The
//! resolver tries them in [`CASCADE`] order and keeps the first one that
//! finds a filename, a size or a direct URL.

use crate::{FileDescriptor, Provenance};
use serde_json::Value;
use tracing::debug;
use url::Url;

pub mod discover;
pub mod json_ld;
pub mod markup;
pub mod meta;
pub mod page_state;
pub mod script;
pub mod title;

pub use discover::direct_url;

/// A fetched page as the strategies see it.
#[derive(Debug, Clone, Copy)]
pub struct Markup<'a> {
    pub html: &'a str,
    /// Where the page was served from, for resolving relative links.
    pub page_url: &'a Url,
}

impl<'a> Markup<'a> {
    pub const fn new(html: &'a str, page_url: &'a Url) -> Self {
        Self { html, page_url }
    }
}

pub trait ExtractionStrategy: Sync {
    fn name(&self) -> &'static str;
    fn provenance(&self) -> Provenance;
    fn extract(&self, page: &Markup<'_>) -> Option<FileDescriptor>;
}

pub static CASCADE: &[&dyn ExtractionStrategy] = &[
    &json_ld::StructuredData,
    &page_state::PageState,
    &script::ScriptVariables,
    &meta::MetaTags,
    &markup::InlineMarkup,
    &title::DocumentTitle,
];

/// Runs [`CASCADE`] and returns the first result with signal, tagged with
/// the provenance of the strategy that produced it.
pub fn run_cascade(page: &Markup<'_>) -> Option<FileDescriptor> {
    CASCADE.iter().find_map(|strategy| {
        let found = strategy.extract(page).filter(FileDescriptor::has_signal);
        debug!(
            strategy = strategy.name(),
            matched = found.is_some(),
            "extraction strategy"
        );
        found.map(|d| d.with_provenance(strategy.provenance()))
    })
}

/// Resolves `raw` against the page, keeping only http(s) targets.
pub(crate) fn absolute(page_url: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }
    let url = page_url.join(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

pub fn non_empty(s: impl AsRef<str>) -> Option<String> {
    let s = s.as_ref().trim();
    (!s.is_empty()).then(|| s.to_owned())
}

/// Byte count from a JSON number or a string like `"104857600"` or `"1.5 GB"`.
pub(crate) fn json_size(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => parse_size(s),
        _ => None,
    }
}

pub(crate) fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(n) = s.parse() {
        return Some(n);
    }
    let split = s.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (number, unit) = s.split_at(split);
    let number: f64 = number.parse().ok()?;
    let scale: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "b" | "bytes" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        "t" | "tb" | "tib" => 1 << 40,
        _ => return None,
    };
    Some((number * scale as f64) as u64)
}

/// Undoes the escaping scripts apply to URLs inside string literals.
pub(crate) fn unescape_js(s: &str) -> String {
    s.replace("\\/", "/")
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("\\u0026", "&")
}
