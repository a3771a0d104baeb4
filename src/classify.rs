use crate::{Error, TeraResult};
use once_cell::sync::Lazy;
use std::convert::TryFrom;
use std::fmt;
use url::Url;

/// Hosts serving TeraBox shares. Each also matches with a `www.` prefix.
pub const SHARE_DOMAINS: &[&str] = &[
    "terabox.com",
    "terabox.app",
    "terabox.fun",
    "teraboxapp.com",
    "1024terabox.com",
    "1024tera.com",
    "teraboxlink.com",
    "terasharelink.com",
    "freeterabox.com",
    "dubox.com",
    "4funbox.com",
    "mirrobox.com",
    "nephobox.com",
    "momerybox.com",
    "tibibox.com",
];

pub static CANONICAL_ORIGIN: Lazy<Url> =
    Lazy::new(|| Url::parse("https://www.terabox.com").unwrap());

/// A URL known to point at a TeraBox share page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    url: Url,
}

pub fn is_share_link(candidate: &str) -> bool {
    classify(candidate).is_some()
}

fn classify(candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    let bare = host.strip_prefix("www.").unwrap_or(&host);
    if !SHARE_DOMAINS.contains(&bare) {
        return None;
    }
    has_share_path(&url).then_some(url)
}

fn has_share_path(url: &Url) -> bool {
    let segments: Vec<_> = match url.path_segments() {
        Some(it) => it.collect(),
        None => return false,
    };
    let short = segments
        .windows(2)
        .any(|w| w[0] == "s" && !w[1].is_empty());
    let sharing = segments.first() == Some(&"sharing")
        && segments.get(1).map_or(false, |s| !s.is_empty());
    short || sharing
}

impl ShareLink {
    pub fn parse(candidate: &str) -> TeraResult<Self> {
        classify(candidate)
            .map(|url| Self { url })
            .ok_or_else(|| Error::invalid_link(candidate))
    }
    pub fn url(&self) -> &Url {
        &self.url
    }
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
    /// The share id: the segment after `/s/`, or the `surl` query parameter.
    pub fn short_key(&self) -> Option<String> {
        let mut segments = self.url.path_segments()?;
        if segments.any(|s| s == "s") {
            if let Some(key) = segments.next().filter(|k| !k.is_empty()) {
                return Some(key.to_owned());
            }
        }
        self.url
            .query_pairs()
            .find(|(k, _)| k == "surl")
            .map(|(_, v)| v.into_owned())
    }
    /// The same share on `origin`. Mirrors redirect unpredictably, so pages
    /// are always fetched from one host.
    pub fn canonical(&self, origin: &Url) -> Url {
        let mut url = origin.clone();
        url.set_path(self.url.path());
        url.set_query(self.url.query());
        url
    }
}

impl TryFrom<&str> for ShareLink {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
