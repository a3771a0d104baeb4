use crate::classify::CANONICAL_ORIGIN;
use crate::error as err;
use crate::strategy::{self, Markup};
use crate::utils::client::{Client, Page};
use crate::{AsClient, FileDescriptor, Provenance, Resolve, ShareLink, TeraResult};
use serde::Deserialize;
use snafu::OptionExt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Markers of interstitial anti-bot pages, lowercase.
const CHALLENGE_MARKERS: &[&str] = &[
    "cf-browser-verification",
    "_cf_chl_opt",
    "<title>just a moment...</title>",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Every mirror is fetched from this origin.
    pub canonical_origin: Url,
    #[serde(with = "secs")]
    pub page_timeout: Duration,
    #[serde(with = "secs")]
    pub probe_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            canonical_origin: CANONICAL_ORIGIN.clone(),
            page_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(10),
        }
    }
}

pub(crate) mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Resolves TeraBox share links. Holds no per-request state, so one value
/// can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Terabox {
    client: Client,
    config: ResolverConfig,
}

impl Terabox {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: ResolverConfig) -> Self {
        Self::with_client(Client::new(), config)
    }
    pub fn with_client(client: Client, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    async fn fetch(&self, link: &ShareLink) -> TeraResult<Page> {
        let url = link.canonical(&self.config.canonical_origin);
        debug!(%url, "fetching share page");
        let page = self.client.get_page(url, self.config.page_timeout).await?;
        if is_challenge(&page.body) {
            warn!(url = %page.url, "share page is an anti-bot challenge");
            return err::Challenged { url: page.url }.fail();
        }
        Ok(page)
    }

    async fn backfill_size(&self, d: &mut FileDescriptor) {
        if d.size.is_some() {
            return;
        }
        if let Some(url) = d.direct_url.clone() {
            d.size = self
                .client
                .content_length(url, self.config.probe_timeout)
                .await;
            debug!(size = ?d.size, "size probe");
        }
    }
}

/// Runs the cascade and the link scan over `page`. `None` means nothing
/// usable was found.
pub fn extract(page: &Markup<'_>) -> Option<FileDescriptor> {
    let mut found = strategy::run_cascade(page).unwrap_or_default();
    if found.direct_url.is_none() {
        found.direct_url = strategy::direct_url(page);
        if found.provenance.is_none() && found.direct_url.is_some() {
            found.provenance = Some(Provenance::LinkScan);
        }
    }
    found.has_signal().then_some(found)
}

/// A filename from the last path segment of `url`, or a timestamped
/// placeholder.
pub fn synthesize_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(|s| {
            urlencoding::decode(s)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| s.to_owned())
        })
        .map(|s| s.replace(['/', '\\'], "_").trim().to_owned())
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| format!("terabox_file_{}", chrono::Utc::now().timestamp()))
}

fn is_challenge(body: &str) -> bool {
    let body = body.to_ascii_lowercase();
    CHALLENGE_MARKERS.iter().any(|m| body.contains(m))
}

/// The filename used when the page named none. `/sharing/link?surl=<key>`
/// links are named after their key.
fn fallback_filename(link: &ShareLink) -> String {
    let last = link
        .url()
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back());
    match (last, link.short_key()) {
        (Some("link"), Some(key)) if !key.is_empty() => key,
        _ => synthesize_filename(link.url()),
    }
}

#[async_trait::async_trait]
impl Resolve for Terabox {
    async fn resolve(&self, link: &ShareLink) -> TeraResult {
        info!(link = %link, key = ?link.short_key(), "resolving share link");
        let page = self.fetch(link).await?;
        let mut d = extract(&Markup::new(&page.body, &page.url))
            .context(err::NoDataExtracted { url: page.url.clone() })?;
        if d.filename.is_none() {
            d.filename = Some(fallback_filename(link));
        }
        self.backfill_size(&mut d).await;
        info!(
            filename = ?d.filename,
            size = ?d.size,
            direct = d.direct_url.is_some(),
            provenance = ?d.provenance,
            "resolved share link"
        );
        Ok(d)
    }
}

impl AsClient for Terabox {
    fn client(&self) -> &Client {
        &self.client
    }
    fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }
}
