use crate::error::{self as err, Error};
use once_cell::sync::Lazy;
use reqwest::{
    header,
    header::{HeaderMap, HeaderValue},
    Response,
};
use snafu::{ResultExt, Snafu};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::ClientBuilder::new()
        .gzip(true)
        .connect_timeout(Duration::from_secs(15))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});
pub const UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
/// What a desktop browser sends on a top-level navigation.
pub static BROWSER_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    crate::hdmap! {
        header::USER_AGENT => UA,
        header::ACCEPT => "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        header::ACCEPT_LANGUAGE => "en-US,en;q=0.5",
        header::DNT => "1",
        header::UPGRADE_INSECURE_REQUESTS => "1",
        header::CACHE_CONTROL => "max-age=0",
        "sec-fetch-dest" => "document",
        "sec-fetch-mode" => "navigate",
        "sec-fetch-site" => "none",
        "sec-fetch-user" => "?1",
    }
});

#[derive(Debug, Clone)]
pub struct Client {
    inner: reqwest::Client,
    header: HeaderMap,
}

#[derive(Debug, Snafu)]
pub enum ClientError {
    #[snafu(context(false))]
    IoError { source: std::io::Error },
    #[snafu(context(false))]
    InvalidNetscapeCookie { source: nescookie::error::Error },
    #[snafu(context(false))]
    InvalidCookie { source: header::InvalidHeaderValue },
}

/// A fetched HTML page together with the URL it ended up at.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

impl Client {
    fn with_details(inner: reqwest::Client, header: HeaderMap) -> Self {
        Self { inner, header }
    }
    pub fn new() -> Self {
        Self::with_details(CLIENT.clone(), BROWSER_HEADERS.clone())
    }
    /// Adds `cookie` to the single `Cookie` header sent with every request.
    pub fn push_cookie(&mut self, cookie: &str) -> Result<(), ClientError> {
        let cookie = cookie.trim().trim_end_matches(';').trim_end();
        if cookie.is_empty() {
            return Ok(());
        }
        let value = match self.header.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}; {}", existing, cookie),
            None => cookie.to_owned(),
        };
        self.header
            .insert(header::COOKIE, HeaderValue::from_str(&value)?);
        Ok(())
    }
    // todo: make this method async
    pub fn load_netscape_cookie(&mut self, cookie: impl AsRef<Path>) -> Result<(), ClientError> {
        let cookies = nescookie::open(cookie)?
            .iter()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect::<Vec<_>>()
            .join("; ");
        self.push_cookie(&cookies)?;
        Ok(())
    }
    pub fn header(&self) -> &HeaderMap {
        &self.header
    }
    /// GETs an HTML page, following redirects. Non-2xx statuses are errors.
    pub async fn get_page(&self, url: Url, timeout: Duration) -> Result<Page, Error> {
        let resp = self
            .inner
            .get(url.clone())
            .headers(self.header.clone())
            .timeout(timeout)
            .send()
            .await
            .and_then(Response::error_for_status)
            .context(err::FetchFailed { url: url.clone() })?;
        let final_url = resp.url().clone();
        let body = resp
            .text()
            .await
            .context(err::FetchFailed { url })?;
        Ok(Page {
            url: final_url,
            body,
        })
    }
    /// Reads `Content-Length` from a HEAD request. Any failure yields `None`.
    pub async fn content_length(&self, url: Url, timeout: Duration) -> Option<u64> {
        let resp = match self
            .inner
            .head(url.clone())
            .headers(self.header.clone())
            .timeout(timeout)
            .send()
            .await
            .and_then(Response::error_for_status)
        {
            Ok(resp) => resp,
            Err(e) => {
                debug!(%url, error = %e, "size probe failed");
                return None;
            }
        };
        resp.headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
    /// Starts a streamed GET. The body is left unread.
    pub async fn get_stream(&self, url: Url, timeout: Duration) -> Result<Response, Error> {
        self.inner
            .get(url.clone())
            .headers(self.header.clone())
            .timeout(timeout)
            .send()
            .await
            .context(err::TransferFailed { url })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_headers_look_like_a_browser() {
        let client = Client::new();
        let headers = client.header();
        assert_eq!(headers[header::USER_AGENT], UA);
        assert!(headers.contains_key(header::ACCEPT_LANGUAGE));
        assert_eq!(headers["sec-fetch-mode"], "navigate");
    }

    #[test]
    fn cookies_share_one_header() {
        let mut client = Client::new();
        client.push_cookie("ndus=abc;").unwrap();
        client.push_cookie("lang=en; csrf=1").unwrap();
        client.push_cookie("  ").unwrap();
        let cookies: Vec<_> = client.header().get_all(header::COOKIE).iter().collect();
        assert_eq!(cookies, ["ndus=abc; lang=en; csrf=1"]);
    }

    #[test]
    fn netscape_jar_joins_existing_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("cookies.txt");
        std::fs::write(
            &jar,
            ".terabox.com\tTRUE\t/\tTRUE\t0\tndus\tabc\n",
        )
        .unwrap();
        let mut client = Client::new();
        client.push_cookie("cf_clearance=x").unwrap();
        client.load_netscape_cookie(&jar).unwrap();
        let cookies: Vec<_> = client.header().get_all(header::COOKIE).iter().collect();
        assert_eq!(cookies, ["cf_clearance=x; ndus=abc"]);
    }

    #[test]
    fn bad_cookie_is_rejected() {
        let mut client = Client::new();
        assert!(matches!(
            client.push_cookie("bad\ncookie"),
            Err(ClientError::InvalidCookie { .. })
        ));
    }
}
