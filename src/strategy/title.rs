use super::{non_empty, ExtractionStrategy, Markup};
use crate::utils::html;
use crate::{FileDescriptor, Provenance};
use lazy_regex::{lazy_regex, Lazy, Regex};

static TITLE: Lazy<Regex> = lazy_regex!(r"(?is)<title[^>]*>(.*?)</title\s*>");
const SEPARATORS: &[&str] = &[" - ", " | ", " – ", " — "];

/// Last resort: `"<name> - TeraBox"` style document titles.
pub struct DocumentTitle;

impl ExtractionStrategy for DocumentTitle {
    fn name(&self) -> &'static str {
        "document-title"
    }
    fn provenance(&self) -> Provenance {
        Provenance::DocumentTitle
    }
    fn extract(&self, page: &Markup<'_>) -> Option<FileDescriptor> {
        let raw = TITLE.captures(page.html)?.get(1)?.as_str();
        let title = html::decode(raw);
        let cut = SEPARATORS.iter().filter_map(|sep| title.find(sep)).min()?;
        Some(FileDescriptor {
            filename: non_empty(&title[..cut]),
            ..FileDescriptor::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn filename(html: &str) -> Option<String> {
        let page = Url::parse("https://www.terabox.com/s/1abc").unwrap();
        DocumentTitle
            .extract(&Markup::new(html, &page))
            .and_then(|d| d.filename)
    }

    #[test]
    fn splits_at_first_separator() {
        assert_eq!(
            filename("<title>\n  a - b.mp4 | TeraBox - Share\n</title>").as_deref(),
            Some("a")
        );
        assert_eq!(
            filename("<TITLE>Tom &amp; Jerry.avi | TeraBox</TITLE>").as_deref(),
            Some("Tom & Jerry.avi")
        );
    }

    #[test]
    fn needs_a_separator() {
        assert_eq!(filename("<title>TeraBox</title>"), None);
        assert_eq!(filename("<title> - TeraBox</title>"), None);
        assert_eq!(filename("<html></html>"), None);
    }
}
