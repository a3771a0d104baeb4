use super::{absolute, non_empty, ExtractionStrategy, Markup};
use crate::utils::html;
use crate::{FileDescriptor, Provenance};

/// Social-preview `<meta>` tags. The title stands in for a filename.
pub struct MetaTags;

impl ExtractionStrategy for MetaTags {
    fn name(&self) -> &'static str {
        "meta-tags"
    }
    fn provenance(&self) -> Provenance {
        Provenance::MetaTags
    }
    fn extract(&self, page: &Markup<'_>) -> Option<FileDescriptor> {
        let mut d = FileDescriptor::default();
        for tag in html::start_tags(page.html, &["meta"]) {
            let key = match tag.attr("property").or_else(|| tag.attr("name")) {
                Some(key) => key.to_ascii_lowercase(),
                None => continue,
            };
            let content = match tag.attr("content") {
                Some(content) => content,
                None => continue,
            };
            let slot = match key.as_str() {
                "og:title" | "twitter:title" => &mut d.filename,
                "og:description" | "description" => &mut d.description,
                "og:url" => &mut d.canonical_url,
                "og:type" => &mut d.content_type,
                "og:video" | "og:video:url" | "og:video:secure_url" | "og:audio" => {
                    if d.direct_url.is_none() {
                        d.direct_url = absolute(page.page_url, &content);
                    }
                    continue;
                }
                _ => continue,
            };
            if slot.is_none() {
                *slot = match key.as_str() {
                    "og:title" | "twitter:title" => percent_decoded(&content),
                    _ => non_empty(&content),
                };
            }
        }
        Some(d)
    }
}

fn percent_decoded(s: &str) -> Option<String> {
    match urlencoding::decode(s) {
        Ok(decoded) => non_empty(decoded),
        Err(_) => non_empty(s),
    }
}
