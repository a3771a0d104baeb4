use super::{absolute, non_empty, ExtractionStrategy, Markup};
use crate::utils::html::{self, Tag};
use crate::{FileDescriptor, Provenance};

/// Media elements with a direct `src`, or anchors marked as download links.
pub struct InlineMarkup;

impl ExtractionStrategy for InlineMarkup {
    fn name(&self) -> &'static str {
        "inline-markup"
    }
    fn provenance(&self) -> Provenance {
        Provenance::InlineMarkup
    }
    fn extract(&self, page: &Markup<'_>) -> Option<FileDescriptor> {
        html::start_tags(page.html, &["video", "audio", "source", "a"]).find_map(|tag| {
            if tag.is("a") {
                if !is_download_anchor(&tag) {
                    return None;
                }
                let direct_url = absolute(page.page_url, &tag.attr("href")?)?;
                Some(FileDescriptor {
                    filename: tag.attr("download").and_then(non_empty),
                    direct_url: Some(direct_url),
                    ..FileDescriptor::default()
                })
            } else {
                let direct_url = absolute(page.page_url, &tag.attr("src")?)?;
                Some(FileDescriptor {
                    direct_url: Some(direct_url),
                    content_type: tag.attr("type").and_then(non_empty),
                    ..FileDescriptor::default()
                })
            }
        })
    }
}

fn is_download_anchor(tag: &Tag<'_>) -> bool {
    tag.has_attr("download")
        || ["class", "id"].iter().any(|attr| {
            tag.attr(attr)
                .map_or(false, |v| v.to_ascii_lowercase().contains("download"))
        })
}
