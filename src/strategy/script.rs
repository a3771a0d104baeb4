use super::{absolute, non_empty, unescape_js, ExtractionStrategy, Markup};
use crate::{FileDescriptor, Provenance};
use lazy_regex::{lazy_regex, Lazy, Regex};

static FILE_NAME: Lazy<Regex> = lazy_regex!(r#"(?i)\bfile_name\s*[=:]\s*["']([^"']+)["']"#);
static FILE_SIZE: Lazy<Regex> = lazy_regex!(r"(?i)\bfile_size\s*[=:]\s*(\d+)");
static FILE_URL: Lazy<Regex> =
    lazy_regex!(r#"(?i)\b(?:downloadUrl|file_url)\s*[=:]\s*["']([^"']+)["']"#);
static FILE_MD5: Lazy<Regex> = lazy_regex!(r#"(?i)\bfile_md5\s*[=:]\s*["']([^"']+)["']"#);

/// Loose `file_name = "..."` style assignments in page scripts.
pub struct ScriptVariables;

fn first<'a>(re: &Regex, html: &'a str) -> Option<&'a str> {
    re.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str())
}

impl ExtractionStrategy for ScriptVariables {
    fn name(&self) -> &'static str {
        "script-variables"
    }
    fn provenance(&self) -> Provenance {
        Provenance::ScriptVariables
    }
    fn extract(&self, page: &Markup<'_>) -> Option<FileDescriptor> {
        let html = page.html;
        Some(FileDescriptor {
            filename: first(&FILE_NAME, html).and_then(non_empty),
            size: first(&FILE_SIZE, html).and_then(|s| s.parse().ok()),
            direct_url: first(&FILE_URL, html)
                .and_then(|u| absolute(page.page_url, &unescape_js(u))),
            checksum: first(&FILE_MD5, html).and_then(non_empty),
            ..FileDescriptor::default()
        })
    }
}
