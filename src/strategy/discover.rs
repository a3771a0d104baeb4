//! Direct-URL discovery over raw markup, used when no strategy found one.

use super::{absolute, unescape_js, Markup};
use lazy_regex::{lazy_regex, Lazy, Regex};
use url::Url;

static MEDIA_HREF: Lazy<Regex> = lazy_regex!(
    r#"(?i)href\s*=\s*["']((?:https?:)?//[^"']+?\.(?:mp4|avi|mkv|mov|webm|mp3|flac|pdf|zip|rar|7z|apk)[^"']*)["']"#
);
static DOWNLOAD_LINK: Lazy<Regex> = lazy_regex!(r#"(?i)\bdownloadLink\s*=\s*["']([^"']+)["']"#);
static REDIRECT: Lazy<Regex> =
    lazy_regex!(r#"(?i)\bwindow\.location(?:\.href)?\s*=\s*["']([^"']+)["']"#);

pub fn direct_url(page: &Markup<'_>) -> Option<Url> {
    [&*MEDIA_HREF, &*DOWNLOAD_LINK, &*REDIRECT]
        .into_iter()
        .flat_map(|re| re.captures_iter(page.html))
        .filter_map(|cap| cap.get(1))
        .map(|m| unescape_js(m.as_str()))
        .filter(|target| target.starts_with("http") || target.starts_with("//"))
        .find_map(|target| absolute(page.page_url, &target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(html: &str) -> Option<String> {
        let page = Url::parse("https://www.terabox.com/s/1abc").unwrap();
        direct_url(&Markup::new(html, &page)).map(String::from)
    }

    #[test]
    fn media_links_first() {
        let html = r#"<script>window.location.href = "https://www.terabox.com/login";</script>
            <a href="https://d.terabox.com/file/Movie.MKV?sign=1">x</a>"#;
        assert_eq!(
            find(html).as_deref(),
            Some("https://d.terabox.com/file/Movie.MKV?sign=1")
        );
    }

    #[test]
    fn script_variables() {
        assert_eq!(
            find(r#"var downloadLink = 'https:\/\/d.terabox.com\/get';"#).as_deref(),
            Some("https://d.terabox.com/get")
        );
        assert_eq!(
            find(r#"window.location = "//d.terabox.com/go";"#).as_deref(),
            Some("https://d.terabox.com/go")
        );
    }

    #[test]
    fn relative_targets_are_not_plausible() {
        assert_eq!(find(r#"var downloadLink = "/login"; <a href="/a.mp4">"#), None);
    }
}
