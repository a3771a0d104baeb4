//! Just enough HTML scanning for share pages.
//!
//! Share pages are server-rendered and change often, so nothing here builds a
//! DOM. Tags are matched lexically and attribute values are entity-decoded.

use lazy_regex::{lazy_regex, Lazy, Regex};
use std::borrow::Cow;

static START_TAG: Lazy<Regex> = lazy_regex!(r"(?s)<([a-zA-Z][a-zA-Z0-9]*)\b([^>]*)>");
static ATTRIBUTE: Lazy<Regex> = lazy_regex!(
    r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#
);
static SCRIPT: Lazy<Regex> = lazy_regex!(r"(?is)<script\b([^>]*)>(.*?)</script\s*>");

/// A start tag, e.g. `<meta property="og:title" content="x">`.
#[derive(Debug, Clone, Copy)]
pub struct Tag<'a> {
    name: &'a str,
    attrs: &'a str,
}

impl<'a> Tag<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
    fn raw_attrs(&self) -> impl Iterator<Item = (&'a str, Option<&'a str>)> {
        ATTRIBUTE.captures_iter(self.attrs).filter_map(|cap| {
            let name = cap.get(1)?.as_str();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| m.as_str());
            Some((name, value))
        })
    }
    pub fn has_attr(&self, name: &str) -> bool {
        self.raw_attrs().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
    /// Decoded value of `name`. Valueless attributes give `Some("")`.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.raw_attrs()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| decode(v.unwrap_or_default()).into_owned())
    }
}

/// Start tags named any of `names`, in document order.
pub fn start_tags<'a>(html: &'a str, names: &'a [&'a str]) -> impl Iterator<Item = Tag<'a>> + 'a {
    START_TAG.captures_iter(html).filter_map(move |cap| {
        let tag = Tag {
            name: cap.get(1)?.as_str(),
            attrs: cap.get(2).map_or("", |m| m.as_str()),
        };
        names.iter().any(|n| tag.is(n)).then_some(tag)
    })
}

/// `<script>` elements as (start tag, body).
pub fn scripts(html: &str) -> impl Iterator<Item = (Tag<'_>, &str)> {
    SCRIPT.captures_iter(html).filter_map(|cap| {
        let tag = Tag {
            name: "script",
            attrs: cap.get(1).map_or("", |m| m.as_str()),
        };
        Some((tag, cap.get(2)?.as_str()))
    })
}

pub fn decode(s: &str) -> Cow<'_, str> {
    match html_escape::decode_html_entities(s) {
        Cow::Borrowed(b) => Cow::Borrowed(b.trim()),
        Cow::Owned(o) => Cow::Owned(o.trim().to_owned()),
    }
}

/// The JSON-ish object starting at the first `{` of `s`, braces balanced and
/// string literals skipped.
pub fn balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in s[start..].char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
