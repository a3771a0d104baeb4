use super::{absolute, json_size, ExtractionStrategy, Markup};
use crate::utils::html;
use crate::{value_to_string, FileDescriptor, Provenance};
use serde_json::{Map, Value};

/// `<script type="application/ld+json">` blocks describing the shared file.
pub struct StructuredData;

impl ExtractionStrategy for StructuredData {
    fn name(&self) -> &'static str {
        "structured-data"
    }
    fn provenance(&self) -> Provenance {
        Provenance::StructuredData
    }
    fn extract(&self, page: &Markup<'_>) -> Option<FileDescriptor> {
        html::scripts(page.html)
            .filter(|(tag, _)| {
                tag.attr("type")
                    .map_or(false, |t| t.eq_ignore_ascii_case("application/ld+json"))
            })
            .filter_map(|(_, body)| serde_json::from_str::<Value>(body.trim()).ok())
            .find_map(|data| find_named(&data).map(|obj| describe(obj, page)))
    }
}

/// First object with a usable `name`, looking through arrays and `@graph`.
fn find_named(data: &Value) -> Option<&Map<String, Value>> {
    match data {
        Value::Array(items) => items.iter().find_map(find_named),
        Value::Object(obj) => {
            if value_to_string!(obj.get("name").unwrap_or(&Value::Null)).is_some() {
                Some(obj)
            } else {
                obj.get("@graph").and_then(find_named)
            }
        }
        _ => None,
    }
}

fn describe(obj: &Map<String, Value>, page: &Markup<'_>) -> FileDescriptor {
    let field = |key: &str| obj.get(key).unwrap_or(&Value::Null);
    FileDescriptor {
        filename: value_to_string!(field("name")),
        size: json_size(field("contentSize")),
        description: value_to_string!(field("description")),
        direct_url: value_to_string!(field("contentUrl")).and_then(|u| absolute(page.page_url, &u)),
        content_type: value_to_string!(field("encodingFormat")),
        ..FileDescriptor::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn extract(html: &str) -> Option<FileDescriptor> {
        let page = Url::parse("https://www.terabox.com/s/1abc").unwrap();
        StructuredData.extract(&Markup::new(html, &page))
    }

    #[test]
    fn name_and_size() {
        let d = extract(
            r#"<script type="application/ld+json">{"name":"movie.mp4","contentSize":104857600}</script>"#,
        )
        .unwrap();
        assert_eq!(d.filename.as_deref(), Some("movie.mp4"));
        assert_eq!(d.size, Some(104857600));
        assert_eq!(d.description, None);
        assert_eq!(d.direct_url, None);
    }

    #[test]
    fn graph_and_extra_fields() {
        let d = extract(
            r#"<script type='application/ld+json'>
            {"@context":"https://schema.org","@graph":[
                {"@type":"WebSite","url":"https://www.terabox.com"},
                {"@type":"VideoObject","name":" clip.mkv ","contentSize":"2 MB",
                 "description":"holiday","contentUrl":"/file/clip.mkv","encodingFormat":"video/x-matroska"}
            ]}</script>"#,
        )
        .unwrap();
        assert_eq!(d.filename.as_deref(), Some("clip.mkv"));
        assert_eq!(d.size, Some(2 * 1024 * 1024));
        assert_eq!(d.description.as_deref(), Some("holiday"));
        assert_eq!(
            d.direct_url.unwrap().as_str(),
            "https://www.terabox.com/file/clip.mkv"
        );
        assert_eq!(d.content_type.as_deref(), Some("video/x-matroska"));
    }

    #[test]
    fn skips_broken_and_nameless_blocks() {
        let d = extract(
            r#"<script type="application/ld+json">{not json</script>
            <script type="application/ld+json">{"@type":"Organization"}</script>
            <script type="application/ld+json">[{"name":"second.zip"}]</script>"#,
        )
        .unwrap();
        assert_eq!(d.filename.as_deref(), Some("second.zip"));
    }

    #[test]
    fn ignores_other_scripts() {
        assert_eq!(extract(r#"<script>{"name":"x.mp4"}</script>"#), None);
    }
}
