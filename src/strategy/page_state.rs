use super::{absolute, json_size, unescape_js, ExtractionStrategy, Markup};
use crate::utils::html;
use crate::{value_to_string, FileDescriptor, Provenance};
use lazy_regex::{lazy_regex, Lazy, Regex};
use serde_json::{Map, Value};

/// Scripts that hand the page its initial state.
static STATE_ASSIGNMENT: Lazy<Regex> = lazy_regex!(
    r"(?:window\.jsData|window\.__INITIAL_STATE__|\byunData|\blocals\.mset\s*\()\s*=?\s*\{"
);
const LIST_KEYS: &[&str] = &["file_list", "list"];
const NAME_KEYS: &[&str] = &["server_filename", "filename", "file_name"];

/// The page-state object embedded in an inline script.
pub struct PageState;

impl ExtractionStrategy for PageState {
    fn name(&self) -> &'static str {
        "page-state"
    }
    fn provenance(&self) -> Provenance {
        Provenance::PageState
    }
    fn extract(&self, page: &Markup<'_>) -> Option<FileDescriptor> {
        STATE_ASSIGNMENT
            .find_iter(page.html)
            .filter_map(|m| {
                // the match ends on the opening brace
                html::balanced_object(&page.html[m.end() - 1..])
            })
            .filter_map(|obj| serde_json::from_str::<Value>(obj).ok())
            .find_map(|state| find_file_record(&state).map(|rec| describe(rec, page)))
    }
}

/// The first object that looks like a file entry, preferring entries of a
/// file list.
fn find_file_record(v: &Value) -> Option<&Map<String, Value>> {
    match v {
        Value::Object(map) => LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(find_file_record))
            .or_else(|| {
                NAME_KEYS
                    .iter()
                    .any(|key| map.get(*key).map_or(false, Value::is_string))
                    .then_some(map)
            })
            .or_else(|| map.values().find_map(find_file_record)),
        Value::Array(items) => items.iter().find_map(find_file_record),
        _ => None,
    }
}

fn describe(rec: &Map<String, Value>, page: &Markup<'_>) -> FileDescriptor {
    let field = |key: &str| rec.get(key).unwrap_or(&Value::Null);
    let direct_url = value_to_string!(
        field("dlink"),
        field("download_url"),
        field("downloadUrl"),
        field("downloadLink"),
    )
    .and_then(|u| absolute(page.page_url, &unescape_js(&u)));
    FileDescriptor {
        filename: value_to_string!(
            field("server_filename"),
            field("filename"),
            field("file_name"),
        ),
        size: json_size(field("size")).or_else(|| json_size(field("file_size"))),
        direct_url,
        checksum: value_to_string!(field("md5")),
        ..FileDescriptor::default()
    }
}
