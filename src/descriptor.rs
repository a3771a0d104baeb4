use serde::Serialize;
use url::Url;

/// Which step of resolution produced a [`FileDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    StructuredData,
    PageState,
    ScriptVariables,
    MetaTags,
    InlineMarkup,
    /// Derived from the document title only.
    DocumentTitle,
    LinkScan,
}

impl Provenance {
    pub const fn is_low_confidence(self) -> bool {
        matches!(self, Self::DocumentTitle)
    }
}

/// What is known about a shared file after resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileDescriptor {
    pub filename: Option<String>,
    /// Size in bytes.
    pub size: Option<u64>,
    pub direct_url: Option<Url>,
    pub checksum: Option<String>,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub canonical_url: Option<String>,
    pub provenance: Option<Provenance>,
}

impl FileDescriptor {
    pub fn new() -> Self {
        Self::default()
    }
    /// True when a filename, a size or a direct URL is known. Auxiliary
    /// fields alone do not count.
    pub fn has_signal(&self) -> bool {
        self.filename.is_some() || self.size.is_some() || self.direct_url.is_some()
    }
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
    /// Lowercased extension of the filename, without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.filename.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || ext.contains(char::is_whitespace) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
    pub fn is_low_confidence(&self) -> bool {
        self.provenance.map_or(false, Provenance::is_low_confidence)
    }
}
