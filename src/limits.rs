use crate::error as err;
use crate::{FileDescriptor, TeraResult};
use serde::Deserialize;
use snafu::ensure;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;
/// Bot API upload ceiling.
pub const DEFAULT_DELIVERY_LIMIT: u64 = 50 * 1024 * 1024;

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    // video
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v",
    // audio
    "mp3", "wav", "flac", "aac", "ogg", "m4a",
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg",
    // documents
    "pdf", "doc", "docx", "txt", "rtf", "xls", "xlsx", "ppt", "pptx",
    // archives
    "zip", "rar", "7z", "tar", "gz", "bz2",
    "apk", "exe", "iso", "torrent",
];

/// What the caller is willing to transfer and deliver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_file_size: u64,
    /// Lowercase, without the dot. Empty accepts everything.
    pub allowed_extensions: Vec<String>,
    pub delivery_limit: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_owned()).collect(),
            delivery_limit: DEFAULT_DELIVERY_LIMIT,
        }
    }
}

impl Limits {
    pub fn extension_allowed(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.allowed_extensions.is_empty()
            || self
                .allowed_extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
    /// Checks a resolved file before any byte is transferred. Unknown sizes
    /// and extensionless names pass.
    pub fn admit(&self, d: &FileDescriptor) -> TeraResult<()> {
        if let Some(size) = d.size {
            ensure!(
                size <= self.max_file_size,
                err::FileTooLarge {
                    size,
                    limit: self.max_file_size
                }
            );
        }
        if let Some(extension) = d.extension() {
            ensure!(
                self.extension_allowed(&extension),
                err::ExtensionNotAllowed { extension }
            );
        }
        Ok(())
    }
}
