use crate::utils::client::ClientError;
use reqwest::StatusCode;
use snafu::Snafu;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("not a TeraBox share link: {}", input))]
    InvalidLink { input: String },
    #[snafu(display("failed to fetch {}: {}", url, source))]
    FetchFailed { url: Url, source: reqwest::Error },
    #[snafu(display("{} answered with an anti-bot challenge", url))]
    Challenged { url: Url },
    #[snafu(display("no file information found on {}", url))]
    NoDataExtracted { url: Url },
    #[snafu(display("no direct download URL is known"))]
    NoDirectUrl {},
    #[snafu(display("file is {} bytes, limit is {}", size, limit))]
    FileTooLarge { size: u64, limit: u64 },
    #[snafu(display("file type .{} is not allowed", extension))]
    ExtensionNotAllowed { extension: String },
    #[snafu(display("transfer from {} failed: {}", url, source))]
    TransferFailed { url: Url, source: reqwest::Error },
    #[snafu(display("{} responded with {}", url, status))]
    TransferStatus { url: Url, status: StatusCode },
    #[snafu(display("transfer from {} interrupted after {} of {} bytes", url, received, expected))]
    Interrupted {
        url: Url,
        received: u64,
        expected: u64,
    },
    #[snafu(display("temporary file {}: {}", path.display(), source))]
    TempFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("downloaded {} bytes, delivery limit is {}", size, limit))]
    DeliveryTooLarge { size: u64, limit: u64 },
    #[snafu(context(false))]
    Cookie { source: ClientError },
}

/// Coarse classification of [`Error`], one per user-facing outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidLink,
    FetchFailed,
    NoDataExtracted,
    FileTooLarge,
    ExtensionNotAllowed,
    TransferFailed,
    DeliveryTooLarge,
}

impl Error {
    pub fn invalid_link<S: ToString>(s: S) -> Self {
        Self::InvalidLink {
            input: s.to_string(),
        }
    }
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLink { .. } => ErrorKind::InvalidLink,
            Self::FetchFailed { .. } | Self::Challenged { .. } | Self::Cookie { .. } => {
                ErrorKind::FetchFailed
            }
            Self::NoDataExtracted { .. } | Self::NoDirectUrl { .. } => ErrorKind::NoDataExtracted,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::ExtensionNotAllowed { .. } => ErrorKind::ExtensionNotAllowed,
            Self::TransferFailed { .. }
            | Self::TransferStatus { .. }
            | Self::Interrupted { .. }
            | Self::TempFile { .. } => ErrorKind::TransferFailed,
            Self::DeliveryTooLarge { .. } => ErrorKind::DeliveryTooLarge,
        }
    }
    /// One line suitable for showing to the person who sent the link.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidLink { .. } => {
                "Not a valid TeraBox link. Example: https://terabox.com/s/XXXXX".to_owned()
            }
            Self::Challenged { .. } => {
                "TeraBox blocked the request with a bot check. Try again later or supply a cookie."
                    .to_owned()
            }
            Self::FetchFailed { .. } | Self::Cookie { .. } => {
                "Could not reach the share page. The link may be private, expired or the server is down."
                    .to_owned()
            }
            Self::NoDataExtracted { .. } => {
                "The share page was fetched but no file information could be found. Download it manually in a browser."
                    .to_owned()
            }
            Self::NoDirectUrl { .. } => {
                "No direct download is available for this file. Open the link in a browser and download it manually."
                    .to_owned()
            }
            Self::FileTooLarge { size, limit } => format!(
                "File is too large ({} MB, limit {} MB).",
                size / (1024 * 1024),
                limit / (1024 * 1024)
            ),
            Self::ExtensionNotAllowed { extension } => {
                format!("Files of type .{} are not accepted.", extension)
            }
            Self::TransferFailed { .. }
            | Self::TransferStatus { .. }
            | Self::Interrupted { .. }
            | Self::TempFile { .. } => "Download failed. Please try again later.".to_owned(),
            Self::DeliveryTooLarge { size, limit } => format!(
                "Downloaded {} MB, which is over the {} MB upload limit. The file was kept.",
                size / (1024 * 1024),
                limit / (1024 * 1024)
            ),
        }
    }
}
