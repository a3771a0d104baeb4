//! Streaming a resolved file to disk.

use crate::error as err;
use crate::resolver::synthesize_filename;
use crate::utils::Client;
use crate::{FileDescriptor, Limits, TeraResult};
use futures_util::StreamExt;
use serde::Deserialize;
use snafu::{ensure, OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const NAME_MAX: usize = 255;
const MAX_RENAME_ATTEMPTS: u32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

impl Progress {
    pub fn percent(&self) -> Option<f64> {
        self.total
            .filter(|t| *t > 0)
            .map(|t| self.downloaded as f64 * 100.0 / t as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    #[serde(with = "crate::resolver::secs")]
    pub timeout: Duration,
    /// Bytes between two progress reports.
    pub progress_step: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60 * 60),
            progress_step: 1024 * 1024,
        }
    }
}

/// A completed transfer held in a temporary file. The file is removed when
/// this value is dropped, unless it was persisted.
#[derive(Debug)]
pub struct Downloaded {
    path: TempPath,
    filename: String,
    size: u64,
}

impl Downloaded {
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn filename(&self) -> &str {
        &self.filename
    }
    pub fn size(&self) -> u64 {
        self.size
    }
    pub fn check_delivery(&self, limit: u64) -> TeraResult<()> {
        ensure!(
            self.size <= limit,
            err::DeliveryTooLarge {
                size: self.size,
                limit
            }
        );
        Ok(())
    }
    /// Moves the file into `dir` under its sanitized name, picking
    /// `name (n).ext` if that is taken.
    pub fn persist(self, dir: &Path) -> TeraResult<PathBuf> {
        let target = unique_path(&dir.join(sanitize_filename(&self.filename)));
        self.path
            .persist(&target)
            .map_err(|e| e.error)
            .context(err::TempFile {
                path: target.clone(),
            })?;
        info!(path = %target.display(), "saved");
        Ok(target)
    }
}

/// Streams `d.direct_url` into a temporary file under `dir`.
///
/// `limits` is checked before the request, against the announced length and
/// again while bytes arrive. Only a `Content-Length` sent with the transfer
/// itself counts as the expected size. On any error the partial file is
/// removed.
pub async fn download<F: FnMut(Progress)>(
    client: &Client,
    d: &FileDescriptor,
    dir: &Path,
    limits: &Limits,
    config: &TransferConfig,
    mut on_progress: F,
) -> TeraResult<Downloaded> {
    limits.admit(d)?;
    let url = d.direct_url.clone().context(err::NoDirectUrl {})?;
    let filename = d
        .filename
        .clone()
        .unwrap_or_else(|| synthesize_filename(&url));
    info!(%url, %filename, "starting transfer");

    let resp = client.get_stream(url.clone(), config.timeout).await?;
    let status = resp.status();
    ensure!(
        status.is_success(),
        err::TransferStatus {
            url: url.clone(),
            status
        }
    );
    let declared = resp.content_length();
    // the descriptor size only feeds the progress display
    let total = declared.or(d.size);
    if let Some(size) = declared {
        ensure!(
            size <= limits.max_file_size,
            err::FileTooLarge {
                size,
                limit: limits.max_file_size
            }
        );
    }

    let (file, path) = tempfile::Builder::new()
        .prefix("teradl-")
        .tempfile_in(dir)
        .context(err::TempFile { path: dir })?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);
    debug!(path = %path.display(), ?declared, ?total, "writing to temporary file");

    let mut downloaded = 0u64;
    let mut reported = 0u64;
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context(err::TransferFailed { url: url.clone() })?;
        downloaded += chunk.len() as u64;
        ensure!(
            downloaded <= limits.max_file_size,
            err::FileTooLarge {
                size: downloaded,
                limit: limits.max_file_size
            }
        );
        file.write_all(&chunk)
            .await
            .context(err::TempFile { path: &*path })?;
        if downloaded - reported >= config.progress_step.max(1) {
            reported = downloaded;
            on_progress(Progress { downloaded, total });
        }
    }
    file.flush().await.context(err::TempFile { path: &*path })?;
    drop(file);

    if let Some(expected) = declared {
        ensure!(
            downloaded >= expected,
            err::Interrupted {
                url,
                received: downloaded,
                expected
            }
        );
    }
    on_progress(Progress { downloaded, total });
    info!(%filename, size = downloaded, "transfer complete");
    Ok(Downloaded {
        path,
        filename,
        size: downloaded,
    })
}

/// Makes `name` safe to use as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    match &trimmed[..take] {
        "" => "terabox_file".to_owned(),
        s => s.to_owned(),
    }
}

fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());
    (1..=MAX_RENAME_ATTEMPTS)
        .map(|i| match &extension {
            Some(ext) => parent.join(format!("{} ({}).{}", stem, i, ext)),
            None => parent.join(format!("{} ({})", stem, i)),
        })
        .find(|p| !p.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
