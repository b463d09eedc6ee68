use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShimError {
    #[error("Unsupported platform: {os} {arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Download failed from all sources (primary: {primary}; fallback: {fallback})")]
    DownloadExhausted { primary: String, fallback: String },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error(
        "Binary not found at {}. Run `rulesctl install` to reinstall it.",
        .0.display()
    )]
    BinaryNotFound(PathBuf),

    #[error("Failed to start {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl ShimError {
    pub(crate) fn download(url: impl Into<String>, reason: impl ToString) -> Self {
        ShimError::Download {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn extraction(reason: impl ToString) -> Self {
        ShimError::Extraction(reason.to_string())
    }

    /// True for failures of the download stage, single-source or exhausted.
    pub fn is_download(&self) -> bool {
        matches!(
            self,
            ShimError::Download { .. } | ShimError::DownloadExhausted { .. } | ShimError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ShimError>;
