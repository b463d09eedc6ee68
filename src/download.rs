//! Release asset download with bounded redirects and a fallback source

use crate::asset::ReleaseTarget;
use crate::error::{Result, ShimError};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{CACHE_CONTROL, EXPIRES, LOCATION, PRAGMA};
use reqwest::{StatusCode, Url, redirect};
use std::collections::HashSet;
use std::future::Future;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Identifying client header sent with every request
pub fn user_agent() -> String {
    format!("rulesctl-shim/{}", env!("CARGO_PKG_VERSION"))
}

/// The download stage of the install pipeline.
pub trait Fetch {
    /// Fetch `url` into `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = Result<u64>>;
}

/// Which of a target's URLs produced the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadSource {
    Primary,
    Fallback,
}

/// HTTP downloader that follows redirects itself, up to `max_redirects` hops.
pub struct Downloader {
    client: reqwest::Client,
    max_redirects: usize,
    show_progress: bool,
}

impl Downloader {
    pub fn new(max_redirects: usize) -> Result<Self> {
        // Redirects are handled in `resolve_redirects` so the hop limit and
        // loop detection stay under our control
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            client,
            max_redirects,
            show_progress: std::io::stderr().is_terminal(),
        })
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Download `url` to `dest`. Partial output is removed on failure.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self.resolve_redirects(url).await?;

        match self.write_body(response, dest).await {
            Ok(written) => Ok(written),
            Err(e) => {
                if fs::try_exists(dest).await.unwrap_or(false) {
                    debug!("Removing partial download {}", dest.display());
                    let _ = fs::remove_file(dest).await;
                }
                Err(e)
            }
        }
    }

    /// Issue the GET and follow redirects until a 200 arrives.
    async fn resolve_redirects(&self, url: &str) -> Result<reqwest::Response> {
        let mut current = Url::parse(url).map_err(|e| ShimError::download(url, e))?;
        let mut visited = HashSet::new();
        let mut hops = 0;

        loop {
            visited.insert(current.clone());
            debug!("GET {}", current);

            let response = self
                .client
                .get(current.clone())
                .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate")
                .header(PRAGMA, "no-cache")
                .header(EXPIRES, "0")
                .send()
                .await
                .map_err(|e| ShimError::download(current.as_str(), e))?;

            let status = response.status();
            if status == StatusCode::OK {
                return Ok(response);
            }
            if !is_followed_redirect(status) {
                return Err(ShimError::download(
                    current.as_str(),
                    format!("HTTP {}", status),
                ));
            }
            if hops >= self.max_redirects {
                return Err(ShimError::download(
                    url,
                    format!("too many redirects (limit {})", self.max_redirects),
                ));
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    ShimError::download(
                        current.as_str(),
                        format!("HTTP {} without a Location header", status),
                    )
                })?;
            let next = current.join(location).map_err(|e| {
                ShimError::download(
                    current.as_str(),
                    format!("invalid Location {:?}: {}", location, e),
                )
            })?;

            if visited.contains(&next) {
                return Err(ShimError::download(
                    url,
                    format!("redirect loop at {}", next),
                ));
            }

            debug!("HTTP {} from {} -> {}", status, current, next);
            current = next;
            hops += 1;
        }
    }

    async fn write_body(&self, mut response: reqwest::Response, dest: &Path) -> Result<u64> {
        let url = response.url().to_string();
        let pb = self.progress_bar(response.content_length(), dest);

        let mut file = fs::File::create(dest).await.map_err(|e| {
            ShimError::download(&url, format!("cannot create {}: {}", dest.display(), e))
        })?;
        let mut downloaded: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ShimError::download(&url, e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| ShimError::download(&url, e))?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await.map_err(|e| ShimError::download(&url, e))?;
        pb.finish_and_clear();

        Ok(downloaded)
    }

    fn progress_bar(&self, total: Option<u64>, dest: &Path) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total.unwrap_or(0));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(format!("⬇ {}", name));
        pb
    }
}

impl Fetch for Downloader {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        self.download(url, dest).await
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Try the target's primary URL, then its fallback exactly once.
pub async fn fetch_with_fallback<F: Fetch>(
    fetcher: &F,
    target: &ReleaseTarget,
    dest: &Path,
) -> Result<DownloadSource> {
    let primary = match fetcher.fetch(&target.primary_url, dest).await {
        Ok(bytes) => {
            info!("Downloaded {} ({} bytes)", target.primary_url, bytes);
            return Ok(DownloadSource::Primary);
        }
        Err(e) => e,
    };

    warn!("Primary download failed: {}; trying fallback", primary);

    match fetcher.fetch(&target.fallback_url, dest).await {
        Ok(bytes) => {
            info!("Downloaded {} ({} bytes)", target.fallback_url, bytes);
            Ok(DownloadSource::Fallback)
        }
        Err(fallback) => Err(ShimError::DownloadExhausted {
            primary: primary.to_string(),
            fallback: fallback.to_string(),
        }),
    }
}
