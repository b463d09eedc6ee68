//! Install pipeline: platform → release target → download → extract → install

use crate::asset::ReleaseTarget;
use crate::config::ReleaseConfig;
use crate::download::{Downloader, Fetch, fetch_with_fallback};
use crate::error::Result;
use crate::extract::{InstalledBinary, extract_and_install};
use crate::platform::PlatformSpec;
use tokio::fs;
use tracing::{debug, info};

/// Drives a full install. Every run overwrites the installed binary.
pub struct InstallationManager<F = Downloader> {
    config: ReleaseConfig,
    fetcher: F,
}

impl InstallationManager<Downloader> {
    pub fn new(config: ReleaseConfig) -> Result<Self> {
        let fetcher = Downloader::new(config.max_redirects)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetch> InstallationManager<F> {
    pub fn with_fetcher(config: ReleaseConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// Install the release for the host platform.
    pub async fn install(&self) -> Result<InstalledBinary> {
        self.install_for(std::env::consts::OS, std::env::consts::ARCH)
            .await
    }

    /// Install the release for an explicit `(os, arch)` pair.
    ///
    /// An unsupported pair fails here, before any request is made.
    #[tracing::instrument(skip(self))]
    pub async fn install_for(&self, os: &str, arch: &str) -> Result<InstalledBinary> {
        let platform = PlatformSpec::resolve(os, arch)?;
        self.install_platform(platform).await
    }

    async fn install_platform(&self, platform: PlatformSpec) -> Result<InstalledBinary> {
        let target = ReleaseTarget::locate(&self.config, platform);
        info!(
            "Installing {}/{} {} for {}",
            target.owner, target.repo, target.version, platform
        );

        fs::create_dir_all(&self.config.install_dir).await?;

        // Dropping the guard removes the archive if anything below fails
        let download_dir = tempfile::Builder::new()
            .prefix("rulesctl-download-")
            .tempdir()?;
        let archive_path = download_dir.path().join(&target.asset_file_name);

        let source = fetch_with_fallback(&self.fetcher, &target, &archive_path).await?;
        debug!("Archive fetched from {:?} source", source);

        let installed = extract_and_install(
            &archive_path,
            &self.config.install_dir,
            platform,
            &target.repo,
        )
        .await?;

        info!("Installed {}", installed.path.display());
        Ok(installed)
    }
}
