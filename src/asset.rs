//! Release asset naming and download URLs.

use crate::config::ReleaseConfig;
use crate::platform::PlatformSpec;

/// Archive container used for a platform's release asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    pub fn for_platform(platform: PlatformSpec) -> Self {
        if platform.os.is_windows() {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::TarGz
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Zip => "zip",
        }
    }
}

/// Everything needed to fetch one release asset. Built fresh per install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
    pub owner: String,
    pub repo: String,
    pub version: String,
    pub platform: PlatformSpec,
    pub asset_file_name: String,
    pub primary_url: String,
    pub fallback_url: String,
}

impl ReleaseTarget {
    /// Build the target, using the current time as the fallback cache-buster.
    pub fn locate(config: &ReleaseConfig, platform: PlatformSpec) -> Self {
        Self::locate_with_nonce(config, platform, chrono::Utc::now().timestamp_millis())
    }

    pub fn locate_with_nonce(config: &ReleaseConfig, platform: PlatformSpec, nonce: i64) -> Self {
        let asset_file_name = asset_file_name(&config.repo, platform);

        let primary_url = format!(
            "{}/{}/{}/releases/download/{}/{}",
            config.download_base, config.owner, config.repo, config.version, asset_file_name
        );
        let fallback_url = format!(
            "{}/repos/{}/{}/releases/download/{}/{}?t={}",
            config.api_base, config.owner, config.repo, config.version, asset_file_name, nonce
        );

        Self {
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            version: config.version.clone(),
            platform,
            asset_file_name,
            primary_url,
            fallback_url,
        }
    }

    pub fn format(&self) -> ArchiveFormat {
        ArchiveFormat::for_platform(self.platform)
    }
}

/// `<repo>_<OsToken>_<ArchToken>.<ext>`
pub fn asset_file_name(repo: &str, platform: PlatformSpec) -> String {
    format!(
        "{}_{}_{}.{}",
        repo,
        platform.os,
        platform.arch,
        ArchiveFormat::for_platform(platform).extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ArchToken, OsToken};

    #[test]
    fn test_asset_names_for_all_platforms() {
        for os in OsToken::ALL {
            for arch in ArchToken::ALL {
                let platform = PlatformSpec { os, arch };
                let name = asset_file_name("rulesctl", platform);
                let ext = if os == OsToken::Windows { "zip" } else { "tar.gz" };
                assert_eq!(name, format!("rulesctl_{}_{}.{}", os, arch, ext));
            }
        }
    }

    #[test]
    fn test_darwin_arm64_scenario() {
        let config = ReleaseConfig::default().with_version("v0.1.3");
        let platform = PlatformSpec::resolve("darwin", "arm64").unwrap();
        let target = ReleaseTarget::locate_with_nonce(&config, platform, 1700000000000);

        assert_eq!(target.asset_file_name, "rulesctl_Darwin_arm64.tar.gz");
        assert_eq!(
            target.primary_url,
            "https://github.com/choigawoon/rulesctl/releases/download/v0.1.3/rulesctl_Darwin_arm64.tar.gz"
        );
        assert_eq!(
            target.fallback_url,
            "https://api.github.com/repos/choigawoon/rulesctl/releases/download/v0.1.3/rulesctl_Darwin_arm64.tar.gz?t=1700000000000"
        );
        assert_eq!(target.format(), ArchiveFormat::TarGz);
    }

    #[test]
    fn test_windows_uses_zip() {
        let config = ReleaseConfig::default();
        let platform = PlatformSpec::resolve("windows", "x86_64").unwrap();
        let target = ReleaseTarget::locate(&config, platform);

        assert_eq!(target.format(), ArchiveFormat::Zip);
        assert!(target.primary_url.ends_with("/rulesctl_Windows_x86_64.zip"));
        assert!(target.fallback_url.contains("/rulesctl_Windows_x86_64.zip?t="));
    }

    #[test]
    fn test_custom_bases() {
        let config = ReleaseConfig::default()
            .with_download_base("http://127.0.0.1:8080/")
            .with_api_base("http://127.0.0.1:8081");
        let platform = PlatformSpec::resolve("linux", "x86_64").unwrap();
        let target = ReleaseTarget::locate_with_nonce(&config, platform, 1);

        assert_eq!(
            target.primary_url,
            "http://127.0.0.1:8080/choigawoon/rulesctl/releases/download/v0.1.3/rulesctl_Linux_x86_64.tar.gz"
        );
        assert_eq!(
            target.fallback_url,
            "http://127.0.0.1:8081/repos/choigawoon/rulesctl/releases/download/v0.1.3/rulesctl_Linux_x86_64.tar.gz?t=1"
        );
    }
}
