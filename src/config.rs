//! Release coordinates and install location for the wrapped `rulesctl` binary.
//!
//! Everything that identifies *which* binary gets installed, and *where* it
//! comes from, lives in [`ReleaseConfig`]. The defaults are baked into the
//! launcher; the `RULESCTL_*` environment variables override them, in the same
//! spirit as `HOMEBREW_PREFIX` overriding a detected prefix.
//!
//! | Variable                 | Field           |
//! |--------------------------|-----------------|
//! | `RULESCTL_VERSION`       | `version`       |
//! | `RULESCTL_INSTALL_DIR`   | `install_dir`   |
//! | `RULESCTL_DOWNLOAD_BASE` | `download_base` |
//! | `RULESCTL_API_BASE`      | `api_base`      |
//! | `RULESCTL_MAX_REDIRECTS` | `max_redirects` |

use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_OWNER: &str = "choigawoon";
pub const DEFAULT_REPO: &str = "rulesctl";
pub const DEFAULT_VERSION: &str = "v0.1.3";
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Fixed identifiers for the release this launcher installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    pub owner: String,
    pub repo: String,
    pub version: String,
    /// Base for direct release-asset downloads (`<base>/<owner>/<repo>/releases/...`)
    pub download_base: String,
    /// Base for the API-style fallback lookup (`<base>/repos/<owner>/<repo>/...`)
    pub api_base: String,
    pub install_dir: PathBuf,
    pub max_redirects: usize,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            version: DEFAULT_VERSION.to_string(),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            install_dir: default_install_dir(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ReleaseConfig {
    /// Defaults with `RULESCTL_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(version) = var("RULESCTL_VERSION") {
            config = config.with_version(&version);
        }
        if let Some(dir) = var("RULESCTL_INSTALL_DIR") {
            config.install_dir = PathBuf::from(dir);
        }
        if let Some(base) = var("RULESCTL_DOWNLOAD_BASE") {
            config = config.with_download_base(&base);
        }
        if let Some(base) = var("RULESCTL_API_BASE") {
            config = config.with_api_base(&base);
        }
        if let Some(raw) = var("RULESCTL_MAX_REDIRECTS") {
            match raw.trim().parse::<usize>() {
                Ok(n) => config.max_redirects = n,
                Err(_) => warn!(
                    "Ignoring RULESCTL_MAX_REDIRECTS={:?}: not a number, using {}",
                    raw, config.max_redirects
                ),
            }
        }

        config
    }

    /// Set the release tag, adding the `v` prefix release tags carry.
    pub fn with_version(mut self, version: &str) -> Self {
        let version = version.trim();
        self.version = if version.starts_with('v') {
            version.to_string()
        } else {
            format!("v{}", version)
        };
        self
    }

    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = dir.into();
        self
    }

    pub fn with_download_base(mut self, base: &str) -> Self {
        self.download_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }
}

/// `bin/` next to the running executable, or `./bin` if that can't be found.
pub fn default_install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("bin")))
        .unwrap_or_else(|| PathBuf::from("bin"))
}
