//! Platform detection for selecting the correct release asset.
//!
//! This module maps the host OS and CPU architecture onto the naming tokens
//! goreleaser uses for `rulesctl` release archives:
//! - **OS tokens**: `Darwin`, `Linux`, `Windows`
//! - **Architecture tokens**: `x86_64`, `arm64`, `i386`
//!
//! # Asset Naming
//!
//! Archives are named `<repo>_<OsToken>_<ArchToken>.<ext>`:
//! - `rulesctl_Darwin_arm64.tar.gz` - Apple Silicon
//! - `rulesctl_Linux_x86_64.tar.gz` - 64-bit Linux
//! - `rulesctl_Windows_x86_64.zip` - 64-bit Windows
//!
//! The table is closed: any identifier outside it is rejected with
//! [`ShimError::UnsupportedPlatform`] before anything touches the network.
//!
//! # Examples
//!
//! ```no_run
//! use rulesctl_shim::platform::PlatformSpec;
//!
//! fn main() -> rulesctl_shim::Result<()> {
//!     let platform = PlatformSpec::detect()?;
//!     println!("This system needs: {}", platform);
//!     // Output: "Darwin_arm64" on an M-series Mac
//!     Ok(())
//! }
//! ```

use crate::error::{Result, ShimError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsToken {
    Darwin,
    Linux,
    Windows,
}

impl OsToken {
    pub const ALL: [OsToken; 3] = [OsToken::Darwin, OsToken::Linux, OsToken::Windows];

    /// Map an OS identifier onto its token.
    ///
    /// Accepts Rust's `std::env::consts::OS` values as well as the
    /// `darwin`/`win32` spellings other toolchains report.
    pub fn from_identifier(os: &str) -> Option<Self> {
        match os.to_ascii_lowercase().as_str() {
            "macos" | "darwin" => Some(OsToken::Darwin),
            "linux" => Some(OsToken::Linux),
            "windows" | "win32" => Some(OsToken::Windows),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsToken::Darwin => "Darwin",
            OsToken::Linux => "Linux",
            OsToken::Windows => "Windows",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, OsToken::Windows)
    }

    /// Name of the executable inside the release archive.
    pub fn archived_binary_name(&self, repo: &str) -> String {
        if self.is_windows() {
            format!("{}.exe", repo)
        } else {
            repo.to_string()
        }
    }

    /// Name the binary is installed under: `<repo>-win.exe` or `<repo>-<os>`.
    pub fn installed_binary_name(&self, repo: &str) -> String {
        match self {
            OsToken::Windows => format!("{}-win.exe", repo),
            other => format!("{}-{}", repo, other.as_str().to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for OsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchToken {
    X86_64,
    Arm64,
    I386,
}

impl ArchToken {
    pub const ALL: [ArchToken; 3] = [ArchToken::X86_64, ArchToken::Arm64, ArchToken::I386];

    pub fn from_identifier(arch: &str) -> Option<Self> {
        // goreleaser uses "arm64" not "aarch64"
        match arch.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Some(ArchToken::X86_64),
            "aarch64" | "arm64" => Some(ArchToken::Arm64),
            "x86" | "i386" | "i686" | "ia32" => Some(ArchToken::I386),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchToken::X86_64 => "x86_64",
            ArchToken::Arm64 => "arm64",
            ArchToken::I386 => "i386",
        }
    }
}

impl fmt::Display for ArchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host platform as release-asset naming tokens. Immutable once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformSpec {
    pub os: OsToken,
    pub arch: ArchToken,
}

impl PlatformSpec {
    /// Detect the current system platform.
    ///
    /// # Errors
    ///
    /// Returns [`ShimError::UnsupportedPlatform`] if the OS or architecture
    /// this binary was built for has no release asset.
    pub fn detect() -> Result<Self> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Resolve an explicit `(os, arch)` identifier pair.
    ///
    /// ```
    /// use rulesctl_shim::platform::{ArchToken, OsToken, PlatformSpec};
    ///
    /// let spec = PlatformSpec::resolve("darwin", "aarch64").unwrap();
    /// assert_eq!(spec.os, OsToken::Darwin);
    /// assert_eq!(spec.arch, ArchToken::Arm64);
    /// ```
    pub fn resolve(os: &str, arch: &str) -> Result<Self> {
        match (OsToken::from_identifier(os), ArchToken::from_identifier(arch)) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(ShimError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlatformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_host() {
        let spec = PlatformSpec::detect().unwrap();
        #[cfg(target_arch = "aarch64")]
        assert_eq!(spec.arch, ArchToken::Arm64);
        #[cfg(target_arch = "x86_64")]
        assert_eq!(spec.arch, ArchToken::X86_64);
        #[cfg(target_os = "linux")]
        assert_eq!(spec.os, OsToken::Linux);
        #[cfg(target_os = "macos")]
        assert_eq!(spec.os, OsToken::Darwin);
    }

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(
            PlatformSpec::resolve("macos", "arm64").unwrap().to_string(),
            "Darwin_arm64"
        );
        assert_eq!(
            PlatformSpec::resolve("linux", "amd64").unwrap().to_string(),
            "Linux_x86_64"
        );
        assert_eq!(
            PlatformSpec::resolve("win32", "x64").unwrap().to_string(),
            "Windows_x86_64"
        );
        assert_eq!(
            PlatformSpec::resolve("linux", "i686").unwrap().to_string(),
            "Linux_i386"
        );
    }

    #[test]
    fn test_resolve_unsupported() {
        for (os, arch) in [("freebsd", "x86_64"), ("linux", "riscv64"), ("aix", "ppc64")] {
            match PlatformSpec::resolve(os, arch) {
                Err(ShimError::UnsupportedPlatform { os: o, arch: a }) => {
                    assert_eq!(o, os);
                    assert_eq!(a, arch);
                }
                other => panic!("expected UnsupportedPlatform for {os}/{arch}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_binary_names() {
        assert_eq!(OsToken::Darwin.installed_binary_name("rulesctl"), "rulesctl-darwin");
        assert_eq!(OsToken::Linux.installed_binary_name("rulesctl"), "rulesctl-linux");
        assert_eq!(OsToken::Windows.installed_binary_name("rulesctl"), "rulesctl-win.exe");
        assert_eq!(OsToken::Windows.archived_binary_name("rulesctl"), "rulesctl.exe");
        assert_eq!(OsToken::Linux.archived_binary_name("rulesctl"), "rulesctl");
    }
}
