//! Transparent proxy to the installed `rulesctl` binary.
//!
//! The launcher never touches the network. It works out the installed
//! binary's name from the OS alone, checks that it exists, and runs it with
//! the caller's arguments and stdio, handing back the child's exit code.

use crate::config::ReleaseConfig;
use crate::error::{Result, ShimError};
use crate::platform::OsToken;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Exit code reported when the launcher itself fails
pub const LAUNCH_FAILURE_CODE: i32 = 1;

/// Where the binary for `os` lives under the configured install directory.
pub fn installed_binary_path(config: &ReleaseConfig, os: OsToken) -> PathBuf {
    config
        .install_dir
        .join(os.installed_binary_name(&config.repo))
}

/// A resolved invocation of the installed binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub binary_path: PathBuf,
    pub args: Vec<OsString>,
}

impl LaunchRequest {
    pub fn for_host(config: &ReleaseConfig, args: Vec<OsString>) -> Result<Self> {
        Self::for_os(config, std::env::consts::OS, args)
    }

    /// Resolve the binary for an OS identifier.
    ///
    /// # Errors
    ///
    /// - [`ShimError::UnsupportedPlatform`] for an unknown OS
    /// - [`ShimError::BinaryNotFound`] if nothing is installed yet
    pub fn for_os(config: &ReleaseConfig, os: &str, args: Vec<OsString>) -> Result<Self> {
        let token = OsToken::from_identifier(os).ok_or_else(|| ShimError::UnsupportedPlatform {
            os: os.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        })?;

        let binary_path = installed_binary_path(config, token);
        if !binary_path.is_file() {
            return Err(ShimError::BinaryNotFound(binary_path));
        }

        Ok(Self { binary_path, args })
    }
}

/// Run the binary with inherited stdio and wait for it to exit.
pub async fn launch(request: &LaunchRequest) -> Result<i32> {
    debug!(
        "Launching {} with {} argument(s)",
        request.binary_path.display(),
        request.args.len()
    );

    let spawn_error = |source| ShimError::Spawn {
        path: request.binary_path.clone(),
        source,
    };

    let mut child = Command::new(&request.binary_path)
        .args(&request.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(spawn_error)?;

    let status = child.wait().await.map_err(spawn_error)?;
    debug!("Child exited with {}", status);

    Ok(exit_code(status))
}

/// The child's exit code; `128 + signal` if a signal killed it.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    LAUNCH_FAILURE_CODE
}
