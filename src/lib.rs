//! Library interface for the rulesctl launcher
//!
//! The launcher installs the platform's `rulesctl` release binary on
//! `rulesctl install` and forwards every other invocation to it.

pub mod asset;
pub mod colors;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod install;
pub mod launcher;
pub mod platform;

use std::ffi::OsString;

// Re-export commonly used types
pub use asset::ReleaseTarget;
pub use config::ReleaseConfig;
pub use download::{Downloader, Fetch};
pub use error::{Result, ShimError};
pub use extract::InstalledBinary;
pub use install::InstallationManager;
pub use launcher::{LaunchRequest, launch};
pub use platform::PlatformSpec;

/// What a command line asks the launcher to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Exactly `install`: run the acquisition pipeline
    Install,
    /// Anything else, forwarded verbatim to the installed binary
    Proxy(Vec<OsString>),
}

impl Invocation {
    /// Classify the arguments that follow the program name.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        if args.len() == 1 && args[0] == "install" {
            Invocation::Install
        } else {
            Invocation::Proxy(args)
        }
    }
}
