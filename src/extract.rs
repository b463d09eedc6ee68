//! Release archive extraction and binary installation.
//!
//! This module unpacks a downloaded release archive and installs the binary it
//! contains. It:
//! - **Unpacks** `tar.gz` (Darwin, Linux) or `zip` (Windows) archives in-process
//! - **Locates** the executable by its expected name, at the archive root or nested
//! - **Stages** the binary next to its final location and renames it into place
//! - **Marks** it executable (`0o755`)
//! - **Cleans up** the temporary directory and the archive
//!
//! # Architecture
//!
//! ```text
//! Input:   rulesctl_Linux_x86_64.tar.gz
//! Unpack:  $TMPDIR/rulesctl-extract-XXXX/
//!            rulesctl
//!            README.md
//! Install: <install_dir>/rulesctl-linux
//! ```
//!
//! The install is atomic with respect to the final path: the binary is copied
//! to a temporary file inside the install directory, then renamed over the
//! previous one, so a crash mid-copy never leaves a truncated executable.

use crate::asset::ArchiveFormat;
use crate::error::{Result, ShimError};
use crate::platform::PlatformSpec;
use anyhow::{Context, anyhow};
use flate2::read::GzDecoder;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Permission bits applied to the installed binary
pub const EXECUTABLE_MODE: u32 = 0o755;

/// The installed executable, ready to be launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    pub path: PathBuf,
    pub permission_bits: u32,
}

/// Unpacks one archive format into a directory.
pub trait ArchiveExtractor: Send + Sync {
    fn unpack(&self, archive: &Path, dest: &Path) -> anyhow::Result<()>;
}

pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    fn unpack(&self, archive: &Path, dest: &Path) -> anyhow::Result<()> {
        let file = fs::File::open(archive)
            .with_context(|| format!("Failed to open archive: {}", archive.display()))?;
        let decompressor = GzDecoder::new(file);
        let mut archive = Archive::new(decompressor);
        archive
            .unpack(dest)
            .with_context(|| format!("Failed to unpack tar.gz into: {}", dest.display()))?;
        Ok(())
    }
}

pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn unpack(&self, archive: &Path, dest: &Path) -> anyhow::Result<()> {
        let file = fs::File::open(archive)
            .with_context(|| format!("Failed to open archive: {}", archive.display()))?;
        let mut zip = ZipArchive::new(file).context("Failed to read ZIP archive")?;
        zip.extract(dest)
            .with_context(|| format!("Failed to unpack zip into: {}", dest.display()))?;
        Ok(())
    }
}

pub fn extractor_for(format: ArchiveFormat) -> Box<dyn ArchiveExtractor> {
    match format {
        ArchiveFormat::TarGz => Box::new(TarGzExtractor),
        ArchiveFormat::Zip => Box::new(ZipExtractor),
    }
}

/// Unpack `archive` and install its binary into `target_dir`.
///
/// Runs on the blocking pool. Any failure is reported as
/// [`ShimError::Extraction`]; the temporary directory is removed when dropped.
pub async fn extract_and_install(
    archive: &Path,
    target_dir: &Path,
    platform: PlatformSpec,
    repo: &str,
) -> Result<InstalledBinary> {
    let archive = archive.to_path_buf();
    let target_dir = target_dir.to_path_buf();
    let repo = repo.to_string();

    tokio::task::spawn_blocking(move || {
        install_from_archive(&archive, &target_dir, platform, &repo)
    })
    .await
    .map_err(task_failure)?
    .map_err(|e| ShimError::extraction(format!("{:#}", e)))
}

fn task_failure(e: tokio::task::JoinError) -> ShimError {
    ShimError::extraction(format!("Extraction task failed: {}", e))
}

fn install_from_archive(
    archive: &Path,
    target_dir: &Path,
    platform: PlatformSpec,
    repo: &str,
) -> anyhow::Result<InstalledBinary> {
    let work_dir = tempfile::Builder::new()
        .prefix("rulesctl-extract-")
        .tempdir()
        .context("Failed to create temporary directory")?;

    let format = ArchiveFormat::for_platform(platform);
    debug!(
        "Unpacking {} ({}) into {}",
        archive.display(),
        format.extension(),
        work_dir.path().display()
    );
    extractor_for(format).unpack(archive, work_dir.path())?;

    let expected = platform.os.archived_binary_name(repo);
    let binary = find_binary(work_dir.path(), &expected)
        .ok_or_else(|| anyhow!("{} not found in {}", expected, archive.display()))?;

    fs::create_dir_all(target_dir)
        .with_context(|| format!("Failed to create directory: {}", target_dir.display()))?;
    let final_path = target_dir.join(platform.os.installed_binary_name(repo));
    let permission_bits = stage_and_replace(&binary, &final_path)?;

    if let Err(e) = fs::remove_file(archive) {
        warn!("Failed to remove archive {}: {}", archive.display(), e);
    }
    if let Err(e) = work_dir.close() {
        warn!("Failed to remove temporary directory: {}", e);
    }

    Ok(InstalledBinary {
        path: final_path,
        permission_bits,
    })
}

/// Find `name` at the root of `root`, or anywhere beneath it.
///
/// Only regular files count. Symlinks are never followed, so an archive
/// entry can't point the install at a file outside `root`.
fn find_binary(root: &Path, name: &str) -> Option<PathBuf> {
    let direct = root.join(name);
    if fs::symlink_metadata(&direct).is_ok_and(|meta| meta.file_type().is_file()) {
        return Some(direct);
    }

    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_file() && entry.file_name() == OsStr::new(name))
        .map(|entry| entry.into_path())
}

/// Copy `source` next to `final_path`, make it executable, rename into place.
fn stage_and_replace(source: &Path, final_path: &Path) -> anyhow::Result<u32> {
    let dir = final_path
        .parent()
        .ok_or_else(|| anyhow!("Invalid install path: {}", final_path.display()))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".rulesctl-staged-")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to stage binary in: {}", dir.display()))?;

    let mut input = fs::File::open(source)
        .with_context(|| format!("Failed to open extracted binary: {}", source.display()))?;
    io::copy(&mut input, staged.as_file_mut()).context("Failed to copy extracted binary")?;
    staged.as_file().sync_all()?;

    let permission_bits = set_executable(staged.path())?;

    staged
        .persist(final_path)
        .map_err(|e| anyhow!("Failed to move binary to {}: {}", final_path.display(), e.error))?;

    Ok(permission_bits)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> anyhow::Result<u32> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(EXECUTABLE_MODE))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    let mode = fs::metadata(path)?.permissions().mode() & 0o777;
    Ok(mode)
}

#[cfg(not(unix))]
fn set_executable(path: &Path) -> anyhow::Result<u32> {
    // Windows has no execute bit; the .exe extension is what matters
    let readonly = fs::metadata(path)?.permissions().readonly();
    Ok(if readonly { 0o555 } else { EXECUTABLE_MODE })
}
