//! File collection for upload.
//!
//! Walks one or more directory trees and builds the [`FileManifest`] sent as
//! the body of a deploy: every regular file becomes one entry keyed by its
//! `/`-separated path below the root (behind the root's prefix), with the raw
//! bytes base64 encoded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{debug, info, warn};

use crate::contract::FileManifest;
use crate::error::DeployError;

/// A directory to upload and the manifest prefix its files land under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRoot {
    pub source: PathBuf,
    pub prefix: String,
}

impl ManifestRoot {
    pub fn new(source: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            source: source.into(),
            prefix: prefix.to_string(),
        }
    }
}

/// Collects every regular file below each root into one manifest.
///
/// Roots that do not exist contribute nothing. Symlinks and special files are
/// skipped, never followed. When two roots produce the same key the later one wins.
/// A path that is not valid UTF-8 cannot become a key and fails the collection.
pub fn collect(roots: &[ManifestRoot]) -> Result<FileManifest, DeployError> {
    let mut manifest = FileManifest::new();

    for root in roots {
        let prefix = root.prefix.trim_matches('/');
        match fs::metadata(&root.source) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(root = %root.source.display(), "[COLLECT] Root does not exist, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
            Ok(meta) if !meta.is_dir() => {
                return Err(io::Error::other(format!(
                    "upload root {} is not a directory",
                    root.source.display()
                ))
                .into());
            }
            Ok(_) => {}
        }

        let before = manifest.len();
        walk_dir(&root.source, &root.source, prefix, &mut manifest)?;
        info!(
            root = %root.source.display(),
            prefix,
            files = manifest.len() - before,
            "[COLLECT] Collected upload root"
        );
    }

    Ok(manifest)
}

fn walk_dir(
    root: &Path,
    current: &Path,
    prefix: &str,
    manifest: &mut FileManifest,
) -> Result<(), DeployError> {
    let mut entries = fs::read_dir(current)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk_dir(root, &path, prefix, manifest)?;
        } else if file_type.is_file() {
            let key = manifest_key(root, &path, prefix)?;
            let content = fs::read(&path)?;
            debug!(key = %key, size = content.len(), "[COLLECT] Added file");
            if manifest.insert(key.clone(), STANDARD.encode(&content)).is_some() {
                warn!(key = %key, "[COLLECT] Duplicate upload path, later root wins");
            }
        } else {
            debug!(path = %path.display(), "[COLLECT] Skipping symlink or special file");
        }
    }

    Ok(())
}

fn manifest_key(root: &Path, path: &Path, prefix: &str) -> Result<String, DeployError> {
    let rel = path.strip_prefix(root).map_err(io::Error::other)?;
    let rel = rel
        .components()
        .map(|c| {
            c.as_os_str().to_str().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("upload path {} is not valid UTF-8", path.display()),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?
        .join("/");
    if prefix.is_empty() {
        Ok(rel)
    } else {
        Ok(format!("{prefix}/{rel}"))
    }
}
