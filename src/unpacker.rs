// Copyright (c) 2026 Sample-Triage Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entry point for the unpack subcommand: normalize per-group submission
//! archives into `<dest>/<group>/{exe,others}` trees.
//!
//! Each top-level archive holds one inner folder with `exe/` and `others/`
//! subfolders, each containing per-sample password-protected ZIPs. A bad
//! nested ZIP is skipped; a bad group archive is skipped; the batch keeps
//! going. Only a missing source directory aborts the run.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use log::{debug, error, info, warn};

use crate::error::{Result, TriageError};

/// Subdirectories a nested archive can be filed under.
const CATEGORIES: [&str; 2] = ["exe", "others"];
/// Scratch directory inside a group, removed after processing.
const TEMP_DIR: &str = "temp";

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Directory containing the group submission archives
    #[arg(long = "source", value_name = "DIR")]
    pub source: PathBuf,

    /// Destination root for the normalized layout
    #[arg(long = "dest", value_name = "DIR")]
    pub dest: PathBuf,

    /// Archive password
    #[arg(long = "password", default_value = "infected")]
    pub password: String,
}

pub fn run(args: UnpackArgs) -> Result<()> {
    unpack_all(&args.source, &args.dest, args.password.as_bytes())
}

/// Process every `*.zip` in `source`. Per-archive failures are logged and the
/// batch continues.
pub fn unpack_all(source: &Path, dest: &Path, password: &[u8]) -> Result<()> {
    info!("Source directory: {}", source.display());
    info!("Extract directory: {}", dest.display());

    if !source.is_dir() {
        return Err(TriageError::MissingDirectory {
            path: source.to_path_buf(),
        });
    }
    fs::create_dir_all(dest)?;

    let archives = zip_files_in(source)?;
    info!("Found {} zip files to process", archives.len());
    if archives.is_empty() {
        warn!("No zip files found in {}", source.display());
        return Ok(());
    }

    for archive in &archives {
        if let Err(err) = process_group_archive(archive, dest, password) {
            error!("Failed to process {}: {}", archive.display(), err);
        }
    }

    info!("Unpacking process completed");
    Ok(())
}

/// Normalize one group archive into `<dest>/<group>/{exe,others}`.
fn process_group_archive(archive: &Path, dest: &Path, password: &[u8]) -> Result<()> {
    info!("Processing group archive: {}", archive.display());

    let group = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let group_dir = dest.join(&group);
    let temp_dir = group_dir.join(TEMP_DIR);
    for category in CATEGORIES {
        fs::create_dir_all(group_dir.join(category))?;
    }
    fs::create_dir_all(&temp_dir)?;

    let result = unpack_group_contents(archive, &group_dir, &temp_dir, password);

    // The scratch directory goes away on every path, including a failed
    // top-level extraction.
    if let Err(err) = fs::remove_dir_all(&temp_dir) {
        warn!("Could not remove {}: {}", temp_dir.display(), err);
    }

    result
}

fn unpack_group_contents(
    archive: &Path,
    group_dir: &Path,
    temp_dir: &Path,
    password: &[u8],
) -> Result<()> {
    extract_archive(archive, temp_dir, Some(password))?;

    for inner in sorted_dirs_in(temp_dir)? {
        debug!("Processing inner folder: {}", inner.display());
        for category in CATEGORIES {
            extract_category(&inner, category, &group_dir.join(category), password)?;
        }
    }
    Ok(())
}

/// Extract every nested `*.zip` under `<inner>/<category>/` into `dest`.
/// A nested ZIP that fails is logged and skipped; siblings continue.
fn extract_category(inner: &Path, category: &str, dest: &Path, password: &[u8]) -> Result<()> {
    let source = inner.join(category);
    if !source.is_dir() {
        return Ok(());
    }
    debug!("Found {} folder: {}", category, source.display());

    for nested in zip_files_in(&source)? {
        info!("Extracting {} file: {}", category, nested.display());
        match extract_archive(&nested, dest, Some(password)) {
            Ok(count) => debug!("Successfully extracted: {} ({} entries)", nested.display(), count),
            Err(err) => error!("Failed to extract {}: {}", nested.display(), err),
        }
    }
    Ok(())
}

/// Extract one ZIP archive into `dest`, decrypting with `password` when
/// given. Returns the number of file entries written. Entries whose names
/// escape `dest` are skipped.
pub fn extract_archive(zip_path: &Path, dest: &Path, password: Option<&[u8]>) -> Result<usize> {
    let file = File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    debug!(
        "Contents of {}: [{}]",
        zip_path.display(),
        archive.file_names().collect::<Vec<_>>().join(", ")
    );

    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = match password {
            Some(pw) => archive
                .by_index_decrypt(index, pw)?
                .map_err(|_| TriageError::InvalidPassword {
                    archive: zip_path.to_path_buf(),
                })?,
            None => archive.by_index(index)?,
        };

        let relative = match entry.enclosed_name().map(|p| p.to_owned()) {
            Some(relative) => relative,
            None => {
                warn!(
                    "Entry `{}` in {} is not a safe path, skipping",
                    entry.name(),
                    zip_path.display()
                );
                continue;
            }
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }
    Ok(extracted)
}

/// `*.zip` files directly inside `dir`, lexicographic order.
fn zip_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut zips: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
        })
        .collect();
    zips.sort();
    Ok(zips)
}

/// Immediate subdirectories of `dir`, lexicographic order.
fn sorted_dirs_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}
