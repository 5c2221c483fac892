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

//! Correlate a loaded (temporary) binary back to its original sample.
//!
//! Samples live under `<root>/<group>/exe/`. Identity is full byte equality,
//! with a file-length prefilter so only same-sized candidates are read. The
//! scan visits every group in lexicographic order and collects every match;
//! a duplicate sample shared by two groups is an error, not a coin toss.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Result, TriageError};

/// The original sample a loaded binary was traced back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMatch {
    pub group: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// Find the unique sample under `root` whose content equals `loaded`.
pub fn locate_sample(root: &Path, loaded: &[u8]) -> Result<SampleMatch> {
    if !root.is_dir() {
        return Err(TriageError::MissingDirectory {
            path: root.to_path_buf(),
        });
    }

    let mut matches: Vec<SampleMatch> = Vec::new();
    for group_dir in sorted_entries(root)?.into_iter().filter(|p| p.is_dir()) {
        let group = file_name_string(&group_dir);
        let exe_dir = group_dir.join("exe");
        if !exe_dir.is_dir() {
            continue;
        }
        debug!("Scanning group: {}", group);

        for candidate in sorted_entries(&exe_dir)?.into_iter().filter(|p| p.is_file()) {
            if fs::metadata(&candidate)?.len() != loaded.len() as u64 {
                continue;
            }
            let content = fs::read(&candidate)?;
            if content == loaded {
                info!("Found matching file in: {}", group);
                matches.push(SampleMatch {
                    group: group.clone(),
                    file_name: file_name_string(&candidate),
                    path: candidate,
                });
            }
        }
    }

    match matches.len() {
        0 => Err(TriageError::SampleNotFound {
            root: root.to_path_buf(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(TriageError::AmbiguousSample {
            candidates: matches
                .iter()
                .map(|m| format!("{}/{}", m.group, m.file_name))
                .collect(),
        }),
    }
}

/// Directory entries in lexicographic filename order, so results do not
/// depend on filesystem enumeration order.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(entries)
}

fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
