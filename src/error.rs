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

use std::path::PathBuf;
use thiserror::Error;

/// Error types shared by the trace and unpack pipelines.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid program dump: {0}")]
    Dump(#[from] serde_json::Error),

    #[error("wrong password for archive: {archive}")]
    InvalidPassword { archive: PathBuf },

    #[error("invalid instruction address: {value}")]
    InvalidAddress { value: String },

    #[error("invalid instruction bytes: {value}")]
    InvalidBytes { value: String },

    #[error("directory does not exist: {path}")]
    MissingDirectory { path: PathBuf },

    #[error("no sample under {root} matches the loaded binary")]
    SampleNotFound { root: PathBuf },

    #[error("loaded binary matches more than one sample: {}", .candidates.join(", "))]
    AmbiguousSample { candidates: Vec<String> },
}

pub type Result<T> = std::result::Result<T, TriageError>;
