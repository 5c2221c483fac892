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

//! Entry point for the trace subcommand: load a host program dump, locate
//! the original sample in the corpus, write its opcode trace.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use log::info;

use crate::error::{Result, TriageError};
use crate::host::{NeverCancelled, ProgramDump, TaskMonitor};
use crate::locator::locate_sample;
use crate::opcode_writer::{write_opcode_trace, TraceOutcome};
use crate::paths::normalize_program_path;

/// Directory the trace files are written to, created per group on demand.
const OPCODES_DIR: &str = "opcodes";
/// Samples root, when derived from the loaded program's location.
const SAMPLES_ROOT_NAME: &str = "Unpacked_Samples";

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// Program dump JSON exported by the analysis host
    #[arg(long = "dump", value_name = "FILE")]
    pub dump: PathBuf,

    /// Samples root; defaults to Unpacked_Samples next to the loaded
    /// program's parent directory
    #[arg(long = "samples-root", value_name = "DIR")]
    pub samples_root: Option<PathBuf>,
}

pub fn run(args: TraceArgs) -> Result<TraceOutcome> {
    let dump = ProgramDump::load(&args.dump)?;
    run_with_monitor(&dump, args.samples_root.as_deref(), &NeverCancelled)
}

/// The full trace pipeline with an injected cancellation monitor.
pub fn run_with_monitor(
    dump: &ProgramDump,
    samples_root: Option<&Path>,
    monitor: &dyn TaskMonitor,
) -> Result<TraceOutcome> {
    info!("Processing program: {}", dump.name);

    let program_path = normalize_program_path(&dump.executable_path);
    info!("Program path: {}", program_path.display());

    // The loaded copy sits next to the reported executable path, under the
    // program's name (the two can differ).
    let temp_dir = parent_of(&program_path)?;
    let loaded_path = temp_dir.join(&dump.name);
    let loaded = fs::read(&loaded_path)?;

    let samples_root = match samples_root {
        Some(root) => root.to_path_buf(),
        None => parent_of(temp_dir)?.join(SAMPLES_ROOT_NAME),
    };

    let matched = locate_sample(&samples_root, &loaded)?;
    info!("APT Directory: {}", matched.group);
    info!("Malware hash: {}", matched.file_name);

    let output_dir = samples_root.join(&matched.group).join(OPCODES_DIR);
    fs::create_dir_all(&output_dir)?;
    let output_file = output_dir.join(format!("{}.opcode", matched.file_name));
    info!("Writing opcodes to: {}", output_file.display());

    let instructions = dump.decoded_instructions()?;
    let outcome = write_opcode_trace(
        &output_file,
        &matched.group,
        &matched.file_name,
        dump,
        &instructions,
        monitor,
    )?;

    info!(
        "Extracted {} opcodes to {}",
        outcome.instructions_written,
        output_file.display()
    );
    Ok(outcome)
}

fn parent_of(path: &Path) -> Result<&Path> {
    path.parent().ok_or_else(|| TriageError::MissingDirectory {
        path: path.to_path_buf(),
    })
}
