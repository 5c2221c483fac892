use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::host::{DecodedInstruction, ProgramDump, TaskMonitor};

/// Instructions are flushed in batches; log a progress notice per batch.
const PROGRESS_INTERVAL: usize = 1000;

/// What a trace run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceOutcome {
    pub instructions_written: usize,
    pub cancelled: bool,
}

/// Write one opcode trace file: fixed header, then one line per instruction
/// in listing order. An existing file at `out_path` is overwritten. On
/// cancellation the file keeps whatever was written so far.
pub fn write_opcode_trace(
    out_path: &Path,
    group: &str,
    sample_name: &str,
    dump: &ProgramDump,
    instructions: &[DecodedInstruction],
    monitor: &dyn TaskMonitor,
) -> Result<TraceOutcome> {
    let file = File::create(out_path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# Opcode extraction for malware analysis")?;
    writeln!(out, "# APT Group: {}", group)?;
    writeln!(out, "# Malware Hash: {}", sample_name)?;
    writeln!(out, "# Executable format: {}", dump.executable_format)?;
    writeln!(out, "# Processor: {}", dump.processor)?;
    writeln!(out, "# Creation date: {}", dump.creation_date)?;
    writeln!(out, "# Format: <Address> | <Bytes> | <Mnemonic> | <Full Instruction>")?;
    writeln!(out)?;

    let mut count = 0;
    for insn in instructions {
        if monitor.is_cancelled() {
            out.flush()?;
            warn!("Trace cancelled after {} instructions", count);
            return Ok(TraceOutcome {
                instructions_written: count,
                cancelled: true,
            });
        }
        writeln!(out, "{}", format_opcode_line(insn))?;
        count += 1;
        if count % PROGRESS_INTERVAL == 0 {
            info!("Processed {} instructions...", count);
        }
    }
    out.flush()?;

    Ok(TraceOutcome {
        instructions_written: count,
        cancelled: false,
    })
}

/// `<address> | <space-separated lowercase hex bytes> | <mnemonic> | <text>`
pub fn format_opcode_line(insn: &DecodedInstruction) -> String {
    format!(
        "{:08x} | {} | {} | {}",
        insn.address,
        format_hex_bytes(&insn.bytes),
        insn.mnemonic,
        insn.text
    )
}

pub fn format_hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
