use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TriageError};

// The analysis host performs all decoding; we only consume its export. A dump
// is one JSON document with the loaded program's metadata and the complete
// instruction listing in address order. For all the structs, addresses and
// byte sequences are hex strings in the JSON; the helper parses them into
// native types before use.

/// A program dump exported by the analysis host.
#[derive(Deserialize, Debug)]
pub struct ProgramDump {
    pub name: String,
    pub executable_path: String,
    pub executable_format: String,
    pub processor: String,
    pub creation_date: String,
    pub instructions: Vec<RawInstruction>,
}

/**
 * One decoded instruction as the host serializes it. The field names are
 * intentionally short to keep dumps small - listings routinely run to
 * hundreds of thousands of entries.
 */
#[derive(Deserialize, Debug)]
pub struct RawInstruction {
    /// Address as a hex string
    pub a: String,
    /// Raw bytes as a hex string (contiguous or space-separated)
    pub b: String,
    /// Mnemonic
    pub m: String,
    /// Full textual rendering
    pub i: String,
}

/// Internal representation of one decoded instruction.
#[derive(Debug, Clone)]
pub struct DecodedInstruction {
    pub address: u64,
    pub bytes: Vec<u8>,
    pub mnemonic: String,
    pub text: String,
}

impl TryFrom<&RawInstruction> for DecodedInstruction {
    type Error = TriageError;

    fn try_from(raw: &RawInstruction) -> Result<Self> {
        let address = parse_hex_address(&raw.a).ok_or_else(|| TriageError::InvalidAddress {
            value: raw.a.clone(),
        })?;
        let bytes = parse_hex_bytes(&raw.b).ok_or_else(|| TriageError::InvalidBytes {
            value: raw.b.clone(),
        })?;
        Ok(Self {
            address,
            bytes,
            mnemonic: raw.m.clone(),
            text: raw.i.clone(),
        })
    }
}

impl ProgramDump {
    /// Read and parse a dump file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let dump = serde_json::from_reader(BufReader::new(file))?;
        Ok(dump)
    }

    /// Convert the raw listing into internal instructions, listing order
    /// preserved. Fails on the first malformed record.
    pub fn decoded_instructions(&self) -> Result<Vec<DecodedInstruction>> {
        self.instructions
            .iter()
            .map(DecodedInstruction::try_from)
            .collect()
    }
}

/// Parse hex address from string (supports "0x1234" or "1234" format)
pub fn parse_hex_address(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    u64::from_str_radix(hex_str, 16).ok()
}

/// Parse an instruction byte sequence from a hex string. Whitespace between
/// byte pairs is accepted; an odd digit count is rejected.
pub fn parse_hex_bytes(input: &str) -> Option<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !compact.is_ascii() || compact.len() % 2 != 0 {
        return None;
    }
    (0..compact.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&compact[i..i + 2], 16).ok())
        .collect()
}

/// Cooperative cancellation, polled once per instruction while writing a
/// trace. The real flag lives in the host; tests inject their own.
pub trait TaskMonitor {
    fn is_cancelled(&self) -> bool;
}

/// Monitor for unattended batch runs.
pub struct NeverCancelled;

impl TaskMonitor for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}
