// Crate root: declare modules and control visibility
pub mod error;
pub mod host;
pub mod locator;
pub mod logging;
pub mod opcode_writer;
pub mod paths;
pub mod trace;
pub mod unpacker;

// Re-export commonly used API from the library for binaries/tests
pub use error::{Result, TriageError};
pub use host::{DecodedInstruction, NeverCancelled, ProgramDump, TaskMonitor};
pub use locator::{locate_sample, SampleMatch};
pub use opcode_writer::TraceOutcome;
