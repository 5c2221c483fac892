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

//! Logging bootstrap: a timestamped log file in the working directory plus
//! duplication to stderr, so batch runs leave a reviewable record.

use flexi_logger::{detailed_format, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle};

/// Start the logger. The returned handle must stay alive for the duration of
/// the process; dropping it shuts the writers down.
pub fn init(debug: bool) -> Result<LoggerHandle, FlexiLoggerError> {
    let level = if debug { "debug" } else { "info" };
    Logger::try_with_str(level)?
        .log_to_file(FileSpec::default().basename("triage"))
        .duplicate_to_stderr(Duplicate::All)
        .format(detailed_format)
        .start()
}
