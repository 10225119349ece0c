// Copyright (c) 2026 elf_to_hex Authors.
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

//! Logger setup for the command-line tool.

use std::io::Write;

use flexi_logger::{DeferredNow, FlexiLoggerError, Logger, LoggerHandle};
use log::{Level, Record};

/// Start logging to stdout. `RUST_LOG` overrides the level.
///
/// The returned handle must stay alive for the duration of the run.
pub fn init_logging(verbose: bool) -> Result<LoggerHandle, FlexiLoggerError> {
    let level = if verbose { "debug" } else { "info" };
    Logger::try_with_env_or_str(level)?
        .log_to_stdout()
        .format(plain_format)
        .start()
}

/// Info lines are printed bare, like the tool's regular progress output.
pub fn plain_format(
    w: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    match record.level() {
        Level::Info => write!(w, "{}", record.args()),
        level => write!(w, "{}: {}", level, record.args()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(level: Level, msg: &str) -> String {
        let mut out = Vec::new();
        plain_format(
            &mut out,
            &mut DeferredNow::new(),
            &Record::builder().level(level).args(format_args!("{}", msg)).build(),
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn info_is_bare() {
        assert_eq!(format(Level::Info, "Min addr: 80000000"), "Min addr: 80000000");
    }

    #[test]
    fn other_levels_are_tagged() {
        assert_eq!(format(Level::Warn, "no sections"), "WARN: no sections");
        assert_eq!(format(Level::Debug, "x"), "DEBUG: x");
    }
}
