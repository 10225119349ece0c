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

//! Command-line arguments and the run configuration built from them.

use std::path::PathBuf;

use clap::Parser;

use crate::convert::Window;
use crate::error::{ConvertError, Result};
use crate::loader::LoaderOptions;
use crate::symbols::SymbolTargets;
use crate::utils::parse_hex_address;

pub const DEFAULT_SYMBOL_FILE: &str = "symbol_table.txt";

/// Reads an ELF file and writes a Verilog hex 32-bit memory image file.
///
/// Input and output may be given with -e/-h or as two positional arguments.
#[derive(Parser, Debug)]
#[command(name = "elf_to_hex", version, disable_help_flag = true)]
pub struct CliArgs {
    /// ELF input file
    #[arg(short = 'e', long = "elf", value_name = "ELF")]
    pub elf: Option<PathBuf>,

    /// Hex memory image output file
    #[arg(short = 'h', long = "hex", value_name = "HEX")]
    pub hex: Option<PathBuf>,

    /// Memory size in KB
    #[arg(short = 'm', long = "mem-size", value_name = "KB", default_value_t = 16)]
    pub mem_size_kb: u64,

    /// Base address of memory, in hex
    #[arg(short = 'b', long = "base", value_name = "ADDR", value_parser = parse_hex_address, default_value = "0xc0000000")]
    pub base: u64,

    /// Where to write the resolved symbol addresses
    #[arg(long = "symbols", value_name = "PATH", default_value = DEFAULT_SYMBOL_FILE)]
    pub symbols: PathBuf,

    #[arg(long = "start-symbol", default_value = "_start")]
    pub start_symbol: String,

    #[arg(long = "exit-symbol", default_value = "exit")]
    pub exit_symbol: String,

    #[arg(long = "tohost-symbol", default_value = "tohost")]
    pub tohost_symbol: String,

    /// Highest loadable address (exclusive), in hex
    #[arg(long = "capacity", value_name = "ADDR", value_parser = parse_hex_address, default_value = "0xd0000000")]
    pub capacity: u64,

    /// Enable debug output
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    pub verbose: bool,

    /// Print help
    #[arg(long = "help", action = clap::ArgAction::Help)]
    pub help: Option<bool>,

    /// <ELF> <HEX>, when -e/-h are not used
    #[arg(value_name = "FILES", num_args = 0..=2)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub elf_path: PathBuf,
    pub hex_path: PathBuf,
    pub symbol_path: PathBuf,
    pub window: Window,
    pub loader: LoaderOptions,
    pub verbose: bool,
}

impl Config {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let mut positional = args.files.into_iter();
        let elf_path = args
            .elf
            .or_else(|| positional.next())
            .ok_or_else(|| ConvertError::Usage("no ELF input file given (-e)".to_string()))?;
        let hex_path = args
            .hex
            .or_else(|| positional.next())
            .ok_or_else(|| ConvertError::Usage("no hex output file given (-h)".to_string()))?;
        if let Some(extra) = positional.next() {
            return Err(ConvertError::Usage(format!(
                "unexpected argument '{}'",
                extra.display()
            )));
        }

        let window = Window::from_kb(args.base, args.mem_size_kb)?;
        let loader = LoaderOptions {
            capacity: args.capacity,
            targets: SymbolTargets {
                start: args.start_symbol,
                exit: args.exit_symbol,
                tohost: args.tohost_symbol,
            },
            ..LoaderOptions::default()
        };

        Ok(Self {
            elf_path,
            hex_path,
            symbol_path: args.symbols,
            window,
            loader,
            verbose: args.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Config> {
        let argv = std::iter::once("elf_to_hex").chain(argv.iter().copied());
        let args = CliArgs::try_parse_from(argv).expect("clap parse");
        Config::from_args(args)
    }

    #[test]
    fn flags_with_defaults() {
        let cfg = parse(&["-e", "prog.elf", "-h", "Mem.hex"]).unwrap();
        assert_eq!(cfg.elf_path, PathBuf::from("prog.elf"));
        assert_eq!(cfg.hex_path, PathBuf::from("Mem.hex"));
        assert_eq!(cfg.window.base_addr, 0xC000_0000);
        assert_eq!(cfg.window.size_bytes, 16 * 1024);
        assert_eq!(cfg.symbol_path, PathBuf::from(DEFAULT_SYMBOL_FILE));
        assert_eq!(cfg.loader.capacity, 0xD000_0000);
        assert_eq!(cfg.loader.targets, SymbolTargets::default());
        assert!(!cfg.verbose);
    }

    #[test]
    fn positional_form() {
        let cfg = parse(&["rv64ui-p-add", "Mem.hex"]).unwrap();
        assert_eq!(cfg.elf_path, PathBuf::from("rv64ui-p-add"));
        assert_eq!(cfg.hex_path, PathBuf::from("Mem.hex"));
    }

    #[test]
    fn size_base_and_symbols() {
        let cfg = parse(&[
            "-e", "a.elf", "-h", "a.hex", "-m", "64", "-b", "80000000", "--tohost-symbol",
            "mailbox", "--symbols", "out/syms.txt",
        ])
        .unwrap();
        assert_eq!(cfg.window.base_addr, 0x8000_0000);
        assert_eq!(cfg.window.limit(), 0x8001_0000);
        assert_eq!(cfg.loader.targets.tohost, "mailbox");
        assert_eq!(cfg.symbol_path, PathBuf::from("out/syms.txt"));
    }

    #[test]
    fn missing_files_are_usage_errors() {
        assert!(matches!(parse(&["-e", "a.elf"]), Err(ConvertError::Usage(_))));
        assert!(matches!(parse(&[]), Err(ConvertError::Usage(_))));
        assert!(matches!(
            parse(&["-e", "a.elf", "-h", "a.hex", "extra"]),
            Err(ConvertError::Usage(_))
        ));
    }

    #[test]
    fn bad_base_is_rejected_by_clap() {
        let res = CliArgs::try_parse_from(["elf_to_hex", "-b", "0xnope", "a", "b"]);
        assert!(res.is_err());
    }

    #[test]
    fn window_overflow_is_rejected() {
        assert!(matches!(
            parse(&["-b", "ffffffffffffff00", "-m", "1", "a", "b"]),
            Err(ConvertError::InvalidWindow { .. })
        ));
    }
}
