use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use elf_to_hex::config::{CliArgs, Config};
use elf_to_hex::{convert, debug, ConvertError};

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            let code = err
                .downcast_ref::<ConvertError>()
                .map_or(1, ConvertError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

fn try_main() -> Result<()> {
    let args = CliArgs::parse();
    let _logger = debug::init_logging(args.verbose).context("failed to start logger")?;

    let config = Config::from_args(args)?;
    let summary = convert::run(&config)?;
    log::debug!(
        "{}-bit image {:#x}..={:#x} written to '{}'",
        summary.class.bitwidth(),
        summary.min_addr,
        summary.max_addr,
        config.hex_path.display()
    );
    Ok(())
}
