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

//! The conversion pipeline: load, check the window, write the side file and
//! the hex image.
//!
//! Nothing is written until the loaded image has passed the window check.
//! Both output files are first staged as temporary files next to their
//! destinations and only renamed into place once both writes succeeded, so
//! a failure never leaves a partial or stale file behind.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::config::Config;
use crate::elf_items::ElfClass;
use crate::error::{ConvertError, Result};
use crate::hex_writer::write_mem_hex;
use crate::loader::{load_elf_file, LoadResult};
use crate::memory::AddressRange;
use crate::symbols::SymbolAddresses;

/// The declared target memory: `size_bytes` bytes starting at `base_addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub base_addr: u64,
    pub size_bytes: u64,
}

impl Window {
    pub fn from_kb(base_addr: u64, size_kb: u64) -> Result<Self> {
        let invalid = ConvertError::InvalidWindow { base_addr, size_kb };
        let size_bytes = size_kb.checked_mul(1024).ok_or(invalid)?;
        if base_addr.checked_add(size_bytes).is_none() {
            return Err(ConvertError::InvalidWindow { base_addr, size_kb });
        }
        Ok(Self {
            base_addr,
            size_bytes,
        })
    }

    /// One past the last byte of the window.
    pub fn limit(&self) -> u64 {
        self.base_addr + self.size_bytes
    }

    /// The window must hold every populated byte. Returns `(min, max)`.
    pub fn check(&self, range: &AddressRange) -> Result<(u64, u64)> {
        let (min_addr, max_addr) = range.bounds().ok_or(ConvertError::EmptyImage)?;
        if min_addr < self.base_addr || self.limit() <= max_addr {
            return Err(ConvertError::OutOfWindow {
                base_addr: self.base_addr,
                limit_addr: self.limit(),
                min_addr,
                max_addr,
            });
        }
        Ok((min_addr, max_addr))
    }
}

#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub class: ElfClass,
    pub min_addr: u64,
    pub max_addr: u64,
    pub symbols: SymbolAddresses,
}

/// Run one conversion as configured.
pub fn run(config: &Config) -> Result<ConvertSummary> {
    let loaded = load_elf_file(&config.elf_path, &config.loader)?;
    emit(config, loaded)
}

/// Check and write an already loaded image.
pub fn emit(config: &Config, loaded: LoadResult) -> Result<ConvertSummary> {
    let window = config.window;
    let (min_addr, max_addr) = window.check(&loaded.range)?;

    log::info!("Writing symbols to:    {}", config.symbol_path.display());
    let symbol_file = stage(&config.symbol_path, |out| {
        loaded.symbols.write_table(out, &config.loader.targets)
    })?;

    log::info!("Writing mem hex to file '{}'", config.hex_path.display());
    log::info!("Subtracting 0x{:08x} base from addresses", window.base_addr);
    let hex_file = stage(&config.hex_path, |out| {
        write_mem_hex(out, &loaded.image, window.base_addr, max_addr, window.limit())
    })?;

    persist(hex_file, &config.hex_path)?;
    persist(symbol_file, &config.symbol_path)?;

    Ok(ConvertSummary {
        class: loaded.class,
        min_addr,
        max_addr,
        symbols: loaded.symbols,
    })
}

/// Write into a temporary file in `path`'s directory. Dropping the result
/// without persisting it removes the file.
fn stage<F>(path: &Path, write: F) -> Result<NamedTempFile>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ConvertError::io(dir, e))?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write(&mut out)
            .and_then(|()| out.flush())
            .map_err(|e| ConvertError::io(path, e))?;
    }
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .map_err(|e| ConvertError::io(path, e.error))?;
    Ok(())
}
