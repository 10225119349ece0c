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

//! Error types for the conversion pipeline.
//!
//! Every failure is terminal for a run. The binary maps each error's
//! [`ErrorKind`] to a process exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Broad failure categories, one exit code each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is not an ELF image this tool can load.
    Format,
    /// Bad or missing command-line parameters.
    Usage,
    /// Populated addresses do not fit in the image capacity.
    Capacity,
    /// Declared memory window does not contain the image.
    Window,
    /// A file could not be read or written.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Format => 1,
            ErrorKind::Usage => 2,
            ErrorKind::Capacity => 3,
            ErrorKind::Window => 4,
            ErrorKind::Io => 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not an ELF file")]
    NotElf,

    #[error("ELF class {0} is neither 32-bit nor 64-bit")]
    UnsupportedClass(u8),

    #[error("malformed ELF: {0}")]
    Malformed(#[from] object::read::Error),

    #[error("ELF machine {found} does not match the expected machine {expected}")]
    WrongMachine { expected: u16, found: u16 },

    #[error("big-endian ELF images are not supported")]
    BigEndian,

    #[error(
        "max_addr ({max_addr:#x}) exceeds the image capacity ({capacity:#x}) by {overflow:#x} bytes"
    )]
    CapacityExceeded {
        max_addr: u64,
        capacity: u64,
        overflow: u64,
    },

    #[error("no loadable sections found")]
    EmptyImage,

    #[error(
        "elf addresses out of range: image {min_addr:#x} - {max_addr:#x}, window {base_addr:#x} - {limit_addr:#x}"
    )]
    OutOfWindow {
        base_addr: u64,
        limit_addr: u64,
        min_addr: u64,
        max_addr: u64,
    },

    #[error("memory window of {size_kb} KB at {base_addr:#x} overflows the address space")]
    InvalidWindow { base_addr: u64, size_kb: u64 },

    #[error("{0}")]
    Usage(String),
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Io { .. } => ErrorKind::Io,
            ConvertError::NotElf
            | ConvertError::UnsupportedClass(_)
            | ConvertError::Malformed(_)
            | ConvertError::WrongMachine { .. }
            | ConvertError::BigEndian => ErrorKind::Format,
            ConvertError::CapacityExceeded { .. } => ErrorKind::Capacity,
            ConvertError::EmptyImage
            | ConvertError::OutOfWindow { .. }
            | ConvertError::InvalidWindow { .. } => ErrorKind::Window,
            ConvertError::Usage(_) => ErrorKind::Usage,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
