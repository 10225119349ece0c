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

use std::fmt;

use bitflags::bitflags;
use object::elf;

use crate::error::{ConvertError, Result};

/// Length of `e_ident`.
pub const EI_NIDENT: usize = 16;
/// Offset of the class byte inside `e_ident`.
pub const EI_CLASS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

impl ElfClass {
    /// Read `EI_CLASS` from a raw ident, after checking the ELF magic.
    pub fn probe(data: &[u8]) -> Result<Self> {
        if data.len() < EI_NIDENT || data[..4] != elf::ELFMAG {
            return Err(ConvertError::NotElf);
        }
        match data[EI_CLASS] {
            elf::ELFCLASS32 => Ok(ElfClass::Elf32),
            elf::ELFCLASS64 => Ok(ElfClass::Elf64),
            other => Err(ConvertError::UnsupportedClass(other)),
        }
    }

    pub fn bitwidth(self) -> u32 {
        match self {
            ElfClass::Elf32 => 32,
            ElfClass::Elf64 => 64,
        }
    }
}

bitflags! {
    /// Section attribute bits that mark a section as part of the memory image.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SectionFlags: u64 {
        const WRITE = elf::SHF_WRITE as u64;
        const ALLOC = elf::SHF_ALLOC as u64;
        const EXECINSTR = elf::SHF_EXECINSTR as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionClass {
    /// Bytes are copied into the image.
    Content,
    /// Occupies address space, reads as zero (`.bss`).
    ZeroFill,
    SymbolTable,
    Ignored,
}

impl SectionClass {
    pub fn classify(sh_type: u32, flags: SectionFlags) -> Self {
        let memory_type = matches!(
            sh_type,
            elf::SHT_PROGBITS | elf::SHT_NOBITS | elf::SHT_INIT_ARRAY | elf::SHT_FINI_ARRAY
        );
        if memory_type && !flags.is_empty() {
            if sh_type == elf::SHT_NOBITS {
                SectionClass::ZeroFill
            } else {
                SectionClass::Content
            }
        } else if sh_type == elf::SHT_SYMTAB {
            SectionClass::SymbolTable
        } else {
            SectionClass::Ignored
        }
    }
}

impl fmt::Display for SectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SectionClass::Content => "content",
            SectionClass::ZeroFill => "zero-fill",
            SectionClass::SymbolTable => "symtab",
            SectionClass::Ignored => "ignored",
        };
        f.pad(s)
    }
}

/// One entry of the section table, reduced to what loading needs.
#[derive(Debug, Clone)]
pub struct SectionDescriptor {
    pub name: String,
    pub flags: SectionFlags,
    pub class: SectionClass,
    pub addr: u64,
    pub size: u64,
}

impl SectionDescriptor {
    pub fn new(name: String, sh_type: u32, raw_flags: u64, addr: u64, size: u64) -> Self {
        // Only W/A/X matter; other flag bits are dropped.
        let flags = SectionFlags::from_bits_truncate(raw_flags);
        Self {
            name,
            flags,
            class: SectionClass::classify(sh_type, flags),
            addr,
            size,
        }
    }

    /// Last byte occupied, or `None` for empty sections.
    pub fn last_addr(&self) -> Result<Option<u64>> {
        if self.size == 0 {
            return Ok(None);
        }
        self.addr
            .checked_add(self.size - 1)
            .map(Some)
            .ok_or(ConvertError::CapacityExceeded {
                max_addr: u64::MAX,
                capacity: u64::MAX,
                overflow: self.size,
            })
    }
}
