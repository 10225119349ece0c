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

//! ELF image loader.
//!
//! Walks the section table once, copying every section that represents
//! target memory into a [`MemoryImage`] and scanning symbol tables for the
//! start/exit/tohost symbols.

use std::fs;
use std::path::Path;

use object::elf;
use object::read::elf::{FileHeader, SectionHeader, Sym, SymbolTable};
use object::{Endianness, SectionIndex};

use crate::elf_items::{ElfClass, SectionClass, SectionDescriptor};
use crate::error::{ConvertError, Result};
use crate::memory::{AddressRange, MemoryImage, DEFAULT_CAPACITY};
use crate::symbols::{SymbolAddresses, SymbolTargets};

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Required `e_machine`; RISC-V unless overridden.
    pub machine: u16,
    /// Exclusive upper bound on any loaded address.
    pub capacity: u64,
    pub targets: SymbolTargets,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            machine: elf::EM_RISCV,
            capacity: DEFAULT_CAPACITY,
            targets: SymbolTargets::default(),
        }
    }
}

/// Everything a load discovers, handed to the serializer.
pub struct LoadResult {
    pub class: ElfClass,
    pub image: MemoryImage,
    pub range: AddressRange,
    pub symbols: SymbolAddresses,
}

pub fn load_elf_file(path: &Path, options: &LoaderOptions) -> Result<LoadResult> {
    let data = fs::read(path).map_err(|e| ConvertError::io(path, e))?;
    log::info!("Loading ELF file '{}' ({} bytes)", path.display(), data.len());
    load_elf(&data, options)
}

pub fn load_elf(data: &[u8], options: &LoaderOptions) -> Result<LoadResult> {
    let class = ElfClass::probe(data)?;
    log::info!("Input is a {}-bit ELF file", class.bitwidth());
    match class {
        ElfClass::Elf32 => load_sections::<elf::FileHeader32<Endianness>>(data, class, options),
        ElfClass::Elf64 => load_sections::<elf::FileHeader64<Endianness>>(data, class, options),
    }
}

fn load_sections<Elf: FileHeader<Endian = Endianness>>(
    data: &[u8],
    class: ElfClass,
    options: &LoaderOptions,
) -> Result<LoadResult> {
    let header = Elf::parse(data)?;
    let endian = header.endian()?;

    let found = header.e_machine(endian);
    if found != options.machine {
        return Err(ConvertError::WrongMachine {
            expected: options.machine,
            found,
        });
    }
    if header.e_ident().data != elf::ELFDATA2LSB {
        return Err(ConvertError::BigEndian);
    }

    let sections = header.sections(endian, data)?;
    let mut state = LoadState {
        image: MemoryImage::new(options.capacity),
        range: AddressRange::new(),
        symbols: SymbolAddresses::new(),
    };

    // Index 0 is the reserved null section.
    for (index, section) in sections.iter().enumerate().skip(1) {
        let name = sections.section_name(endian, section)?;
        let desc = SectionDescriptor::new(
            String::from_utf8_lossy(name).into_owned(),
            section.sh_type(endian),
            section.sh_flags(endian).into(),
            section.sh_addr(endian).into(),
            section.sh_size(endian).into(),
        );

        match desc.class {
            SectionClass::Content => {
                let bytes = section.data(endian, data)?;
                state.load_section(&desc, bytes)?;
            }
            SectionClass::ZeroFill => state.load_section(&desc, &[])?,
            SectionClass::SymbolTable => {
                log::info!(
                    "Section {:<16}: searching for addresses of '{}', '{}' and '{}' symbols",
                    desc.name,
                    options.targets.start,
                    options.targets.exit,
                    options.targets.tohost
                );
                let symtab =
                    SymbolTable::parse(endian, data, &sections, SectionIndex(index), section)?;
                state.scan_symbols(endian, &symtab, &options.targets)?;
            }
            SectionClass::Ignored => log::debug!("Section {:<16}: ignored", desc.name),
        }
    }

    match state.range.bounds() {
        Some((min, max)) => {
            log::info!("Min addr:            {:16x} (hex)", min);
            log::info!("Max addr:            {:16x} (hex)", max);
        }
        None => log::warn!("No loadable sections found"),
    }

    Ok(LoadResult {
        class,
        image: state.image,
        range: state.range,
        symbols: state.symbols,
    })
}

struct LoadState {
    image: MemoryImage,
    range: AddressRange,
    symbols: SymbolAddresses,
}

impl LoadState {
    /// Account for one content or zero-fill section. `bytes` is empty for zero-fill.
    fn load_section(&mut self, desc: &SectionDescriptor, bytes: &[u8]) -> Result<()> {
        let Some(last) = desc.last_addr()? else {
            log::info!("Section {:<16}: {} at {:x}, empty", desc.name, desc.class, desc.addr);
            return Ok(());
        };

        self.range.extend(desc.addr, last);
        if let Some(max) = self.range.max() {
            self.image.check_bound(max)?;
        }
        if desc.class == SectionClass::Content {
            self.image.write(desc.addr, bytes)?;
        }

        log::info!(
            "Section {:<16}: {:<9} addr {:16x} to addr {:16x}; size 0x{:8x} (= {}) bytes",
            desc.name,
            desc.class,
            desc.addr,
            last.wrapping_add(1),
            desc.size,
            desc.size
        );
        Ok(())
    }

    fn scan_symbols<'data, Elf: FileHeader>(
        &mut self,
        endian: Elf::Endian,
        symtab: &SymbolTable<'data, Elf>,
        targets: &SymbolTargets,
    ) -> Result<()> {
        let strings = symtab.strings();
        for sym in symtab.iter() {
            let name = sym.name(endian, strings)?;
            let value: u64 = sym.st_value(endian).into();
            if let Some(role) = self.symbols.offer(targets, name, value) {
                log::debug!("Resolved {:?} symbol '{}' = 0x{:x}", role, targets.name(role), value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ElfBuilder;

    fn load(bytes: &[u8]) -> Result<LoadResult> {
        load_elf(bytes, &LoaderOptions::default())
    }

    #[test]
    fn loads_text_and_tracks_range() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .text(0xC000_0000, &[1, 2, 3, 4, 5, 6, 7, 8])
            .build();
        let res = load(&elf).unwrap();
        assert_eq!(res.class, ElfClass::Elf64);
        assert_eq!(res.range.bounds(), Some((0xC000_0000, 0xC000_0007)));
        assert_eq!(res.image.read_word(0xC000_0000), [1, 2, 3, 4]);
        assert_eq!(res.image.read_word(0xC000_0004), [5, 6, 7, 8]);
    }

    #[test]
    fn loads_elf32() {
        let elf = ElfBuilder::new(ElfClass::Elf32)
            .text(0x8000_0000, &[0x13, 0, 0, 0])
            .data(0x8000_1000, &[0xaa; 8])
            .symbol("_start", 0x8000_0000)
            .build();
        let res = load(&elf).unwrap();
        assert_eq!(res.class, ElfClass::Elf32);
        assert_eq!(res.range.bounds(), Some((0x8000_0000, 0x8000_1007)));
        assert_eq!(res.image.read_byte(0x8000_1007), 0xaa);
        assert_eq!(res.image.read_byte(0x8000_0800), 0);
        assert_eq!(res.symbols.start(), Some(0x8000_0000));
    }

    #[test]
    fn bss_extends_range_without_content() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .text(0x1000, &[0xff; 4])
            .bss(0x2000, 0x100)
            .build();
        let res = load(&elf).unwrap();
        assert_eq!(res.range.max(), Some(0x20ff));
        assert_eq!(res.image.read_word(0x2000), [0; 4]);
        assert_eq!(res.image.read_word(0x20fc), [0; 4]);
    }

    #[test]
    fn init_and_fini_arrays_are_content() {
        let wa = (elf::SHF_WRITE | elf::SHF_ALLOC) as u64;
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .section(".init_array", elf::SHT_INIT_ARRAY, wa, 0x3000, &[1, 0, 0, 0])
            .section(".fini_array", elf::SHT_FINI_ARRAY, wa, 0x3008, &[2, 0, 0, 0])
            .build();
        let res = load(&elf).unwrap();
        assert_eq!(res.range.bounds(), Some((0x3000, 0x300b)));
        assert_eq!(res.image.read_byte(0x3008), 2);
    }

    #[test]
    fn unflagged_and_foreign_sections_are_ignored() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .text(0x1000, &[1; 4])
            .section(".comment", elf::SHT_PROGBITS, 0, 0, b"GCC: 13\0")
            .section(".note", elf::SHT_NOTE, elf::SHF_ALLOC as u64, 0x9000, &[9; 8])
            .build();
        let res = load(&elf).unwrap();
        assert_eq!(res.range.bounds(), Some((0x1000, 0x1003)));
        assert_eq!(res.image.read_byte(0), 0);
    }

    #[test]
    fn empty_sections_do_not_touch_range() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .text(0x1000, &[1; 4])
            .section(".sdata", elf::SHT_PROGBITS, elf::SHF_ALLOC as u64, 0x10, &[])
            .build();
        let res = load(&elf).unwrap();
        assert_eq!(res.range.bounds(), Some((0x1000, 0x1003)));
    }

    #[test]
    fn no_loadable_sections_leaves_range_unset() {
        let elf = ElfBuilder::new(ElfClass::Elf64).symbol("_start", 4).build();
        let res = load(&elf).unwrap();
        assert!(res.range.is_empty());
        assert_eq!(res.symbols.start(), Some(4));
    }

    #[test]
    fn resolves_symbols_first_match_wins() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .text(0xC000_0000, &[0; 16])
            .symbol("_start", 0xC000_0000)
            .symbol("exit", 0xC000_0008)
            .symbol("exit", 0xC000_000c)
            .symbol("tohost", 0xC000_1000)
            .build();
        let res = load(&elf).unwrap();
        assert_eq!(res.symbols.start(), Some(0xC000_0000));
        assert_eq!(res.symbols.exit(), Some(0xC000_0008));
        assert_eq!(res.symbols.tohost(), Some(0xC000_1000));
    }

    #[test]
    fn missing_symbol_is_not_an_error() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .text(0xC000_0000, &[0; 4])
            .symbol("_start", 0xC000_0000)
            .symbol("main", 0xC000_0004)
            .build();
        let res = load(&elf).unwrap();
        assert_eq!(res.symbols.tohost(), None);
        assert_eq!(res.symbols.exit(), None);
    }

    #[test]
    fn custom_symbol_targets() {
        let elf = ElfBuilder::new(ElfClass::Elf32)
            .text(0x0, &[0; 4])
            .symbol("_start", 0x0)
            .symbol("reset", 0x4)
            .build();
        let options = LoaderOptions {
            targets: SymbolTargets {
                start: "reset".into(),
                ..SymbolTargets::default()
            },
            ..LoaderOptions::default()
        };
        let res = load_elf(&elf, &options).unwrap();
        assert_eq!(res.symbols.start(), Some(0x4));
    }

    #[test]
    fn rejects_wrong_machine() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .machine(elf::EM_X86_64)
            .text(0x1000, &[0; 4])
            .build();
        assert!(matches!(
            load(&elf),
            Err(ConvertError::WrongMachine {
                expected: elf::EM_RISCV,
                found: elf::EM_X86_64
            })
        ));
    }

    #[test]
    fn machine_is_configurable() {
        let elf = ElfBuilder::new(ElfClass::Elf32)
            .machine(elf::EM_ARM)
            .text(0x1000, &[0; 4])
            .build();
        let options = LoaderOptions {
            machine: elf::EM_ARM,
            ..LoaderOptions::default()
        };
        assert!(load_elf(&elf, &options).is_ok());
    }

    #[test]
    fn rejects_big_endian() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .big_endian()
            .text(0x1000, &[0; 4])
            .build();
        assert!(matches!(load(&elf), Err(ConvertError::BigEndian)));
    }

    #[test]
    fn rejects_non_elf_and_truncated() {
        assert!(matches!(load(b"not an elf file at all"), Err(ConvertError::NotElf)));
        let elf = ElfBuilder::new(ElfClass::Elf64).text(0x1000, &[0; 4]).build();
        assert!(matches!(load(&elf[..40]), Err(ConvertError::Malformed(_))));
    }

    #[test]
    fn capacity_overflow_is_reported() {
        let elf = ElfBuilder::new(ElfClass::Elf64)
            .text(0x0ff0, &[0; 0x20])
            .build();
        let options = LoaderOptions {
            capacity: 0x1000,
            ..LoaderOptions::default()
        };
        match load_elf(&elf, &options) {
            Err(ConvertError::CapacityExceeded {
                max_addr,
                capacity,
                overflow,
            }) => {
                assert_eq!(max_addr, 0x100f);
                assert_eq!(capacity, 0x1000);
                assert_eq!(overflow, 0x10);
            }
            other => panic!("expected capacity error, got {:?}", other.err()),
        }
    }

    #[test]
    fn bss_past_capacity_is_reported() {
        let elf = ElfBuilder::new(ElfClass::Elf64).bss(0x800, 0x1000).build();
        let options = LoaderOptions {
            capacity: 0x1000,
            ..LoaderOptions::default()
        };
        assert!(matches!(
            load_elf(&elf, &options),
            Err(ConvertError::CapacityExceeded { .. })
        ));
    }
}
