//! Byte-level ELF writer for fixtures.
//!
//! Builds small ELF32/ELF64 images with arbitrary sections and a symbol
//! table, so loader behaviour can be checked without a cross toolchain.

use object::elf;

use crate::elf_items::{ElfClass, EI_NIDENT};

const SHF_WA: u64 = (elf::SHF_WRITE | elf::SHF_ALLOC) as u64;
const SHF_AX: u64 = (elf::SHF_ALLOC | elf::SHF_EXECINSTR) as u64;

struct SectionSpec {
    name: String,
    sh_type: u32,
    flags: u64,
    addr: u64,
    data: Vec<u8>,
    size: u64,
}

pub struct ElfBuilder {
    class: ElfClass,
    big_endian: bool,
    machine: u16,
    sections: Vec<SectionSpec>,
    symbols: Vec<(String, u64)>,
}

impl ElfBuilder {
    /// Little-endian RISC-V executable with no sections yet.
    pub fn new(class: ElfClass) -> Self {
        Self {
            class,
            big_endian: false,
            machine: elf::EM_RISCV,
            sections: Vec::new(),
            symbols: Vec::new(),
        }
    }

    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn section(mut self, name: &str, sh_type: u32, flags: u64, addr: u64, data: &[u8]) -> Self {
        self.sections.push(SectionSpec {
            name: name.to_string(),
            sh_type,
            flags,
            addr,
            data: data.to_vec(),
            size: data.len() as u64,
        });
        self
    }

    pub fn text(self, addr: u64, data: &[u8]) -> Self {
        self.section(".text", elf::SHT_PROGBITS, SHF_AX, addr, data)
    }

    pub fn data(self, addr: u64, data: &[u8]) -> Self {
        self.section(".data", elf::SHT_PROGBITS, SHF_WA, addr, data)
    }

    pub fn bss(mut self, addr: u64, size: u64) -> Self {
        self.sections.push(SectionSpec {
            name: ".bss".to_string(),
            sh_type: elf::SHT_NOBITS,
            flags: SHF_WA,
            addr,
            data: Vec::new(),
            size,
        });
        self
    }

    pub fn symbol(mut self, name: &str, value: u64) -> Self {
        self.symbols.push((name.to_string(), value));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let is64 = self.class == ElfClass::Elf64;
        let (ehsize, phentsize, shentsize, symsize) = if is64 {
            (64u16, 56u16, 64u16, 24u64)
        } else {
            (52, 32, 40, 16)
        };

        let mut shstrtab = StringTable::new();
        let mut headers: Vec<RawHeader> = vec![RawHeader::default()];
        let mut out = Out::new(self.big_endian, is64);
        out.bytes.resize(ehsize as usize, 0);

        for section in &self.sections {
            out.align(8);
            let offset = out.bytes.len() as u64;
            if section.sh_type != elf::SHT_NOBITS {
                out.bytes.extend_from_slice(&section.data);
            }
            headers.push(RawHeader {
                name: shstrtab.add(&section.name),
                sh_type: section.sh_type,
                flags: section.flags,
                addr: section.addr,
                offset,
                size: section.size,
                link: 0,
                info: 0,
                addralign: 4,
                entsize: 0,
            });
        }

        if !self.symbols.is_empty() {
            let mut strtab = StringTable::new();
            let mut syms = Out::new(self.big_endian, is64);
            // Null symbol first.
            syms.bytes.resize(symsize as usize, 0);
            for (name, value) in &self.symbols {
                let name_off = strtab.add(name);
                let info = (elf::STB_GLOBAL << 4) | elf::STT_NOTYPE;
                if is64 {
                    syms.u32(name_off);
                    syms.bytes.push(info);
                    syms.bytes.push(0);
                    syms.u16(elf::SHN_ABS);
                    syms.u64(*value);
                    syms.u64(0);
                } else {
                    syms.u32(name_off);
                    syms.u32(*value as u32);
                    syms.u32(0);
                    syms.bytes.push(info);
                    syms.bytes.push(0);
                    syms.u16(elf::SHN_ABS);
                }
            }

            let symtab_index = headers.len() as u32;
            out.align(8);
            let symtab_offset = out.bytes.len() as u64;
            out.bytes.extend_from_slice(&syms.bytes);
            headers.push(RawHeader {
                name: shstrtab.add(".symtab"),
                sh_type: elf::SHT_SYMTAB,
                flags: 0,
                addr: 0,
                offset: symtab_offset,
                size: syms.bytes.len() as u64,
                link: symtab_index + 1,
                info: 1,
                addralign: 8,
                entsize: symsize,
            });

            let strtab_offset = out.bytes.len() as u64;
            out.bytes.extend_from_slice(&strtab.bytes);
            headers.push(RawHeader {
                name: shstrtab.add(".strtab"),
                sh_type: elf::SHT_STRTAB,
                flags: 0,
                addr: 0,
                offset: strtab_offset,
                size: strtab.bytes.len() as u64,
                link: 0,
                info: 0,
                addralign: 1,
                entsize: 0,
            });
        }

        let shstrndx = headers.len() as u16;
        let shstrtab_name = shstrtab.add(".shstrtab");
        let shstrtab_offset = out.bytes.len() as u64;
        out.bytes.extend_from_slice(&shstrtab.bytes);
        headers.push(RawHeader {
            name: shstrtab_name,
            sh_type: elf::SHT_STRTAB,
            flags: 0,
            addr: 0,
            offset: shstrtab_offset,
            size: shstrtab.bytes.len() as u64,
            link: 0,
            info: 0,
            addralign: 1,
            entsize: 0,
        });

        out.align(8);
        let shoff = out.bytes.len() as u64;
        for h in &headers {
            out.u32(h.name);
            out.u32(h.sh_type);
            out.word(h.flags);
            out.word(h.addr);
            out.word(h.offset);
            out.word(h.size);
            out.u32(h.link);
            out.u32(h.info);
            out.word(h.addralign);
            out.word(h.entsize);
        }

        // File header goes last, once the section table offset is known.
        let mut hdr = Out::new(self.big_endian, is64);
        hdr.bytes.extend_from_slice(&elf::ELFMAG);
        hdr.bytes.push(if is64 { elf::ELFCLASS64 } else { elf::ELFCLASS32 });
        hdr.bytes.push(if self.big_endian {
            elf::ELFDATA2MSB
        } else {
            elf::ELFDATA2LSB
        });
        hdr.bytes.push(elf::EV_CURRENT);
        hdr.bytes.resize(EI_NIDENT, 0);
        hdr.u16(elf::ET_EXEC);
        hdr.u16(self.machine);
        hdr.u32(elf::EV_CURRENT as u32);
        hdr.word(self.symbols.first().map(|(_, v)| *v).unwrap_or(0));
        hdr.word(0);
        hdr.word(shoff);
        hdr.u32(0);
        hdr.u16(ehsize);
        hdr.u16(phentsize);
        hdr.u16(0);
        hdr.u16(shentsize);
        hdr.u16(headers.len() as u16);
        hdr.u16(shstrndx);
        debug_assert_eq!(hdr.bytes.len(), ehsize as usize);

        out.bytes[..hdr.bytes.len()].copy_from_slice(&hdr.bytes);
        out.bytes
    }
}

#[derive(Default)]
struct RawHeader {
    name: u32,
    sh_type: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    addralign: u64,
    entsize: u64,
}

struct StringTable {
    bytes: Vec<u8>,
}

impl StringTable {
    fn new() -> Self {
        Self { bytes: vec![0] }
    }

    fn add(&mut self, s: &str) -> u32 {
        let off = self.bytes.len() as u32;
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        off
    }
}

struct Out {
    bytes: Vec<u8>,
    big_endian: bool,
    is64: bool,
}

impl Out {
    fn new(big_endian: bool, is64: bool) -> Self {
        Self {
            bytes: Vec::new(),
            big_endian,
            is64,
        }
    }

    fn align(&mut self, to: usize) {
        let len = self.bytes.len().div_ceil(to) * to;
        self.bytes.resize(len, 0);
    }

    fn u16(&mut self, v: u16) {
        let b = if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        self.bytes.extend_from_slice(&b);
    }

    fn u32(&mut self, v: u32) {
        let b = if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        self.bytes.extend_from_slice(&b);
    }

    fn u64(&mut self, v: u64) {
        let b = if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        self.bytes.extend_from_slice(&b);
    }

    /// Class-sized field: 4 bytes for ELF32, 8 for ELF64.
    fn word(&mut self, v: u64) {
        if self.is64 {
            self.u64(v)
        } else {
            self.u32(v as u32)
        }
    }
}
