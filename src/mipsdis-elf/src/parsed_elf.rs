/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use std::{
    collections::{btree_map, BTreeMap, HashSet},
    sync::Arc,
};

use object::{read::elf::ElfFile32, Object, ObjectSection, ObjectSymbol, SectionKind};
use mipsdis::{config::Endian, rabbitizer::Vram, rom_address::RomAddress, size::Size};

use crate::{
    elf_section_type::ProgbitsType,
    elf_symbol::ElfSymbol,
    utils,
};

/// The parts of an ELF32 relocatable object this tool actually needs: the
/// allocated PROGBITS/NOBITS sections grouped by what kind of data they
/// carry, plus the symbol table collapsed by address (several symbols can
/// alias the same value; the first one seen at a value is treated as the
/// canonical name and the rest as labels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedElf {
    kind: object::ObjectKind,
    endian: Endian,

    executable_sections: Vec<ElfExecutableSection>,
    data_sections: Vec<ElfDataSection>,
    nobits_sections: Vec<ElfNobitsSection>,

    symbols: BTreeMap<u32, SymbolsPerValue>,
}

impl ParsedElf {
    pub fn parse_elf(elf_file: ElfFile32) -> Self {
        let kind = elf_file.kind();
        let elf_endian = elf_file.endian();
        let endian = utils::endian_to_endian(elf_endian);

        let mut executable_sections = Vec::new();
        let mut data_sections = Vec::new();
        let mut nobits_sections = Vec::new();

        for section in elf_file.sections() {
            let name = match section.name() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if section.size() == 0 {
                continue;
            }

            let address = Vram::new(section.address() as u32);
            let offset = RomAddress::new(section.file_range().map(|r| r.0 as u32).unwrap_or(0));
            let size = Size::new(section.size() as u32);
            let section_name: Arc<str> = name.into();

            match section.kind() {
                SectionKind::Text => {
                    let data = section.data().unwrap_or(&[]).to_vec();
                    executable_sections.push(ElfExecutableSection {
                        name: section_name,
                        address,
                        offset,
                        size,
                        data,
                    });
                }
                SectionKind::Data | SectionKind::Tls => {
                    let data = section.data().unwrap_or(&[]).to_vec();
                    data_sections.push(ElfDataSection {
                        progbits_type: ProgbitsType::Data,
                        name: section_name,
                        address,
                        offset,
                        size,
                        data,
                    });
                }
                SectionKind::ReadOnlyData | SectionKind::ReadOnlyString => {
                    let data = section.data().unwrap_or(&[]).to_vec();
                    data_sections.push(ElfDataSection {
                        progbits_type: ProgbitsType::Rodata,
                        name: section_name,
                        address,
                        offset,
                        size,
                        data,
                    });
                }
                SectionKind::UninitializedData | SectionKind::UninitializedTls => {
                    nobits_sections.push(ElfNobitsSection {
                        name: section_name,
                        address,
                        offset,
                        size,
                    });
                }
                _ => {}
            }
        }

        let mut symbols_map: BTreeMap<u32, SymbolsPerValueBuilder> = BTreeMap::new();
        for sym in elf_file.symbols() {
            match sym.kind() {
                object::SymbolKind::Unknown
                | object::SymbolKind::Null
                | object::SymbolKind::Label
                | object::SymbolKind::Text
                | object::SymbolKind::Data => {}
                _ => continue,
            }

            let Ok(name) = sym.name() else { continue };
            if name.is_empty() {
                continue;
            }

            let elf_sym = ElfSymbol::new(&sym);

            match symbols_map.entry(elf_sym.value()) {
                btree_map::Entry::Occupied(mut occupied) => occupied.get_mut().insert(elf_sym),
                btree_map::Entry::Vacant(vacant) => {
                    vacant.insert(SymbolsPerValueBuilder::new(elf_sym));
                }
            }
        }

        let symbols = symbols_map
            .into_iter()
            .map(|(value, builder)| (value, builder.build()))
            .collect();

        Self {
            kind,
            endian,
            executable_sections,
            data_sections,
            nobits_sections,
            symbols,
        }
    }

    #[must_use]
    pub fn kind(&self) -> object::ObjectKind {
        self.kind
    }
    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }
    #[must_use]
    pub fn executable_sections(&self) -> &[ElfExecutableSection] {
        &self.executable_sections
    }
    #[must_use]
    pub fn data_sections(&self) -> &[ElfDataSection] {
        &self.data_sections
    }
    #[must_use]
    pub fn nobits_sections(&self) -> &[ElfNobitsSection] {
        &self.nobits_sections
    }
    #[must_use]
    pub fn symbols(&self) -> &BTreeMap<u32, SymbolsPerValue> {
        &self.symbols
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElfExecutableSection {
    name: Arc<str>,
    address: Vram,
    offset: RomAddress,
    size: Size,
    data: Vec<u8>,
}

impl ElfExecutableSection {
    #[must_use]
    pub fn name(&self) -> Arc<str> {
        self.name.clone()
    }
    #[must_use]
    pub fn address(&self) -> Vram {
        self.address
    }
    #[must_use]
    pub fn offset(&self) -> RomAddress {
        self.offset
    }
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElfDataSection {
    progbits_type: ProgbitsType,
    name: Arc<str>,
    address: Vram,
    offset: RomAddress,
    size: Size,
    data: Vec<u8>,
}

impl ElfDataSection {
    #[must_use]
    pub fn progbits_type(&self) -> ProgbitsType {
        self.progbits_type
    }
    #[must_use]
    pub fn name(&self) -> Arc<str> {
        self.name.clone()
    }
    #[must_use]
    pub fn address(&self) -> Vram {
        self.address
    }
    #[must_use]
    pub fn offset(&self) -> RomAddress {
        self.offset
    }
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElfNobitsSection {
    name: Arc<str>,
    address: Vram,
    offset: RomAddress,
    size: Size,
}

impl ElfNobitsSection {
    #[must_use]
    pub fn name(&self) -> Arc<str> {
        self.name.clone()
    }
    #[must_use]
    pub fn address(&self) -> Vram {
        self.address
    }
    #[must_use]
    pub fn offset(&self) -> RomAddress {
        self.offset
    }
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolsPerValue {
    value: u32,
    syms: Vec<ElfSymbol>,
}

impl SymbolsPerValue {
    #[must_use]
    pub fn syms(&self) -> &Vec<ElfSymbol> {
        &self.syms
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SymbolsPerValueBuilder {
    value: u32,
    syms: HashSet<ElfSymbol>,
}

impl SymbolsPerValueBuilder {
    fn new(elf_sym: ElfSymbol) -> Self {
        let value = elf_sym.value();
        let mut syms = HashSet::new();
        syms.insert(elf_sym);

        Self { value, syms }
    }

    fn insert(&mut self, elf_sym: ElfSymbol) {
        debug_assert_eq!(self.value, elf_sym.value());
        self.syms.insert(elf_sym);
    }

    fn build(self) -> SymbolsPerValue {
        let mut syms: Vec<ElfSymbol> = self.syms.into_iter().collect();
        syms.sort();

        SymbolsPerValue {
            value: self.value,
            syms,
        }
    }
}
