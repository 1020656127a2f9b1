/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    string::String,
    vec::Vec,
};
use rabbitizer::Vram;


use crate::{
    address_range::AddressRange,
    analysis::StringGuesserLevel,
    config::{Compiler, Endian},
    context::{Context, OwnedSegmentNotFoundError},
    metadata::{segment_metadata::FindSettings, GeneratedBy, ParentSectionMetadata, SegmentMetadata, SymbolMetadata, SymbolType},
    parent_segment_info::ParentSegmentInfo,
    rom_address::RomAddress,
    rom_vram_range::RomVramRange,
    section_type::SectionType,
    size::Size,
    str_decoding::Encoding,
    symbols::{symbol_data::SymbolDataProperties, Symbol, SymbolData},
};

use super::{trait_section::RomSection, Section};

/// Smallest/largest magnitude a word's bits have to fall within to be
/// considered a plausible float rather than an integer or pointer that
/// happens to share a bit pattern with a tiny or huge float.
fn looks_like_float32(bits: u32) -> bool {
    let f = f32::from_bits(bits);
    f.is_finite() && f != 0.0 && (1.0e-30..1.0e30).contains(&f.abs())
}

fn looks_like_float64(bits: u64) -> bool {
    let f = f64::from_bits(bits);
    f.is_finite() && f != 0.0 && (1.0e-300..1.0e300).contains(&f.abs())
}

/// Guesses a primitive type for a just-discovered data/rodata symbol from its
/// raw bytes alone: doubles, then floats, then C strings. Leaves already
/// typed symbols (user-declared, or autodetected during the text analysis
/// pass, e.g. jumptables and branch labels) untouched.
#[allow(clippy::too_many_arguments)]
fn classify_data_symbol(
    bytes: &[u8],
    vram: Vram,
    existing: Option<&SymbolMetadata>,
    owned_segment: &SegmentMetadata,
    endian: Endian,
    encoding: Encoding,
    string_guesser_flags: StringGuesserLevel,
) -> Option<SymbolType> {
    if existing.is_some_and(|m| m.sym_type().is_some()) {
        return None;
    }

    if bytes.len() == 8 && vram.inner() % 8 == 0 {
        if looks_like_float64(endian.dword_from_bytes(bytes)) {
            return Some(SymbolType::Float64);
        }
    }

    if bytes.len() == 4 && looks_like_float32(endian.word_from_bytes(bytes)) {
        return Some(SymbolType::Float32);
    }

    if string_guesser_flags
        .guess(existing, vram, bytes, encoding, owned_segment)
        .is_some()
    {
        return Some(SymbolType::CString);
    }

    None
}

#[derive(Debug, Clone, Hash, PartialEq)]
#[must_use]
pub struct SectionData {
    name: String,

    ranges: RomVramRange,

    parent_segment_info: ParentSegmentInfo,

    // in_section_offset: u32,
    section_type: SectionType,

    //
    data_symbols: Vec<SymbolData>,

    symbol_vrams: BTreeSet<Vram>,
}

impl SectionData {
    // TODO: fix
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: &mut Context,
        settings: &SectionDataSettings,
        name: String,
        raw_bytes: &[u8],
        rom: RomAddress,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
        section_type: SectionType,
    ) -> Result<Self, OwnedSegmentNotFoundError> {
        assert!(
            !raw_bytes.is_empty(),
            "Can't initialize a section with empty bytes. {:?} {:?}",
            rom,
            vram
        );
        let size = Size::new(raw_bytes.len() as u32);
        let rom_range = AddressRange::new(rom, rom + size);
        let vram_range = AddressRange::new(vram, vram + size);
        let ranges = RomVramRange::new(rom_range, vram_range);

        let mut data_symbols = Vec::new();
        let mut symbol_vrams = BTreeSet::new();

        let owned_segment = context.find_owned_segment(&parent_segment_info)?;

        let mut symbols_info = BTreeSet::new();
        // Ensure there's a symbol at the beginning of the section.
        symbols_info.insert(vram);

        let mut maybe_pointers_to_other_sections = Vec::new();

        let mut auto_pads: BTreeMap<Vram, Vram> = BTreeMap::new();

        let mut remaining_string_size = -1;
        let mut prev_string_vram = vram;
        let mut pointers_in_data_to_remove = BTreeSet::new();
        let mut syms_to_drop = BTreeSet::new();

        // Look for stuff that looks like addresses which point to symbols on this section
        let displacement = (4 - (vram.inner() % 4) as usize) % 4;
        // TODO: check for symbols in the displacement and everything that the `chunk_exact` may have left out
        for (i, word_bytes) in raw_bytes[displacement..].chunks_exact(4).enumerate() {
            let local_offset = i * 4 + displacement;

            let current_vram = vram + Size::new(local_offset as u32);
            let b_vram = current_vram + Size::new(1);
            let c_vram = current_vram + Size::new(2);
            let d_vram = current_vram + Size::new(3);
            let a = owned_segment.find_symbol(
                current_vram,
                FindSettings::default().with_allow_addend(false),
            );
            let b =
                owned_segment.find_symbol(b_vram, FindSettings::default().with_allow_addend(false));
            let c =
                owned_segment.find_symbol(c_vram, FindSettings::default().with_allow_addend(false));
            let d =
                owned_segment.find_symbol(d_vram, FindSettings::default().with_allow_addend(false));

            // Avoid symbols in the middle of strings
            if remaining_string_size < 0 {
                if let Some(sym) = a {
                    if sym.sym_type() == Some(&SymbolType::CString) {
                        if let Some(str_end) =
                            raw_bytes[local_offset..].iter().position(|x| *x == 0)
                        {
                            remaining_string_size = str_end as i32;
                            prev_string_vram = current_vram;

                            symbols_info.insert(current_vram);

                            let next_vram = if let Some(size) = sym.user_declared_size() {
                                current_vram + size
                            } else {
                                current_vram + Size::new((str_end + 1).next_multiple_of(4) as u32)
                            };
                            if ((next_vram - vram).inner() as usize) < raw_bytes.len() {
                                // Avoid generating a symbol at the end of the section
                                symbols_info.insert(next_vram);
                                auto_pads.insert(next_vram, current_vram);
                            }
                        }
                    }
                }
            }

            if remaining_string_size < 0 {
                if b.is_none() && c.is_none() && d.is_none() {
                    // There's no symbol in between

                    let should_search_for_address = match a {
                        None => true,
                        Some(metadata) => metadata
                            .sym_type()
                            .is_none_or(|x| x.can_reference_symbols()),
                    };

                    if should_search_for_address {
                        // TODO: improve heuristic to determine if should search for symbols
                        let word = context.global_config().endian().word_from_bytes(word_bytes);
                        let word_vram = Vram::new(word);
                        if vram_range.in_range(word_vram) {
                            // Vram is contained in this section
                            if let Some(sym) = owned_segment.find_symbol(
                                word_vram,
                                FindSettings::default().with_allow_addend(true),
                            ) {
                                if sym.vram() == word_vram {
                                    // Only count this symbol if it doesn't have an addend.
                                    // If it does have an addend then it may be part of a larger symbol.
                                    symbols_info.insert(word_vram);
                                }
                            } else {
                                symbols_info.insert(word_vram);
                            }
                        } else {
                            let current_rom = rom + (current_vram - vram).try_into().expect("This should not panic because `current_vram` should always be greter or equal to `vram`");
                            let sym = context
                                .find_referenced_segment(word_vram, &parent_segment_info)
                                .and_then(|seg| {
                                    seg.find_symbol(word_vram, FindSettings::default())
                                });
                            if sym.is_none() {
                                maybe_pointers_to_other_sections.push((word_vram, current_rom));
                            }
                        }
                    }
                }

                for (x_vram, x) in [(current_vram, a), (b_vram, b), (c_vram, c), (d_vram, d)] {
                    if let Some(sym) = x {
                        symbols_info.insert(sym.vram());
                        if let Some(size) = sym.user_declared_size() {
                            let next_vram = sym.vram() + size;
                            if ((next_vram - vram).inner() as usize) < raw_bytes.len() {
                                // Avoid generating a symbol at the end of the section
                                symbols_info.insert(next_vram);
                                auto_pads.insert(next_vram, sym.vram());
                            }
                        }
                    } else if owned_segment.is_vram_a_possible_pointer_in_data(x_vram) {
                        symbols_info.insert(x_vram);
                    }
                }
            } else {
                for (x_vram, x) in [(current_vram, a), (b_vram, b), (c_vram, c), (d_vram, d)] {
                    if x_vram == prev_string_vram {
                        continue;
                    }

                    if let Some(sym) = x {
                        if sym.generated_by() == GeneratedBy::Autogenerated {
                            syms_to_drop.insert(x_vram);
                        }
                    }
                    pointers_in_data_to_remove.insert(x_vram);
                }
            }

            remaining_string_size -= 4;
        }

        let symbols_info_vec: Vec<Vram> = symbols_info.into_iter().collect();

        for (i, new_sym_vram) in symbols_info_vec.iter().enumerate() {
            let start = new_sym_vram.sub_vram(&vram).inner() as usize;
            let end = if i + 1 < symbols_info_vec.len() {
                symbols_info_vec[i + 1].sub_vram(&vram).inner() as usize
            } else {
                raw_bytes.len()
            };
            debug_assert!(
                start < end,
                "{:?} {} {} {} {}",
                rom,
                vram,
                start,
                end,
                raw_bytes.len()
            );

            let sym_rom = rom + Size::new(start as u32);

            symbol_vrams.insert(*new_sym_vram);

            let sym_bytes = &raw_bytes[start..end];
            let detected_type = {
                let owned_segment = context.find_owned_segment(&parent_segment_info)?;
                let existing = owned_segment
                    .find_symbol(*new_sym_vram, FindSettings::default().with_allow_addend(false));
                classify_data_symbol(
                    sym_bytes,
                    *new_sym_vram,
                    existing,
                    owned_segment,
                    context.global_config().endian(),
                    settings.encoding,
                    settings.string_guesser_flags,
                )
            };

            let properties = SymbolDataProperties {
                parent_metadata: ParentSectionMetadata::new(
                    name.clone(),
                    vram,
                    parent_segment_info.clone(),
                ),
                compiler: settings.compiler,
                auto_pad_by: auto_pads.get(new_sym_vram).copied(),
                detected_type,
            };
            let /*mut*/ sym = SymbolData::new(context, sym_bytes.into(), sym_rom, *new_sym_vram, start, parent_segment_info.clone(), section_type, properties)?;

            data_symbols.push(sym);
        }

        // Tables (jumptables, gcc except tables) were typed during the text
        // analysis pass that found the `jr`/exception-frame reference; their
        // individual word entries are only resolvable now that this section's
        // bytes are available, so the per-entry labels are created here.
        for sym in &data_symbols {
            let sym_vram = sym.vram();
            let table_type = context
                .find_owned_segment(&parent_segment_info)?
                .find_symbol(sym_vram, FindSettings::default().with_allow_addend(false))
                .and_then(|m| m.sym_type().copied())
                .filter(SymbolType::is_table);
            let Some(table_type) = table_type else {
                continue;
            };

            for word_bytes in sym.raw_bytes().chunks_exact(4) {
                let word = context.global_config().endian().word_from_bytes(word_bytes);
                let entry_vram = Vram::new(word);
                if entry_vram.inner() == 0 {
                    continue;
                }

                if let Some(segment) =
                    context.find_referenced_segment_mut(entry_vram, &parent_segment_info)
                {
                    match table_type {
                        SymbolType::Jumptable => {
                            segment.add_jumptable_label(
                                entry_vram,
                                None,
                                GeneratedBy::Autogenerated,
                            );
                        }
                        SymbolType::GccExceptTable => {
                            segment.add_gcc_except_table_label(
                                entry_vram,
                                None,
                                GeneratedBy::Autogenerated,
                            );
                        }
                        _ => {}
                    }
                }
            }
        }

        let owned_segment_mut = context.find_owned_segment_mut(&parent_segment_info)?;
        for (possible_pointer, rom_address_referencing_pointer) in maybe_pointers_to_other_sections
        {
            owned_segment_mut
                .add_possible_pointer_in_data(possible_pointer, rom_address_referencing_pointer);
        }
        for possible_pointer in pointers_in_data_to_remove {
            owned_segment_mut.drop_possible_pointer_in_data(possible_pointer);
        }
        for sym_to_drop in syms_to_drop {
            owned_segment_mut.drop_symbol(sym_to_drop);
        }

        Ok(Self {
            name,
            ranges,
            parent_segment_info,
            section_type,
            data_symbols,
            symbol_vrams,
        })
    }

    pub fn data_symbols(&self) -> &[SymbolData] {
        &self.data_symbols
    }
}

impl Section for SectionData {
    fn name(&self) -> &str {
        &self.name
    }

    fn vram_range(&self) -> &AddressRange<Vram> {
        self.ranges.vram()
    }

    fn parent_segment_info(&self) -> &ParentSegmentInfo {
        &self.parent_segment_info
    }

    #[must_use]
    fn section_type(&self) -> SectionType {
        self.section_type
    }

    fn symbol_list(&self) -> &[impl Symbol] {
        &self.data_symbols
    }

    fn symbols_vrams(&self) -> &BTreeSet<Vram> {
        &self.symbol_vrams
    }
}

impl RomSection for SectionData {
    fn rom_vram_range(&self) -> &RomVramRange {
        &self.ranges
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SectionDataSettings {
    compiler: Option<Compiler>,
    encoding: Encoding,
    string_guesser_flags: StringGuesserLevel,
}

impl SectionDataSettings {
    pub fn new(compiler: Option<Compiler>) -> Self {
        Self {
            compiler,
            encoding: Encoding::default(),
            string_guesser_flags: StringGuesserLevel::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_string_guesser_flags(mut self, flags: StringGuesserLevel) -> Self {
        self.string_guesser_flags = flags;
        self
    }
}
