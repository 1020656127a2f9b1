/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{
    collections::{
        btree_map::{self, BTreeMap},
        btree_set::BTreeSet,
    },
    string::String,
    vec::Vec,
};
use rabbitizer::Vram;


use crate::{
    address_range::AddressRange,
    config::GlobalConfig,
    metadata::{GeneratedBy, OverlayCategory, OverlayCategoryName, SegmentMetadata, SymbolMetadata},
    rom_address::RomAddress,
    rom_vram_range::RomVramRange,
    sections::{SectionDataSettings, SectionTextSettings},
};

use super::Context;

pub struct SegmentModifier<'a> {
    segment: &'a mut SegmentMetadata,
}

impl SegmentModifier<'_> {
    pub fn add_symbol(
        &mut self,
        name: String,
        vram: Vram,
        rom: Option<RomAddress>,
    ) -> &mut SymbolMetadata {
        let sym = self
            .segment
            .add_symbol(vram, rom, GeneratedBy::UserDeclared, None, false);
        *sym.user_declared_name_mut() = Some(name);
        sym
    }

    pub fn add_function(
        &mut self,
        name: String,
        vram: Vram,
        rom: Option<RomAddress>,
    ) -> &mut SymbolMetadata {
        let sym = self
            .segment
            .add_function(vram, rom, GeneratedBy::UserDeclared);
        *sym.user_declared_name_mut() = Some(name);
        sym
    }

    pub fn add_branch_label(
        &mut self,
        name: String,
        vram: Vram,
        rom: Option<RomAddress>,
    ) -> &mut SymbolMetadata {
        let sym = self
            .segment
            .add_branch_label(vram, rom, GeneratedBy::UserDeclared);
        *sym.user_declared_name_mut() = Some(name);
        sym
    }

    pub fn add_jumptable(
        &mut self,
        name: String,
        vram: Vram,
        rom: Option<RomAddress>,
    ) -> &mut SymbolMetadata {
        let sym = self
            .segment
            .add_jumptable(vram, rom, GeneratedBy::UserDeclared);
        *sym.user_declared_name_mut() = Some(name);
        sym
    }

    pub fn add_jumptable_label(
        &mut self,
        name: String,
        vram: Vram,
        rom: Option<RomAddress>,
    ) -> &mut SymbolMetadata {
        let sym = self
            .segment
            .add_jumptable_label(vram, rom, GeneratedBy::UserDeclared);
        *sym.user_declared_name_mut() = Some(name);
        sym
    }

    pub fn add_gcc_except_table(
        &mut self,
        name: String,
        vram: Vram,
        rom: Option<RomAddress>,
    ) -> &mut SymbolMetadata {
        let sym = self
            .segment
            .add_gcc_except_table(vram, rom, GeneratedBy::UserDeclared);
        *sym.user_declared_name_mut() = Some(name);
        sym
    }

    pub fn add_gcc_except_table_label(
        &mut self,
        name: String,
        vram: Vram,
        rom: Option<RomAddress>,
    ) -> &mut SymbolMetadata {
        let sym = self
            .segment
            .add_gcc_except_table_label(vram, rom, GeneratedBy::UserDeclared);
        *sym.user_declared_name_mut() = Some(name);
        sym
    }
}

#[derive(Debug, Clone, Hash, PartialEq)]
pub struct ContextBuilder {
    global_config: GlobalConfig,

    global_segment: SegmentMetadata,

    banned_vrams: BTreeSet<Vram>,
    banned_vram_ranges: Vec<AddressRange<Vram>>,
}

impl ContextBuilder {
    #[must_use]
    pub fn new(global_config: GlobalConfig, global_ranges: RomVramRange) -> Self {
        let global_segment =
            SegmentMetadata::new(*global_ranges.rom(), *global_ranges.vram(), None);

        Self {
            global_config,
            global_segment,
            banned_vrams: BTreeSet::new(),
            banned_vram_ranges: Vec::new(),
        }
    }

    #[must_use]
    pub fn global_segment(&mut self) -> SegmentModifier {
        SegmentModifier {
            segment: &mut self.global_segment,
        }
    }

    /// Marks an address that looks like a pointer but is known not to be
    /// one; it will never be promoted into a symbol.
    pub fn ban_vram(&mut self, vram: Vram) {
        self.banned_vrams.insert(vram);
    }
    pub fn ban_vram_range(&mut self, range: AddressRange<Vram>) {
        self.banned_vram_ranges.push(range);
    }

    #[must_use]
    pub fn process(self) -> ContextBuilderOverlay {
        ContextBuilderOverlay {
            global_config: self.global_config,
            global_segment: self.global_segment,
            overlay_segments: BTreeMap::new(),
            banned_vrams: self.banned_vrams,
            banned_vram_ranges: self.banned_vram_ranges,
        }
    }
}

pub struct OverlaysBuilder<'a> {
    name: OverlayCategoryName,
    entry: btree_map::Entry<'a, OverlayCategoryName, OverlayCategory>,
    overlays: Vec<SegmentMetadata>,
}

impl OverlaysBuilder<'_> {
    #[must_use]
    pub fn add_overlay(&mut self, ranges: RomVramRange) -> SegmentModifier {
        self.overlays.push(SegmentMetadata::new(
            *ranges.rom(),
            *ranges.vram(),
            Some(self.name.clone()),
        ));
        SegmentModifier {
            segment: self
                .overlays
                .last_mut()
                .expect("This shouldn't panic since we just added an element"),
        }
    }

    // TODO: proper error type
    #[allow(clippy::result_unit_err)]
    pub fn build(self) -> Result<(), ()> {
        if self.overlays.is_empty() {
            return Err(());
        }

        let mut segments = BTreeMap::new();

        let mut ranges = *self.overlays[0].rom_vram_range();

        for seg in self.overlays {
            ranges.expand_ranges(seg.rom_vram_range());
            segments.insert(seg.rom_range().start(), seg);
        }

        let placeholder_segment =
            SegmentMetadata::new(*ranges.rom(), *ranges.vram(), Some(self.name));
        self.entry
            .or_insert(OverlayCategory::new(placeholder_segment, segments));
        Ok(())
    }
}

#[derive(Debug, Clone, Hash, PartialEq)]
pub struct ContextBuilderOverlay {
    global_config: GlobalConfig,

    global_segment: SegmentMetadata,
    overlay_segments: BTreeMap<OverlayCategoryName, OverlayCategory>,

    banned_vrams: BTreeSet<Vram>,
    banned_vram_ranges: Vec<AddressRange<Vram>>,
}

impl ContextBuilderOverlay {
    #[must_use]
    pub fn add_overlay_category(&mut self, category: OverlayCategoryName) -> OverlaysBuilder {
        OverlaysBuilder {
            name: category.clone(),
            entry: self.overlay_segments.entry(category),
            overlays: Vec::new(),
        }
    }

    #[must_use]
    pub fn process(self) -> ContextBuilderFinderHeater {
        ContextBuilderFinderHeater {
            global_config: self.global_config,
            global_segment: self.global_segment,
            overlay_segments: self.overlay_segments,
            banned_vrams: self.banned_vrams,
            banned_vram_ranges: self.banned_vram_ranges,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq)]
pub struct ContextBuilderFinderHeater {
    global_config: GlobalConfig,

    global_segment: SegmentMetadata,
    overlay_segments: BTreeMap<OverlayCategoryName, OverlayCategory>,

    banned_vrams: BTreeSet<Vram>,
    banned_vram_ranges: Vec<AddressRange<Vram>>,
}

impl ContextBuilderFinderHeater {
    pub fn preanalyze_text(
        &mut self,
        _settings: &SectionTextSettings,
        _raw_bytes: &[u8],
        _rom: RomAddress,
        _vram: Vram,
    ) {
    }

    pub fn preanalyze_data(
        &mut self,
        _settings: &SectionDataSettings,
        _raw_bytes: &[u8],
        _rom: RomAddress,
        _vram: Vram,
    ) {
    }

    pub fn preanalyze_rodata(
        &mut self,
        _settings: &SectionDataSettings,
        raw_bytes: &[u8],
        _rom: RomAddress,
        vram: Vram,
    ) {
        // Look for stuff that looks like addresses which point to symbols on this section
        let displacement = (4 - (vram.inner() % 4) as usize) % 4;
        for (i, _word_bytes) in raw_bytes[displacement..].chunks_exact(4).enumerate() {
            let _local_offset = i * 4 + displacement;

            // let current_rom = rom + Size::new(local_offset as u32);
        }
    }

    pub fn preanalyze_gcc_except_table(
        &mut self,
        _settings: &SectionDataSettings,
        _raw_bytes: &[u8],
        _rom: RomAddress,
        _vram: Vram,
    ) {
    }

    #[must_use]
    pub fn process(self) -> ContextBuilderFinderHeaterOverlays {
        ContextBuilderFinderHeaterOverlays {
            global_config: self.global_config,
            global_segment: self.global_segment,
            overlay_segments: self.overlay_segments,
            banned_vrams: self.banned_vrams,
            banned_vram_ranges: self.banned_vram_ranges,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq)]
pub struct ContextBuilderFinderHeaterOverlays {
    global_config: GlobalConfig,

    global_segment: SegmentMetadata,
    overlay_segments: BTreeMap<OverlayCategoryName, OverlayCategory>,

    banned_vrams: BTreeSet<Vram>,
    banned_vram_ranges: Vec<AddressRange<Vram>>,
}

impl ContextBuilderFinderHeaterOverlays {
    #[must_use]
    pub fn build(self) -> Context {
        let mut context = Context::new(
            self.global_config,
            self.global_segment,
            self.overlay_segments,
        );
        for vram in self.banned_vrams {
            context.ban_vram(vram);
        }
        for range in self.banned_vram_ranges {
            context.ban_vram_range(range);
        }
        context
    }
}
