/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::{error, fmt};

use alloc::collections::btree_map::BTreeMap;
use alloc::collections::btree_set::BTreeSet;
use alloc::vec::Vec;

use ::polonius_the_crab::prelude::*;

use rabbitizer::Vram;

use alloc::string::String;

use crate::{
    address_range::AddressRange,
    config::GlobalConfig,
    metadata::{OverlayCategory, OverlayCategoryName, SegmentMetadata},
    parent_segment_info::ParentSegmentInfo,
    rom_address::RomAddress,
    section_type::SectionType,
    sections::{
        SectionData, SectionDataSettings, SectionNoload, SectionNoloadSettings, SectionText,
        SectionTextSettings,
    },
};

pub struct Context {
    global_config: GlobalConfig,

    global_segment: SegmentMetadata,
    // unknown_segment: SegmentMetadata,

    //
    overlay_segments: BTreeMap<OverlayCategoryName, OverlayCategory>,

    //
    // totalVramRange: SymbolsRanges

    /// Addresses that look like pointers but are known not to be one;
    /// `find_referenced_segment_mut` refuses to promote a reference to any
    /// of these, so they never get turned into a symbol.
    banned_vrams: BTreeSet<Vram>,
    banned_vram_ranges: Vec<AddressRange>,

    // self.globalRelocationOverrides: dict[int, RelocationInfo] = dict()
    // "key: vrom address"

    // self.gpAccesses = GpAccessContainer()
}

impl Context {
    pub fn new(
        global_config: GlobalConfig,
        global_segment: SegmentMetadata,
        overlay_segments: BTreeMap<OverlayCategoryName, OverlayCategory>,
    ) -> Self {
        Self {
            global_config,
            global_segment,
            overlay_segments,
            banned_vrams: BTreeSet::new(),
            banned_vram_ranges: Vec::new(),
        }
    }
}

impl Context {
    pub const fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }
    pub const fn global_segment(&self) -> &SegmentMetadata {
        &self.global_segment
    }

    pub fn ban_vram(&mut self, vram: Vram) {
        self.banned_vrams.insert(vram);
    }
    pub fn ban_vram_range(&mut self, range: AddressRange<Vram>) {
        self.banned_vram_ranges.push(range);
    }
    pub fn is_banned(&self, vram: Vram) -> bool {
        self.banned_vrams.contains(&vram)
            || self
                .banned_vram_ranges
                .iter()
                .any(|range| range.in_range(vram))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_section_text(
        &mut self,
        settings: &SectionTextSettings,
        name: String,
        raw_bytes: &[u8],
        rom: RomAddress,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
    ) -> Result<SectionText, OwnedSegmentNotFoundError> {
        SectionText::new(
            self,
            settings,
            name,
            raw_bytes,
            rom,
            vram,
            parent_segment_info,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_section_data(
        &mut self,
        settings: &SectionDataSettings,
        name: String,
        raw_bytes: &[u8],
        rom: RomAddress,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
    ) -> Result<SectionData, OwnedSegmentNotFoundError> {
        SectionData::new(
            self,
            settings,
            name,
            raw_bytes,
            rom,
            vram,
            parent_segment_info,
            SectionType::Data,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_section_rodata(
        &mut self,
        settings: &SectionDataSettings,
        name: String,
        raw_bytes: &[u8],
        rom: RomAddress,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
    ) -> Result<SectionData, OwnedSegmentNotFoundError> {
        SectionData::new(
            self,
            settings,
            name,
            raw_bytes,
            rom,
            vram,
            parent_segment_info,
            SectionType::Rodata,
        )
    }

    pub fn create_section_bss(
        &mut self,
        settings: &SectionNoloadSettings,
        name: String,
        vram: Vram,
        size: crate::size::Size,
        parent_segment_info: ParentSegmentInfo,
    ) -> Result<SectionNoload, OwnedSegmentNotFoundError> {
        SectionNoload::new(
            self,
            settings,
            name,
            AddressRange::new(vram, vram + size),
            parent_segment_info,
        )
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub struct OwnedSegmentNotFoundError {}
impl fmt::Display for OwnedSegmentNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // TODO: more info
        write!(f, "Can't find segment")
    }
}
impl error::Error for OwnedSegmentNotFoundError {}

impl Context {
    pub /*(crate)*/ fn find_owned_segment(
        &self,
        info: &ParentSegmentInfo,
    ) -> Result<&SegmentMetadata, OwnedSegmentNotFoundError> {
        if let Some(overlay_name) = info.overlay_category_name() {
            if let Some(category) = self.overlay_segments.get(overlay_name) {
                if let Some(segment) = category.segments().get(&info.segment_rom()) {
                    debug_assert!(segment.category_name() == Some(overlay_name));
                    debug_assert!(segment.rom_range().start() == info.segment_rom());
                    return Ok(segment);
                }
                if category.placeholder_segment().in_rom_range(info.segment_rom()) {
                    return Ok(category.placeholder_segment());
                }
            }
        } else if self.global_segment.in_rom_range(info.segment_rom()) {
            // Global segment may contain more than one actual segment, so checking for ranges is okay.
            return Ok(&self.global_segment);
        }
        Err(OwnedSegmentNotFoundError {})
    }
    pub(crate) fn find_owned_segment_mut(
        &mut self,
        info: &ParentSegmentInfo,
    ) -> Result<&mut SegmentMetadata, OwnedSegmentNotFoundError> {
        if let Some(overlay_category_name) = info.overlay_category_name() {
            if let Some(category) = self.overlay_segments.get_mut(overlay_category_name) {
                if category.segments().contains_key(&info.segment_rom()) {
                    let segment = category
                        .segments_mut()
                        .get_mut(&info.segment_rom())
                        .expect("just checked membership");
                    debug_assert!(segment.category_name() == Some(overlay_category_name));
                    debug_assert!(segment.rom_range().start() == info.segment_rom());
                    return Ok(segment);
                }
                if category.placeholder_segment().in_rom_range(info.segment_rom()) {
                    return Ok(category.placeholder_segment_mut());
                }
            }
        } else if self.global_segment.in_rom_range(info.segment_rom()) {
            // Global segment may contain more than one actual segment, so checking for ranges is okay.
            return Ok(&mut self.global_segment);
        }
        Err(OwnedSegmentNotFoundError {})
    }

    pub/*(crate)*/ fn find_referenced_segment(
        &self,
        vram: Vram,
        info: &ParentSegmentInfo,
    ) -> Option<&SegmentMetadata> { // TODO: Maybe remove Option and actually implement the unknown_segment?
        if self.global_segment.in_vram_range(vram) {
            return Some(&self.global_segment);
        }

        if let Some(overlay_category_name) = info.overlay_category_name() {
            // First check the segment associated to this category that matches the rom address of the parent segment to prioritize it.
            if let Some(category) = self.overlay_segments.get(overlay_category_name) {
                if let Some(segment) = category.segments().get(&info.segment_rom()) {
                    if segment.in_vram_range(vram) {
                        return Some(segment);
                    }
                }
                if category.placeholder_segment().in_vram_range(vram) {
                    return Some(category.placeholder_segment());
                }
            }

            // If not found, then we should check every category except the one that associated to the parent segment.
            for (ovl_cat, category) in self.overlay_segments.iter() {
                if overlay_category_name == ovl_cat {
                    continue;
                }
                for segment in category.segments().values() {
                    if segment.in_vram_range(vram) {
                        return Some(segment);
                    }
                }
                if category.placeholder_segment().in_vram_range(vram) {
                    return Some(category.placeholder_segment());
                }
            }
        }

        None
    }
}

fn find_referenced_segment_mut_impl<'ctx>(
    mut slf: &'ctx mut Context,
    vram: Vram,
    info: &ParentSegmentInfo,
) -> Option<&'ctx mut SegmentMetadata> {
    if slf.global_segment.in_vram_range(vram) {
        return Some(&mut slf.global_segment);
    }

    if let Some(overlay_category_name) = info.overlay_category_name() {
        // First check the segment associated to this category that matches the rom address of the parent segment to prioritize it.

        polonius!(|slf| -> Option<&'polonius mut SegmentMetadata> {
            if let Some(category) = slf.overlay_segments.get_mut(overlay_category_name) {
                if category.segments().contains_key(&info.segment_rom()) {
                    let segment = category
                        .segments_mut()
                        .get_mut(&info.segment_rom())
                        .expect("just checked membership");
                    if segment.in_vram_range(vram) {
                        polonius_return!(Some(segment));
                    }
                } else if category.placeholder_segment().in_vram_range(vram) {
                    polonius_return!(Some(category.placeholder_segment_mut()));
                }
            }
        });

        // If not found, then we should check every category except the one that associated to the parent segment.
        for (ovl_cat, category) in slf.overlay_segments.iter_mut() {
            if overlay_category_name == ovl_cat {
                continue;
            }
            for segment in category.segments_mut().values_mut() {
                if segment.in_vram_range(vram) {
                    return Some(segment);
                }
            }
            if category.placeholder_segment().in_vram_range(vram) {
                return Some(category.placeholder_segment_mut());
            }
        }
    }

    None
}

impl Context {
    pub/*(crate)*/ fn find_referenced_segment_mut(
        &mut self,
        vram: Vram,
        info: &ParentSegmentInfo,
    ) -> Option<&mut SegmentMetadata> { // TODO: Maybe remove Option and actually implement the unknown_segment?
        if self.is_banned(vram) {
            return None;
        }
        find_referenced_segment_mut_impl(self, vram, info)
    }
}
