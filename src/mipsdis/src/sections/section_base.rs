/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::string::String;

use rabbitizer::vram::VramOffset;
use rabbitizer::Vram;

use crate::address_range::AddressRange;
use crate::parent_segment_info::ParentSegmentInfo;
use crate::rom_address::RomAddress;
use crate::rom_vram_range::RomVramRange;
use crate::section_type::SectionType;
use crate::size::Size;

pub struct SectionBase {
    name: String,

    ranges: RomVramRange,

    parent_segment_info: ParentSegmentInfo,

    section_type: SectionType,
}

impl SectionBase {
    pub fn new(
        name: String,
        rom: RomAddress,
        vram: Vram,
        size: Size,
        parent_segment_info: ParentSegmentInfo,
        section_type: SectionType,
    ) -> Self {
        let rom_range = AddressRange::new(rom, rom + size);
        let vram_range = AddressRange::new(vram, vram + size);
        Self {
            name,
            ranges: RomVramRange::new(rom_range, vram_range),
            parent_segment_info,
            section_type,
        }
    }
}

impl SectionBase {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub const fn vram_offset(&self, local_offset: usize) -> Vram {
        self.ranges
            .vram()
            .start()
            .add_offset(&VramOffset::new(local_offset as i32))
    }
    pub const fn rom_offset(&self, local_offset: usize) -> RomAddress {
        self.ranges
            .rom()
            .start()
            .add_size(&Size::new(local_offset as u32))
    }
    pub fn parent_segment_info(&self) -> &ParentSegmentInfo {
        &self.parent_segment_info
    }
    pub fn vram_range(&self) -> &AddressRange<Vram> {
        self.ranges.vram()
    }
    pub fn rom_vram_range(&self) -> &RomVramRange {
        &self.ranges
    }
    pub fn section_type(&self) -> SectionType {
        self.section_type
    }
}
