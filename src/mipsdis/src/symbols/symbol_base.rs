/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::Vram;

use crate::{
    context::Context, metadata::segment_metadata::FindSettings, metadata::SymbolMetadata,
    parent_segment_info::ParentSegmentInfo, rom_address::RomAddress,
};

#[derive(Debug, Clone, Hash, PartialEq)]
pub struct SymbolBase {
    rom: Option<RomAddress>,
    vram: Vram,
    parent_segment_info: ParentSegmentInfo,
}

impl SymbolBase {
    pub(crate) fn new(
        rom: Option<RomAddress>,
        vram: Vram,
        parent_segment_info: ParentSegmentInfo,
    ) -> Self {
        Self {
            rom,
            vram,
            parent_segment_info,
        }
    }

    pub fn rom(&self) -> Option<RomAddress> {
        self.rom
    }
    pub fn vram(&self) -> Vram {
        self.vram
    }
    pub fn parent_segment_info(&self) -> &ParentSegmentInfo {
        &self.parent_segment_info
    }
}

pub trait Symbol {
    fn symbol_base(&self) -> &SymbolBase;

    fn rom(&self) -> Option<RomAddress> {
        self.symbol_base().rom()
    }
    fn vram(&self) -> Vram {
        self.symbol_base().vram()
    }
    fn parent_segment_info(&self) -> &ParentSegmentInfo {
        self.symbol_base().parent_segment_info()
    }

    /// Looks up this symbol's own metadata entry back in the context it was
    /// registered on. Every constructed symbol is guaranteed to have been
    /// added to its owning segment, so this never fails in practice.
    fn find_own_metadata<'ctx>(&self, context: &'ctx Context) -> &'ctx SymbolMetadata {
        context
            .find_owned_segment(self.parent_segment_info())
            .ok()
            .and_then(|segment| {
                segment.find_symbol(self.vram(), FindSettings::new().with_allow_addend(false))
            })
            .expect("a constructed symbol is always registered in its owning segment")
    }
}
