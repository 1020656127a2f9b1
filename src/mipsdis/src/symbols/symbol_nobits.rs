/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::Vram;

use crate::{
    address_range::AddressRange,
    context::{Context, OwnedSegmentNotFoundError},
    metadata::GeneratedBy,
    parent_segment_info::ParentSegmentInfo,
    section_type::SectionType,
    size::Size,
};

use super::{Symbol, SymbolBase};

/// A symbol living in a noload (`.bss`) section. Unlike [`super::SymbolData`]
/// it has no bytes of its own: the section only knows its reserved size, not
/// its contents, since `.bss` isn't backed by rom.
#[derive(Debug, Clone, Hash, PartialEq)]
pub struct SymbolNoload {
    symbol_base: SymbolBase,
    size: Size,
}

impl SymbolNoload {
    pub(crate) fn new(
        context: &mut Context,
        vram_range: AddressRange<Vram>,
        _in_section_offset: usize,
        parent_segment_info: ParentSegmentInfo,
    ) -> Result<Self, OwnedSegmentNotFoundError> {
        let vram = vram_range.start();
        let size = vram_range.size();

        {
            let owned_segment = context.find_owned_segment_mut(&parent_segment_info)?;
            let sym = owned_segment.add_symbol(
                vram,
                None,
                GeneratedBy::Autogenerated,
                Some(SectionType::Bss),
                false,
            );
            sym.set_defined();
        }

        Ok(Self {
            symbol_base: SymbolBase::new(None, vram, parent_segment_info),
            size,
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

impl Symbol for SymbolNoload {
    fn symbol_base(&self) -> &SymbolBase {
        &self.symbol_base
    }
}
