/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::vec::Vec;
use rabbitizer::Vram;

use crate::{
    config::Compiler,
    context::{Context, OwnedSegmentNotFoundError},
    metadata::{GeneratedBy, ParentSectionMetadata, SymbolType},
    parent_segment_info::ParentSegmentInfo,
    rom_address::RomAddress,
    section_type::SectionType,
    size::Size,
};

use super::{Symbol, SymbolBase};

/// Counts how many trailing zero bytes of `bytes` belong to padding rather
/// than to the symbol's own data, one element at a time, leaving at least
/// one element behind. The element size depends on the symbol's type: a
/// trailing zero float or word is ambiguous with padding, so only whole
/// trailing elements get trimmed, never a partial one.
fn count_padding(bytes: &[u8], sym_type: Option<SymbolType>) -> usize {
    let elem_size: usize = match sym_type {
        Some(SymbolType::CString) | Some(SymbolType::Function) => return 0,
        Some(SymbolType::Float64) | Some(SymbolType::DWord) => 8,
        Some(SymbolType::Byte) => 1,
        Some(SymbolType::Short) => 2,
        _ => 4,
    };

    if bytes.len() <= elem_size {
        return 0;
    }

    let mut padding = 0;
    let mut offset = bytes.len();
    while offset >= elem_size * 2 {
        let chunk = &bytes[offset - elem_size..offset];
        if chunk.iter().all(|b| *b == 0) {
            padding += elem_size;
            offset -= elem_size;
        } else {
            break;
        }
    }
    padding
}

/// Metadata that only the owning section can compute before a [`SymbolData`]
/// is registered: where it lives (its parent file), which compiler produced
/// it, whether it is a padding symbol auto-created after a user-sized
/// neighbor, and whatever type the section's byte scan guessed for it.
pub(crate) struct SymbolDataProperties {
    pub(crate) parent_metadata: ParentSectionMetadata,
    pub(crate) compiler: Option<Compiler>,
    pub(crate) auto_pad_by: Option<Vram>,
    pub(crate) detected_type: Option<SymbolType>,
}

/// A symbol living in an initialized data-bearing section (`.data`,
/// `.rodata`). Unlike a function, a data symbol doesn't get disassembled;
/// its bytes are classified by the owning section into a primitive type
/// (word, float, string, ...) based on alignment, content and cross
/// references.
#[derive(Debug, Clone, Hash, PartialEq)]
pub struct SymbolData {
    symbol_base: SymbolBase,
    raw_bytes: Vec<u8>,
}

impl SymbolData {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        context: &mut Context,
        raw_bytes: Vec<u8>,
        rom: RomAddress,
        vram: Vram,
        _in_section_offset: usize,
        parent_segment_info: ParentSegmentInfo,
        section_type: SectionType,
        properties: SymbolDataProperties,
    ) -> Result<Self, OwnedSegmentNotFoundError> {
        {
            let owned_segment = context.find_owned_segment_mut(&parent_segment_info)?;
            let sym = owned_segment.add_symbol(
                vram,
                Some(rom),
                GeneratedBy::Autogenerated,
                Some(section_type),
                false,
            );
            sym.set_defined();
            sym.set_parent_metadata(properties.parent_metadata);
            if let Some(compiler) = properties.compiler {
                sym.set_compiler(compiler);
            }
            if let Some(pad_by) = properties.auto_pad_by {
                sym.set_auto_created_pad_by(pad_by);
            }
            if let Some(detected_type) = properties.detected_type {
                sym.set_type(detected_type, GeneratedBy::Autogenerated);
            }

            if sym.user_declared_size().is_none() {
                let padding = count_padding(&raw_bytes, sym.sym_type().copied());
                if padding > 0 {
                    *sym.autodetected_size_mut() =
                        Some(Size::new((raw_bytes.len() - padding) as u32));
                }
            }
        }

        Ok(Self {
            symbol_base: SymbolBase::new(Some(rom), vram, parent_segment_info),
            raw_bytes,
        })
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }
}

impl Symbol for SymbolData {
    fn symbol_base(&self) -> &SymbolBase {
        &self.symbol_base
    }
}
