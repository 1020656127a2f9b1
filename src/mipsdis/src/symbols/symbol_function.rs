/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::vec::Vec;
use rabbitizer::{Instruction, Vram};

use crate::{
    address_range::AddressRange,
    analysis::{InstructionAnalysisResult, InstructionAnalyzer},
    config::GotEntry,
    context::{Context, OwnedSegmentNotFoundError},
    metadata::{GeneratedBy, SymbolType},
    parent_segment_info::ParentSegmentInfo,
    rom_address::RomAddress,
    rom_vram_range::RomVramRange,
    size::Size,
};

use super::{Symbol, SymbolBase};

pub struct SymbolFunction {
    symbol_base: SymbolBase,
    instructions: Vec<Instruction>,
    instr_analysis: InstructionAnalysisResult,
}

impl SymbolFunction {
    pub(crate) fn new(
        context: &mut Context,
        instructions: Vec<Instruction>,
        rom: RomAddress,
        vram: Vram,
        _in_section_offset: usize,
        parent_segment_info: &ParentSegmentInfo,
    ) -> Result<Self, OwnedSegmentNotFoundError> {
        let size = Size::new(instructions.len() as u32 * 4);
        let rom_range = AddressRange::new(rom, rom + size);
        let vram_range = AddressRange::new(vram, vram + size);
        let ranges = RomVramRange::new(rom_range, vram_range);

        let instr_analysis = InstructionAnalyzer::analyze(context, ranges, &instructions);

        {
            let owned_segment = context.find_owned_segment_mut(parent_segment_info)?;
            owned_segment.add_function(vram, Some(rom), GeneratedBy::Autogenerated);
        }

        Self::promote_referenced_symbols(context, &instr_analysis, parent_segment_info);

        Ok(Self {
            symbol_base: SymbolBase::new(Some(rom), vram, parent_segment_info.clone()),
            instructions,
            instr_analysis,
        })
    }

    /// Materializes context symbols for every address this function's
    /// analysis pass discovered: called functions, branch/jumptable targets,
    /// and plain `%hi`/`%lo` data references. Promotion never downgrades an
    /// already-typed symbol; it only fills in a type guess when none exists.
    fn promote_referenced_symbols(
        context: &mut Context,
        instr_analysis: &InstructionAnalysisResult,
        parent_segment_info: &ParentSegmentInfo,
    ) {
        let func_vram = instr_analysis.ranges().vram().start();

        for (&instr_rom, &target_vram) in instr_analysis.func_calls() {
            if let Some(segment) =
                context.find_referenced_segment_mut(target_vram, parent_segment_info)
            {
                let sym = segment.add_function(target_vram, None, GeneratedBy::Autogenerated);
                sym.add_reference_function(func_vram, parent_segment_info.clone(), instr_rom);
            }
        }

        for (&instr_rom, &target_vram) in instr_analysis.branch_targets() {
            if let Some(segment) =
                context.find_referenced_segment_mut(target_vram, parent_segment_info)
            {
                let sym =
                    segment.add_symbol(target_vram, None, GeneratedBy::Autogenerated, None, false);
                if sym.sym_type().is_none() {
                    sym.set_type(SymbolType::BranchLabel, GeneratedBy::Autogenerated);
                }
                sym.add_reference_function(func_vram, parent_segment_info.clone(), instr_rom);
            }
        }

        for (&instr_rom, &target_vram) in instr_analysis.referenced_jumptables() {
            if let Some(segment) =
                context.find_referenced_segment_mut(target_vram, parent_segment_info)
            {
                let sym =
                    segment.add_symbol(target_vram, None, GeneratedBy::Autogenerated, None, false);
                sym.set_type(SymbolType::Jumptable, GeneratedBy::Autogenerated);
                sym.add_reference_function(func_vram, parent_segment_info.clone(), instr_rom);
            }
        }

        for (&instr_rom, &target_vram) in instr_analysis.address_per_instr() {
            if let Some(segment) =
                context.find_referenced_segment_mut(target_vram, parent_segment_info)
            {
                let sym =
                    segment.add_symbol(target_vram, None, GeneratedBy::Autogenerated, None, false);
                sym.add_reference_function(func_vram, parent_segment_info.clone(), instr_rom);

                if let Some(access_type) = instr_analysis.possible_symbol_types().get(&target_vram)
                {
                    sym.set_access_type_if_unset(*access_type);
                }
            }
        }

        for (&instr_rom, &(got_index, got_entry)) in instr_analysis.got_accesses() {
            let slot_vram = match got_entry {
                GotEntry::Local(vram) | GotEntry::Global(vram) => vram,
            };
            if let Some(segment) =
                context.find_referenced_segment_mut(slot_vram, parent_segment_info)
            {
                let sym =
                    segment.add_symbol(slot_vram, None, GeneratedBy::Autogenerated, None, false);
                sym.add_reference_function(func_vram, parent_segment_info.clone(), instr_rom);
                match got_entry {
                    GotEntry::Local(_) => sym.set_got_local(got_index),
                    GotEntry::Global(_) => sym.set_got_global(got_index),
                };
            }
        }
    }
}

impl SymbolFunction {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    #[must_use]
    pub fn instr_analysis(&self) -> &InstructionAnalysisResult {
        &self.instr_analysis
    }

    /// Every vram this function is known to reference, used by the rodata
    /// migration pass to pair rodata symbols back to their owning function.
    #[must_use]
    pub fn referenced_vrams(&self) -> impl Iterator<Item = Vram> + '_ {
        self.instr_analysis.referenced_vrams().iter().copied()
    }
}

impl Symbol for SymbolFunction {
    fn symbol_base(&self) -> &SymbolBase {
        &self.symbol_base
    }
}
