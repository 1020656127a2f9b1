/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{
    collections::{btree_set::BTreeSet, vec_deque::VecDeque},
    string::ToString,
    vec::Vec,
};
use rabbitizer::Vram;

use crate::{
    context::Context,
    metadata::{RodataMigrationBehavior, SymbolMetadata, SymbolMetadataNameDisplay},
    sections::{Section, SectionData, SectionText},
    symbols::{Symbol, SymbolData, SymbolFunction},
};

use super::RodataIterator;

/// Pairs functions of a `.text` section to the rodata symbols of a `.rodata`
/// section they reference, preserving the original order of both sections.
///
/// A function or a rodata symbol may end up orphaned, meaning it isn't
/// paired to any symbol of the other section. Orphans still get an entry of
/// their own so that callers can reconstruct the interleaved emission order.
#[derive(Debug, Clone, Hash, PartialEq)]
pub enum FuncRodataPairing<'text, 'rodata> {
    SingleFunction {
        function: &'text SymbolFunction,
    },
    SingleRodata {
        rodata: &'rodata SymbolData,
    },
    Pairing {
        function: &'text SymbolFunction,
        rodata_syms: Vec<&'rodata SymbolData>,
        late_rodata_syms: Vec<&'rodata SymbolData>,
        /// `Some(4|8)` when the aggregate size of `late_rodata_syms` exceeds
        /// one third of the owning function's instruction count and a
        /// `.late_rodata_alignment` directive must be emitted before them.
        late_rodata_alignment: Option<u8>,
    },
}

impl<'text, 'rodata> FuncRodataPairing<'text, 'rodata> {
    pub fn pair_sections(
        context: &Context,
        text_section: Option<&'text SectionText>,
        rodata_section: Option<&'rodata SectionData>,
    ) -> Vec<Self> {
        let mut all_entries = Vec::new();

        // A deque lets us cheaply drop rodata symbols from the front as they
        // get consumed, while keeping the ones that never get referenced by
        // any function to report them as orphans afterwards.
        let mut remaining_rodata_symbols: VecDeque<&SymbolData> = rodata_section
            .iter()
            .flat_map(|x| x.data_symbols())
            .collect();
        let mut handled_symbols = BTreeSet::new();

        for func in text_section.iter().flat_map(|x| x.functions()) {
            let entry = Self::pair_function_to_rodata_section(context, func, rodata_section);

            for rodata in entry.iter_rodata() {
                handled_symbols.insert(rodata.vram());
            }

            // Preserve the order of rodata symbols by looking for symbols that
            // weren't migrated anywhere before the first symbol migrated here.
            if let FuncRodataPairing::Pairing { rodata_syms, .. } = &entry {
                if !rodata_syms.is_empty() {
                    let first_rodata_sym = &rodata_syms[0];

                    while !remaining_rodata_symbols.is_empty() {
                        let rodata = &remaining_rodata_symbols[0];

                        if handled_symbols.contains(&rodata.vram()) {
                            remaining_rodata_symbols.pop_front();
                            continue;
                        }

                        if rodata.vram() >= first_rodata_sym.vram() {
                            break;
                        }

                        all_entries.push(FuncRodataPairing::SingleRodata { rodata });
                        handled_symbols.insert(rodata.vram());
                        remaining_rodata_symbols.pop_front();
                    }
                }
            }

            all_entries.push(entry)
        }

        for rodata in remaining_rodata_symbols {
            if !handled_symbols.contains(&rodata.vram()) {
                all_entries.push(FuncRodataPairing::SingleRodata { rodata });
            }
        }

        all_entries
    }

    fn pair_function_to_rodata_section(
        context: &Context,
        function: &'text SymbolFunction,
        rodata_section: Option<&'rodata SectionData>,
    ) -> Self {
        let Some(rodata_section) = rodata_section else {
            return FuncRodataPairing::SingleFunction { function };
        };

        let mut rodata_syms = Vec::new();
        let mut late_rodata_syms = Vec::new();

        let intersection: BTreeSet<Vram> = function
            .referenced_vrams()
            .collect::<BTreeSet<Vram>>()
            .intersection(rodata_section.symbols_vrams())
            .copied()
            .collect();

        let func_metadata = function.find_own_metadata(context);
        let func_name = func_metadata.display_name();
        let compiler_has_late_rodata = func_metadata
            .compiler()
            .is_some_and(|x| x.has_late_rodata());

        let mut migrable_rodata_syms = BTreeSet::new();
        let mut migrable_late_rodata_syms = BTreeSet::new();
        let mut maybe_migrable_rodata_syms = BTreeSet::new();
        let mut maybe_migrable_late_rodata_syms = BTreeSet::new();
        let mut rodata_migrated_somewhere_else = false;
        let mut late_rodata_migrated_somewhere_else = false;

        for rodata_sym in rodata_section.data_symbols() {
            if rodata_migrated_somewhere_else
                && (!compiler_has_late_rodata || late_rodata_migrated_somewhere_else)
            {
                break;
            }

            let rodata_metadata = rodata_sym.find_own_metadata(context);

            if rodata_metadata.is_late_rodata() {
                late_rodata_migrated_somewhere_else = Self::update_migrable_symbols_sets(
                    rodata_metadata,
                    rodata_sym.raw_bytes(),
                    &intersection,
                    &func_name,
                    &mut migrable_late_rodata_syms,
                    &mut maybe_migrable_late_rodata_syms,
                    late_rodata_migrated_somewhere_else,
                )
            } else {
                rodata_migrated_somewhere_else = Self::update_migrable_symbols_sets(
                    rodata_metadata,
                    rodata_sym.raw_bytes(),
                    &intersection,
                    &func_name,
                    &mut migrable_rodata_syms,
                    &mut maybe_migrable_rodata_syms,
                    rodata_migrated_somewhere_else,
                )
            }
        }

        for rodata_sym in rodata_section.data_symbols() {
            let rodata_vram = rodata_sym.vram();

            if migrable_late_rodata_syms.contains(&rodata_vram) {
                late_rodata_syms.push(rodata_sym);
            } else if migrable_rodata_syms.contains(&rodata_vram) {
                rodata_syms.push(rodata_sym);
            }
        }

        let late_rodata_alignment = Self::compute_late_rodata_alignment(function, &late_rodata_syms);

        FuncRodataPairing::Pairing {
            function,
            rodata_syms,
            late_rodata_syms,
            late_rodata_alignment,
        }
    }

    /// A `.late_rodata_alignment` directive is only needed once the late
    /// rodata migrated into this function is dense enough relative to the
    /// function's own size. The emitted alignment mirrors whatever the first
    /// late-rodata symbol itself requires (doubles need 8, everything else
    /// that ends up here only needs 4).
    fn compute_late_rodata_alignment(
        function: &SymbolFunction,
        late_rodata_syms: &[&'rodata SymbolData],
    ) -> Option<u8> {
        let first = late_rodata_syms.first()?;

        let aggregate_words: usize = late_rodata_syms
            .iter()
            .map(|sym| sym.raw_bytes().len().div_ceil(4))
            .sum();
        let instr_count = function.instructions().len();
        if instr_count == 0 || aggregate_words * 3 <= instr_count {
            return None;
        }

        Some(if first.vram().inner() % 8 == 0 { 8 } else { 4 })
    }

    /// Decides, scanning left to right, which rodata symbols migrate to the
    /// current function. A completely unreferenced symbol may still migrate
    /// if it sits between two symbols that do migrate here: it is kept in
    /// `maybe_migrable_rodata_syms` until the next migrable symbol confirms
    /// it, or until something breaks the run.
    #[allow(clippy::too_many_arguments)]
    fn update_migrable_symbols_sets(
        rodata_metadata: &SymbolMetadata,
        raw_bytes: &[u8],
        intersection: &BTreeSet<Vram>,
        func_name: &SymbolMetadataNameDisplay,
        migrable_rodata_syms: &mut BTreeSet<Vram>,
        maybe_migrable_rodata_syms: &mut BTreeSet<Vram>,
        mut rodata_migrated_somewhere_else: bool,
    ) -> bool {
        if rodata_migrated_somewhere_else {
            return rodata_migrated_somewhere_else;
        }

        if Self::should_migrate_rodata_symbol_to_function(
            rodata_metadata,
            raw_bytes,
            intersection,
            func_name,
        ) {
            migrable_rodata_syms.insert(rodata_metadata.vram());
            migrable_rodata_syms.append(maybe_migrable_rodata_syms);
        } else if !migrable_rodata_syms.is_empty() {
            if rodata_metadata.reference_counter() > 0 {
                rodata_migrated_somewhere_else = true;
            } else if rodata_metadata.is_migrable(raw_bytes) {
                maybe_migrable_rodata_syms.insert(rodata_metadata.vram());
            } else {
                rodata_migrated_somewhere_else = true;
            }
        }

        rodata_migrated_somewhere_else
    }

    fn should_migrate_rodata_symbol_to_function(
        rodata_metadata: &SymbolMetadata,
        raw_bytes: &[u8],
        intersection: &BTreeSet<Vram>,
        func_name: &SymbolMetadataNameDisplay,
    ) -> bool {
        if let RodataMigrationBehavior::MigrateToSpecificFunction(owner_name) =
            rodata_metadata.rodata_migration_behavior()
        {
            // An explicit owner overrides everything: migrate only there.
            *owner_name == func_name.to_string()
        } else if !intersection.contains(&rodata_metadata.vram()) {
            false
        } else {
            rodata_metadata.is_migrable(raw_bytes)
        }
    }
}

impl FuncRodataPairing<'_, '_> {
    /// `Some(4|8)` when a `.late_rodata_alignment` directive must precede
    /// this function's migrated late rodata.
    pub fn late_rodata_alignment(&self) -> Option<u8> {
        match self {
            FuncRodataPairing::Pairing {
                late_rodata_alignment,
                ..
            } => *late_rodata_alignment,
            _ => None,
        }
    }
}

impl<'ctx> FuncRodataPairing<'_, '_> {
    pub fn display_name(&self, context: &'ctx Context) -> SymbolMetadataNameDisplay<'ctx> {
        match &self {
            FuncRodataPairing::SingleFunction { function }
            | FuncRodataPairing::Pairing { function, .. } => function.find_own_metadata(context),
            FuncRodataPairing::SingleRodata { rodata } => rodata.find_own_metadata(context),
        }
        .display_name()
    }
}

impl<'pairing, 'text, 'rodata> FuncRodataPairing<'text, 'rodata> {
    pub fn iter_rodata(&'pairing self) -> RodataIterator<'pairing, 'text, 'rodata> {
        RodataIterator::new(self)
    }
}
