/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::btree_set::BTreeSet;

use rabbitizer::Vram;

use super::{Endian, GlobalOffsetTable, GpConfig};

/// Global, binary-wide toggles threaded through the Context to every
/// analyzer. A few toggles from the source this was distilled from are
/// purely output-formatting knobs for the bit-exact assembly writer (out of
/// scope here per spec); those are kept as plain fields so a future writer
/// can read them, but nothing in this crate branches on them.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct GlobalConfig {
    endian: Endian,
    /// Endianness used when decoding rodata string literals, independent of
    /// the instruction-stream endianness above (some toolchains byteswap
    /// `.rodata` data but not `.text`).
    endian_rodata: Endian,
    gp_config: Option<GpConfig>,
    got: Option<GlobalOffsetTable>,

    /// Addresses below `0x80000000` found by the symbol finder are treated
    /// as spurious and folded back into constants instead of references.
    symbol_finder_filter_low_addresses: bool,
    /// Addresses at or above `0xC0000000` found by the symbol finder are
    /// treated as spurious and folded back into constants instead of
    /// references.
    symbol_finder_filter_high_addresses: bool,
    /// A filtered-out address is recorded as a plain constant value on both
    /// halves of its `%hi`/`%lo` pairing.
    symbol_finder_filtered_addresses_as_constants: bool,
    /// A filtered-out address is left as an unresolved `%hi`/`%lo` pairing
    /// instead (mutually exclusive in practice with the constants mode
    /// above; both toggles exist independently to match the source list).
    symbol_finder_filtered_addresses_as_hilo: bool,

    /// Whether the data/rodata word scanner should run the string-guesser
    /// heuristic at all.
    string_guesser: bool,
    /// Specific words the scanner should never classify as a pointer, even
    /// if they land inside a known segment's vram range.
    ignore_word_list: BTreeSet<Vram>,
    /// Skip branch-target discovery entirely (useful for hand-annotated
    /// binaries where all labels are already user-declared).
    ignore_branches: bool,
    /// Whether a reference that lands strictly inside a symbol's body (not
    /// on its first word) is allowed to resolve to `symbol+offset` instead
    /// of being rejected.
    produce_symbols_plus_offset: bool,
    /// Allow references that don't land in any known segment to resolve
    /// into a synthetic "unknown" segment instead of being dropped.
    allow_unksegment: bool,
    /// Trust user-declared function declarations without re-deriving their
    /// boundaries from branch/call analysis.
    trust_user_functions: bool,
    /// Emit `.word 0x<raw>` for instructions the decoder can't classify
    /// instead of reclassifying the whole function as data.
    disassemble_unknown_instructions: bool,
    /// Allow the analyzer to insert brand-new symbols for references that
    /// don't already have one, instead of only resolving to existing ones.
    add_new_symbols: bool,
    /// Collapse a recognized CPLOAD idiom into a single pseudo-instruction
    /// in the writer's output.
    emit_cpload: bool,
}

impl GlobalConfig {
    pub fn new(endian: Endian) -> Self {
        Self {
            endian,
            endian_rodata: endian,
            gp_config: None,
            got: None,
            symbol_finder_filter_low_addresses: true,
            symbol_finder_filter_high_addresses: true,
            symbol_finder_filtered_addresses_as_constants: true,
            symbol_finder_filtered_addresses_as_hilo: false,
            string_guesser: true,
            ignore_word_list: BTreeSet::new(),
            ignore_branches: false,
            produce_symbols_plus_offset: true,
            allow_unksegment: false,
            trust_user_functions: true,
            disassemble_unknown_instructions: false,
            add_new_symbols: true,
            emit_cpload: true,
        }
    }
}

impl GlobalConfig {
    pub const fn endian(&self) -> Endian {
        self.endian
    }
    pub fn endian_mut(&mut self) -> &mut Endian {
        &mut self.endian
    }
    pub const fn with_endian(self, endian: Endian) -> Self {
        Self { endian, ..self }
    }

    pub fn gp_config(&self) -> Option<GpConfig> {
        self.gp_config
    }
    pub fn gp_config_mut(&mut self) -> &mut Option<GpConfig> {
        &mut self.gp_config
    }
    pub fn with_gp_config(self, gp_config: Option<GpConfig>) -> Self {
        Self { gp_config, ..self }
    }

    pub fn got(&self) -> Option<&GlobalOffsetTable> {
        self.got.as_ref()
    }
    pub fn got_mut(&mut self) -> &mut Option<GlobalOffsetTable> {
        &mut self.got
    }
    pub fn with_got(self, got: Option<GlobalOffsetTable>) -> Self {
        Self { got, ..self }
    }

    pub const fn symbol_finder_filter_low_addresses(&self) -> bool {
        self.symbol_finder_filter_low_addresses
    }
    pub fn set_symbol_finder_filter_low_addresses(&mut self, val: bool) {
        self.symbol_finder_filter_low_addresses = val;
    }

    pub const fn symbol_finder_filter_high_addresses(&self) -> bool {
        self.symbol_finder_filter_high_addresses
    }
    pub fn set_symbol_finder_filter_high_addresses(&mut self, val: bool) {
        self.symbol_finder_filter_high_addresses = val;
    }

    pub const fn symbol_finder_filtered_addresses_as_constants(&self) -> bool {
        self.symbol_finder_filtered_addresses_as_constants
    }
    pub fn set_symbol_finder_filtered_addresses_as_constants(&mut self, val: bool) {
        self.symbol_finder_filtered_addresses_as_constants = val;
    }

    pub const fn symbol_finder_filtered_addresses_as_hilo(&self) -> bool {
        self.symbol_finder_filtered_addresses_as_hilo
    }
    pub fn set_symbol_finder_filtered_addresses_as_hilo(&mut self, val: bool) {
        self.symbol_finder_filtered_addresses_as_hilo = val;
    }

    pub const fn endian_rodata(&self) -> Endian {
        self.endian_rodata
    }
    pub fn set_endian_rodata(&mut self, val: Endian) {
        self.endian_rodata = val;
    }

    pub const fn string_guesser(&self) -> bool {
        self.string_guesser
    }
    pub fn set_string_guesser(&mut self, val: bool) {
        self.string_guesser = val;
    }

    pub fn ignore_word_list(&self) -> &BTreeSet<Vram> {
        &self.ignore_word_list
    }
    pub fn add_ignored_word(&mut self, word: Vram) {
        self.ignore_word_list.insert(word);
    }

    pub const fn ignore_branches(&self) -> bool {
        self.ignore_branches
    }
    pub fn set_ignore_branches(&mut self, val: bool) {
        self.ignore_branches = val;
    }

    pub const fn produce_symbols_plus_offset(&self) -> bool {
        self.produce_symbols_plus_offset
    }
    pub fn set_produce_symbols_plus_offset(&mut self, val: bool) {
        self.produce_symbols_plus_offset = val;
    }

    pub const fn allow_unksegment(&self) -> bool {
        self.allow_unksegment
    }
    pub fn set_allow_unksegment(&mut self, val: bool) {
        self.allow_unksegment = val;
    }

    pub const fn trust_user_functions(&self) -> bool {
        self.trust_user_functions
    }
    pub fn set_trust_user_functions(&mut self, val: bool) {
        self.trust_user_functions = val;
    }

    pub const fn disassemble_unknown_instructions(&self) -> bool {
        self.disassemble_unknown_instructions
    }
    pub fn set_disassemble_unknown_instructions(&mut self, val: bool) {
        self.disassemble_unknown_instructions = val;
    }

    pub const fn add_new_symbols(&self) -> bool {
        self.add_new_symbols
    }
    pub fn set_add_new_symbols(&mut self, val: bool) {
        self.add_new_symbols = val;
    }

    pub const fn emit_cpload(&self) -> bool {
        self.emit_cpload
    }
    pub fn set_emit_cpload(&mut self, val: bool) {
        self.emit_cpload = val;
    }
}
