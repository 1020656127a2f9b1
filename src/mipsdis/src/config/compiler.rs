/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */


use crate::metadata::SymbolType;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Compiler {
    // N64
    IDO,
    KMC,
    SN64,

    // iQue
    EGCS,

    // PS1
    PSYQ,

    // PS2
    MWCCPS2,
    EEGCC,
}

impl Compiler {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "IDO" => Some(Compiler::IDO),
            "KMC" => Some(Compiler::KMC),
            "SN64" => Some(Compiler::SN64),
            "EGCS" => Some(Compiler::EGCS),
            "PSYQ" => Some(Compiler::PSYQ),
            "MWCCPS2" => Some(Compiler::MWCCPS2),
            "EEGCC" => Some(Compiler::EEGCC),
            _ => None,
        }
    }
}

// TODO: remove `#[allow(dead_code)]`
#[allow(dead_code)]
impl Compiler {
    pub const fn name(&self) -> &'static str {
        match self {
            Compiler::IDO => "IDO",
            Compiler::KMC => "KMC",
            Compiler::SN64 => "SN64",
            Compiler::EGCS => "EGCS",
            Compiler::PSYQ => "PSYQ",
            Compiler::MWCCPS2 => "MWCCPS2",
            Compiler::EEGCC => "EEGCC",
        }
    }

    pub(crate) const fn has_late_rodata(&self) -> bool {
        matches!(self, Compiler::IDO)
    }

    pub(crate) const fn pair_multiple_hi_to_same_low(&self) -> bool {
        !matches!(self, Compiler::IDO)
    }

    pub(crate) const fn allow_rdata_migration(&self) -> bool {
        matches!(self, Compiler::SN64 | Compiler::PSYQ)
    }

    /// Modern GAS can handle big addends (outside the 16-bits range) for the
    /// `%lo` directive just fine, but old assemblers choke on them, so we
    /// truncate them to said range when building with those assemblers.
    ///
    /// Decomp projects usually use two assemblers: one for unmigrated files
    /// (modern GAS), and another for individual functions inserted into C
    /// files via the compiler's own asm directives or an external tool (like
    /// asm-proc for IDO). Migrated functions need to know which kind of
    /// assembler they'll hit, hence this flag is keyed off the compiler
    /// rather than off "modern vs old assembler" directly.
    pub(crate) const fn big_addend_workaround_for_migrated_functions(&self) -> bool {
        !matches!(self, Compiler::IDO)
    }

    /// The value the compiler will use to align the `.text` section of the
    /// given object, used to determine `.text` file splits when
    /// disassembling a full ROM image. The real alignment is `1 << x`.
    ///
    /// Left as `None` for compilers that emit one `.text` section per
    /// function, where the split detector can't give a meaningful result.
    pub(crate) const fn section_align_text(&self) -> Option<u8> {
        match self {
            Compiler::IDO => Some(4),
            Compiler::KMC => Some(4),
            Compiler::SN64 => Some(4),
            Compiler::EGCS => Some(4),
            _ => None,
        }
    }

    /// Same as [`Self::section_align_text`] but for `.rodata`.
    pub(crate) const fn section_align_rodata(&self) -> Option<u8> {
        match self {
            Compiler::IDO => Some(4),
            Compiler::KMC => Some(4),
            Compiler::SN64 => Some(4),
            Compiler::EGCS => Some(4),
            _ => None,
        }
    }

    /// Some assemblers detect the largest symbol alignment in a section and
    /// apply it to the section itself; others hardcode the section alignment
    /// regardless of larger symbol alignments. We need to know which, to
    /// decide whether emitting an alignment directive could push the section
    /// out of alignment in the final ROM.
    pub(crate) const fn symbol_alignment_requires_aligned_section(&self) -> bool {
        matches!(self, Compiler::MWCCPS2 | Compiler::EEGCC)
    }

    const fn prev_align_function(&self) -> Option<u8> {
        match self {
            Compiler::EEGCC => Some(3),
            _ => None,
        }
    }
    const fn prev_align_jumptable(&self) -> Option<u8> {
        match self {
            Compiler::KMC => Some(3),
            Compiler::SN64 => Some(3),
            Compiler::EGCS => Some(3),
            Compiler::PSYQ => Some(3),
            Compiler::MWCCPS2 => Some(4),
            Compiler::EEGCC => Some(3),
            _ => None,
        }
    }
    // TODO: Specifying 3 as the default should be harmless. Need to investigate.
    const fn prev_align_float64(&self) -> Option<u8> {
        match self {
            Compiler::SN64 => Some(3),
            Compiler::PSYQ => Some(3),
            _ => None,
        }
    }
    const fn prev_align_c_string(&self) -> Option<u8> {
        match self {
            Compiler::EEGCC => Some(3),
            _ => Some(2),
        }
    }

    pub(crate) const fn prev_align_for_type(&self, sym_type: SymbolType) -> Option<u8> {
        match sym_type {
            SymbolType::Function => self.prev_align_function(),
            SymbolType::Jumptable => self.prev_align_jumptable(),
            SymbolType::GccExceptTable => None,
            SymbolType::BranchLabel
            | SymbolType::JumptableLabel
            | SymbolType::GccExceptTableLabel => None,
            SymbolType::Byte | SymbolType::Short | SymbolType::Word => None,
            SymbolType::DWord => None,
            SymbolType::Float32 => None,
            SymbolType::Float64 => self.prev_align_float64(),
            SymbolType::CString => self.prev_align_c_string(),
            SymbolType::UserCustom => None,
        }
    }

    const fn post_align_c_string(&self) -> Option<u8> {
        Some(2)
    }

    pub(crate) const fn post_align_for_type(&self, sym_type: SymbolType) -> Option<u8> {
        match sym_type {
            SymbolType::Function => None,
            SymbolType::Jumptable => None,
            SymbolType::GccExceptTable => None,
            SymbolType::BranchLabel
            | SymbolType::JumptableLabel
            | SymbolType::GccExceptTableLabel => None,
            SymbolType::Byte | SymbolType::Short | SymbolType::Word => None,
            SymbolType::DWord => None,
            SymbolType::Float32 => None,
            SymbolType::Float64 => None,
            SymbolType::CString => self.post_align_c_string(),
            SymbolType::UserCustom => None,
        }
    }
}
