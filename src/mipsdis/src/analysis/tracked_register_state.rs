/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::Instruction;

use crate::rom_address::RomAddress;

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct HiInfo {
    pub(crate) instr_rom: RomAddress,
    pub(crate) set_on_branch_likely: bool,
}

/// Per-register abstract state tracked by `RegisterTracker`.
///
/// A register can hold at most one "hi half" (set by a `lui`) and one "lo
/// half" (set by whatever instruction ends up pairing with that `lui`, or by
/// a `$gp`-relative load). Both halves are cleared independently so a `lui`
/// that never finds a pairing instruction simply falls out of the state on
/// the next overwrite.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrackedRegisterState {
    has_hi: bool,
    hi_immediate: u32,
    hi_instr_rom: RomAddress,
    hi_set_on_branch_likely: bool,

    has_gp: bool,
    gp_instr_rom: RomAddress,

    has_lo: bool,
    lo_instr_rom: RomAddress,
    dereference_offset: Option<RomAddress>,

    /// Set while this register is read by a branch's condition and not yet
    /// overwritten. Used to detect the `beqz $t0, ...; jr $t0` tail-call idiom.
    branching: Option<RomAddress>,

    value: u32,
}

impl TrackedRegisterState {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            has_hi: false,
            hi_immediate: 0,
            hi_instr_rom: RomAddress::new(0),
            hi_set_on_branch_likely: false,

            has_gp: false,
            gp_instr_rom: RomAddress::new(0),

            has_lo: false,
            lo_instr_rom: RomAddress::new(0),
            dereference_offset: None,

            branching: None,

            value: 0,
        }
    }
}

impl TrackedRegisterState {
    pub fn clear(&mut self) {
        self.clear_hi();
        self.clear_gp();
        self.clear_lo();
        self.clear_branch();
    }

    pub(crate) fn clear_hi(&mut self) {
        self.has_hi = false;
        self.hi_immediate = 0;
        self.hi_set_on_branch_likely = false;
    }

    pub(crate) fn clear_gp(&mut self) {
        self.has_gp = false;
    }

    pub(crate) fn clear_lo(&mut self) {
        self.has_lo = false;
        self.dereference_offset = None;
        self.value = 0;
    }

    pub(crate) fn clear_branch(&mut self) {
        self.branching = None;
    }

    /// Records this register as holding the upper half of a `%hi`/`%lo` pair.
    /// `prev_instr` is inspected to determine whether the `lui` itself sits
    /// right after an (unlikely-to-be-taken) branch-likely, in which case the
    /// pairing is considered unreliable.
    pub(crate) fn set_hi(
        &mut self,
        hi_immediate: u32,
        instr_rom: RomAddress,
        prev_instr: Option<&Instruction>,
    ) {
        self.has_hi = true;
        self.hi_immediate = hi_immediate;
        self.hi_instr_rom = instr_rom;
        self.hi_set_on_branch_likely =
            prev_instr.is_some_and(|p| p.opcode().is_branch_likely());
        self.value = hi_immediate << 16;
    }

    pub(crate) fn hi_info(&self) -> Option<HiInfo> {
        self.has_hi.then_some(HiInfo {
            instr_rom: self.hi_instr_rom,
            set_on_branch_likely: self.hi_set_on_branch_likely,
        })
    }

    pub(crate) fn set_gp_load(&mut self, value: u32, instr_rom: RomAddress) {
        self.has_gp = true;
        self.gp_instr_rom = instr_rom;
        self.value = value;
    }

    pub(crate) fn gp_info(&self) -> Option<RomAddress> {
        self.has_gp.then_some(self.gp_instr_rom)
    }

    pub(crate) fn set_lo(&mut self, value: u32, instr_rom: RomAddress) {
        self.has_lo = true;
        self.lo_instr_rom = instr_rom;
        self.value = value;
    }

    pub(crate) fn lo_info(&self) -> Option<u32> {
        self.has_lo.then_some(self.value)
    }

    pub(crate) fn lo_rom(&self) -> Option<RomAddress> {
        self.has_lo.then_some(self.lo_instr_rom)
    }

    pub(crate) fn set_deref(&mut self, instr_rom: RomAddress) {
        self.dereference_offset = Some(instr_rom);
    }

    pub(crate) fn dereferenced(&self) -> Option<RomAddress> {
        self.dereference_offset
    }

    pub(crate) fn value(&self) -> u32 {
        self.value
    }

    pub(crate) fn set_branching(&mut self, instr_rom: RomAddress) {
        self.branching = Some(instr_rom);
    }

    pub(crate) fn branch_info(&self) -> Option<RomAddress> {
        self.branching
    }

    /// True if this register's lo/gp half was set by the instruction at
    /// `instr_rom` itself, as opposed to some earlier instruction. Used by
    /// `overwrite_registers` to avoid clobbering a value the instruction
    /// currently being processed just produced.
    pub(crate) fn was_set_in_current_instr(&self, instr_rom: RomAddress) -> bool {
        (self.has_lo && self.lo_instr_rom == instr_rom)
            || (self.has_gp && self.gp_instr_rom == instr_rom)
    }

    /// Copies `other`'s resolved value into `self`, marking it as having been
    /// dereferenced by the instruction at `instr_rom`. Used to propagate a
    /// `%lo` pointer value into the register that dereferences it, e.g.
    /// `lw $t1, 0($t0)` where `$t0` already holds a paired address.
    pub(crate) fn dereference_from(&mut self, other: Self, instr_rom: RomAddress) {
        self.has_lo = true;
        self.lo_instr_rom = other.lo_instr_rom;
        self.value = other.value;
        self.dereference_offset = Some(instr_rom);
    }
}
