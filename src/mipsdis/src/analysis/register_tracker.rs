/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::{opcodes::Opcode, registers::Gpr, traits::Register, Instruction};

use crate::rom_address::RomAddress;

use super::{JrRegData, LoPairingInfo, TrackedRegisterState};
use super::tracked_register_state::HiInfo;

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegisterTracker {
    registers: [TrackedRegisterState; Gpr::count()],
}

impl RegisterTracker {
    pub(crate) fn new() -> Self {
        Self {
            registers: [TrackedRegisterState::new(); Gpr::count()],
        }
    }
}

impl RegisterTracker {
    pub(crate) fn clear(&mut self) {
        self.registers.iter_mut().for_each(|state| state.clear());
    }

    pub(crate) fn unset_registers_after_func_call(
        &mut self,
        instr: &Instruction,
        prev_instr: &Instruction,
    ) {
        if !prev_instr.is_function_call() {
            return;
        }

        // TODO: consider writing an register iterator or something
        for i in 0..Gpr::count() as u32 {
            let reg: Gpr = i.try_into().expect("This should not panic");

            if reg.is_clobbered_by_func_call(instr.abi()) {
                self.registers[reg.as_index()].clear();
            }
        }
    }

    pub(crate) fn process_branch(&mut self, instr: &Instruction, instr_rom: RomAddress) {
        assert!(instr.get_branch_offset_generic().is_some());

        if let Some(reg) = instr.field_rs() {
            if instr.opcode().reads_rs() {
                self.registers[reg.as_index()].set_branching(instr_rom);
            }
        }
        if let Some(reg) = instr.field_rt() {
            if instr.opcode().reads_rt() {
                self.registers[reg.as_index()].set_branching(instr_rom);
            }
        }
        if let Some(reg) = instr.field_rd() {
            if instr.opcode().reads_rd() {
                self.registers[reg.as_index()].set_branching(instr_rom);
            }
        }
    }

    pub(crate) fn process_hi(
        &mut self,
        instr: &Instruction,
        instr_rom: RomAddress,
        prev_instr: Option<&Instruction>,
    ) {
        assert!(instr.opcode().can_be_hi());

        let reg = instr
            .get_destination_gpr()
            .expect("lui should have dst register");
        let state = &mut self.registers[reg.as_index()];

        state.clear();
        state.set_hi(
            instr
                .get_processed_immediate()
                .expect("lui should have an immediate field") as u32,
            instr_rom,
            prev_instr,
        );
    }

    pub(crate) fn process_gp_load(&mut self, instr: &Instruction, instr_rom: RomAddress) {
        assert!(instr.opcode().can_be_lo());

        let reg = instr
            .get_destination_gpr()
            .expect("should have dst register");
        let state = &mut self.registers[reg.as_index()];

        state.clear();
        state.set_gp_load(
            instr
                .get_processed_immediate()
                .expect("should have immediate field") as u32,
            instr_rom,
        );
    }

    pub(crate) fn process_lo(&mut self, instr: &Instruction, value: u32, instr_rom: RomAddress) {
        if let Some(dst_reg) = instr.get_destination_gpr() {
            let state = &mut self.registers[dst_reg.as_index()];
            state.set_lo(value, instr_rom);
            if instr.opcode().does_dereference() {
                state.set_deref(instr_rom);
            }
            if Some(dst_reg) == instr.field_rs() {
                state.clear_hi();
                state.clear_gp();
            }
            state.clear_branch();
        }
    }

    pub(crate) fn overwrite_registers(&mut self, instr: &Instruction, instr_rom: RomAddress) {
        if self.move_register(instr) {
            return;
        }

        match instr.opcode() {
            Opcode::core_mtc1 | Opcode::core_dmtc1 | Opcode::core_ctc1 => {
                // IDO usually use a reg as a temp when loading a constant value
                // into the float coprocessor, after that IDO never re-uses the value
                // in that reg for anything else
                self.clear_reg(instr.field_rt().expect("This should not panic"), instr_rom);
            }
            _ => {
                if let Some(reg) = instr.get_destination_gpr() {
                    if instr.opcode().can_be_hi() {
                        self.registers[reg.as_index()].clear_lo();
                    } else {
                        self.clear_reg(reg, instr_rom);
                    }
                }
            }
        }
    }

    pub(crate) fn preprocess_lo_and_get_info(
        &mut self,
        instr: &Instruction,
        instr_rom: RomAddress,
    ) -> Option<LoPairingInfo> {
        if let Some(reg) = instr.field_rs() {
            let state = &self.registers[reg.as_index()];

            if let Some(hi_info) = state.hi_info() {
                if !hi_info.set_on_branch_likely {
                    return Some(LoPairingInfo {
                        instr_rom: hi_info.instr_rom,
                        value: state.value() as i64,
                        is_gp_rel: false,
                        is_gp_got: false,
                    });
                }
            } else if reg.is_global_pointer(instr.abi()) {
                return Some(LoPairingInfo {
                    instr_rom: RomAddress::new(0),
                    value: state.value() as i64,
                    is_gp_rel: true,
                    is_gp_got: false,
                });
            } else if let Some(gp_info) = state.gp_info() {
                return Some(LoPairingInfo {
                    instr_rom: gp_info,
                    value: state.value() as i64,
                    is_gp_rel: false,
                    is_gp_got: true,
                });
            }

            if let Some(rt) = instr.field_rt() {
                if instr.opcode().does_dereference() {
                    if state.lo_info().is_some() && state.dereferenced().is_none() {
                        // Simulate a dereference
                        self.registers[rt.as_index()].dereference_from(*state, instr_rom);
                        self.registers[rt.as_index()].clear_branch();
                    }
                }
            }
        }

        None
    }

    pub(crate) fn has_lo_but_not_hi(&self, instr: &Instruction) -> bool {
        instr.field_rs().is_some_and(|reg| {
            let state = self.registers[reg.as_index()];
            state.lo_info().is_some() && state.hi_info().is_none()
        })
    }

    /// Looks up the register used as the target of a `jr`/`jalr` and, if it
    /// was previously set from a dereference (i.e. loaded from a jump
    /// table), returns the rom of that load plus the address it resolved to.
    pub(crate) fn get_jr_reg_data(&self, instr: &Instruction) -> Option<JrRegData> {
        let reg = instr.field_rs()?;
        let state = &self.registers[reg.as_index()];

        let lo_rom = state.lo_rom()?;
        let address = state.value();

        Some(JrRegData::new(lo_rom, address, state.branch_info()))
    }

    /// Returns the address tracked in `$rs` if it is suitable for recording a
    /// symbol access type at the given instruction: the register must hold a
    /// resolved lo value, and either not be dereferenced yet or have been
    /// dereferenced by this very instruction (an `addu` computing the pointer
    /// that this same instruction then uses).
    pub(crate) fn get_address_if_can_set_type(
        &self,
        instr: &Instruction,
        instr_rom: RomAddress,
    ) -> Option<u32> {
        let reg = instr.field_rs()?;
        let state = &self.registers[reg.as_index()];

        state.lo_info()?;

        match state.dereferenced() {
            None => Some(state.value()),
            Some(deref_rom) if deref_rom == instr_rom => Some(state.value()),
            Some(_) => None,
        }
    }

    /// Used when pairing an `ori` against a previous `lui` to build a 32-bit
    /// constant, as opposed to an address (spec's "unsigned lo" path).
    pub(crate) fn get_hi_info_for_constant(&self, instr: &Instruction) -> Option<HiInfo> {
        let reg = instr.field_rs()?;
        self.registers[reg.as_index()].hi_info()
    }

    pub(crate) fn process_constant(
        &mut self,
        instr: &Instruction,
        constant: u32,
        instr_rom: RomAddress,
    ) {
        if let Some(dst_reg) = instr.get_destination_gpr() {
            let state = &mut self.registers[dst_reg.as_index()];
            state.set_lo(constant, instr_rom);
            if Some(dst_reg) == instr.field_rs() {
                state.clear_hi();
            }
            state.clear_branch();
        }
    }
}

impl RegisterTracker {
    /// Recognizes the handful of instruction idioms compilers emit as plain
    /// register copies and propagates the source register's tracked state
    /// into the destination, so a `%hi`/`%lo` pairing survives being moved
    /// into another register before it gets dereferenced.
    ///
    /// Handles `move $rd, $rs` (decoded as `or $rd, $rs, $zero` or
    /// `addu $rd, $rs, $zero`), the no-op `addiu $rd, $rs, 0`, and the
    /// `addu $rd, $rd, $rs` array-indexing idiom (adding an index register
    /// to an already-tracked base keeps the base's pairing alive).
    fn move_register(&mut self, instr: &Instruction) -> bool {
        let dst = match instr.get_destination_gpr() {
            Some(reg) => reg,
            None => return false,
        };

        if instr.opcode() == Opcode::core_addu {
            let rs = instr.field_rs();
            let rt = instr.field_rt();
            if let (Some(rs), Some(rt)) = (rs, rt) {
                let dst_is_rs = rs.as_index() == dst.as_index();
                let dst_is_rt = rt.as_index() == dst.as_index();
                let other = if dst_is_rs && !dst_is_rt {
                    Some(rt)
                } else if dst_is_rt && !dst_is_rs {
                    Some(rs)
                } else {
                    None
                };
                if let Some(other) = other {
                    if !other.is_zero(instr.abi()) && other.as_index() != dst.as_index() {
                        // `$rd` already holds a tracked base (e.g. a jumptable);
                        // adding an index register keeps that base alive instead
                        // of clearing it like an ordinary overwrite would.
                        return true;
                    }
                }
            }
        }

        let src = match instr.opcode() {
            Opcode::core_or | Opcode::core_addu => {
                let rs = instr.field_rs();
                let rt = instr.field_rt();
                match (rs, rt) {
                    (Some(rs), Some(rt)) if rt.is_zero(instr.abi()) => Some(rs),
                    (Some(rs), Some(rt)) if rs.is_zero(instr.abi()) => Some(rt),
                    _ => None,
                }
            }
            Opcode::core_addiu
                if instr.get_processed_immediate() == Some(0) =>
            {
                instr.field_rs()
            }
            _ => None,
        };

        let src = match src {
            Some(reg) => reg,
            None => return false,
        };

        if src.as_index() == dst.as_index() {
            return false;
        }

        self.registers[dst.as_index()] = self.registers[src.as_index()];
        true
    }

    fn clear_reg(&mut self, reg: Gpr, instr_rom: RomAddress) {
        let state = &mut self.registers[reg.as_index()];

        state.clear_hi();
        if !state.was_set_in_current_instr(instr_rom) {
            state.clear_gp();
            state.clear_lo();
        }
        state.clear_branch();
    }
}
