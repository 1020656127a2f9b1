/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::{btree_map::BTreeMap, btree_set::BTreeSet};
use rabbitizer::{
    access_type::AccessType, opcodes::Opcode, registers::Gpr, traits::Register, vram::VramOffset,
    Instruction, Vram,
};

use crate::{
    config::GotEntry, context::Context, rom_address::RomAddress, rom_vram_range::RomVramRange,
};

use super::RegisterTracker;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct InstructionAnalysisResult {
    ranges: RomVramRange,

    /// Every referenced vram found.
    referenced_vrams: BTreeSet<Vram>,
    /// Key is the rom of the instruction referencing that address, value is the referenced address.
    referenced_vrams_by_rom: BTreeMap<RomAddress, Vram>,

    /// Key is the rom of the branch instruction, value is the vram target for that instruction.
    branch_targets: BTreeMap<RomAddress, Vram>,

    /// Key is the rom of the instruction, value is the address of the called function.
    func_calls: BTreeMap<RomAddress, Vram>,

    referenced_jumptables: BTreeMap<RomAddress, Vram>,

    hi_instrs: BTreeMap<RomAddress, (Gpr, u16)>,
    non_lo_instrs: BTreeSet<RomAddress>,

    constant_per_instr: BTreeMap<RomAddress, u32>,

    // TODO: merge these 3 thingies
    address_per_instr: BTreeMap<RomAddress, Vram>,
    address_per_hi_instr: BTreeMap<RomAddress, Vram>,
    address_per_lo_instr: BTreeMap<RomAddress, Vram>,

    /// First-write-wins memoized dereference access type per address, fed by
    /// every instruction that loads/stores through a resolved pointer. Used
    /// to populate a symbol's access-type histogram once it is created.
    possible_symbol_types: BTreeMap<Vram, (AccessType, bool)>,

    /// Key is the rom of the instruction resolving a `%got`/`%call16` access,
    /// value is the GOT slot it landed on plus what that slot resolves to.
    got_accesses: BTreeMap<RomAddress, (usize, GotEntry)>,

    /// `lui $gp, ...` / `addu $gp, $gp, $t9` pairs belonging to a `_gp_disp`
    /// cpload sequence, keyed by the rom of the `lui` half.
    unpaired_cploads: BTreeMap<RomAddress, RomAddress>,
}

impl InstructionAnalysisResult {
    #[must_use]
    pub(crate) fn new(ranges: RomVramRange) -> Self {
        Self {
            ranges,
            referenced_vrams: BTreeSet::new(),
            referenced_vrams_by_rom: BTreeMap::new(),
            branch_targets: BTreeMap::new(),
            func_calls: BTreeMap::new(),
            hi_instrs: BTreeMap::new(),
            non_lo_instrs: BTreeSet::new(),
            constant_per_instr: BTreeMap::new(),
            address_per_instr: BTreeMap::new(),
            address_per_hi_instr: BTreeMap::new(),
            address_per_lo_instr: BTreeMap::new(),
            referenced_jumptables: BTreeMap::new(),
            possible_symbol_types: BTreeMap::new(),
            got_accesses: BTreeMap::new(),
            unpaired_cploads: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn ranges(&self) -> &RomVramRange {
        &self.ranges
    }

    #[must_use]
    pub fn referenced_vrams(&self) -> &BTreeSet<Vram> {
        &self.referenced_vrams
    }

    #[must_use]
    pub fn branch_targets(&self) -> &BTreeMap<RomAddress, Vram> {
        &self.branch_targets
    }

    #[must_use]
    pub fn func_calls(&self) -> &BTreeMap<RomAddress, Vram> {
        &self.func_calls
    }

    #[must_use]
    pub fn hi_instrs(&self) -> &BTreeMap<RomAddress, (Gpr, u16)> {
        &self.hi_instrs
    }

    #[must_use]
    pub fn constant_per_instr(&self) -> &BTreeMap<RomAddress, u32> {
        &self.constant_per_instr
    }

    #[must_use]
    pub fn address_per_instr(&self) -> &BTreeMap<RomAddress, Vram> {
        &self.address_per_instr
    }

    #[must_use]
    pub fn address_per_hi_instr(&self) -> &BTreeMap<RomAddress, Vram> {
        &self.address_per_hi_instr
    }
    #[must_use]
    pub fn address_per_lo_instr(&self) -> &BTreeMap<RomAddress, Vram> {
        &self.address_per_lo_instr
    }

    #[must_use]
    pub fn referenced_jumptables(&self) -> &BTreeMap<RomAddress, Vram> {
        &self.referenced_jumptables
    }

    #[must_use]
    pub fn possible_symbol_types(&self) -> &BTreeMap<Vram, (AccessType, bool)> {
        &self.possible_symbol_types
    }

    #[must_use]
    pub fn got_accesses(&self) -> &BTreeMap<RomAddress, (usize, GotEntry)> {
        &self.got_accesses
    }

    #[must_use]
    pub fn unpaired_cploads(&self) -> &BTreeMap<RomAddress, RomAddress> {
        &self.unpaired_cploads
    }
}

impl InstructionAnalysisResult {
    pub(crate) fn process_prev_func_call(
        &mut self,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        prev_instr: &Instruction,
    ) {
        regs_tracker.unset_registers_after_func_call(instr, prev_instr);
    }

    pub(crate) fn process_instr(
        &mut self,
        context: &Context,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        prev_instr: Option<&Instruction>,
    ) {
        if let Some(target_vram) = instr.get_branch_vram_generic() {
            // instr.opcode().is_branch() or instr.is_unconditional_branch()
            self.process_branch(context, regs_tracker, instr, target_vram);
        } else if let Some(target_vram) = instr.get_instr_index_as_vram() {
            // instr.opcode().is_jump_with_address()
            self.process_func_call(context, instr, target_vram);
        } else if instr.is_jumptable_jump() {
            self.process_jumptable_jump(context, regs_tracker, instr);
        } else if instr.opcode().is_jump() && instr.opcode().does_link() {
            // `jalr`. Implicit `!is_jump_with_address`
            self.process_jump_and_link_register(context, regs_tracker, instr);
        } else if instr.opcode().can_be_hi() {
            self.process_hi(regs_tracker, instr, prev_instr);
        } else if instr.opcode().is_unsigned() {
            self.process_unsigned_lo(regs_tracker, instr);
        } else if instr.opcode().can_be_lo() {
            self.process_signed_lo(context, regs_tracker, instr, prev_instr);
        } else if instr.opcode() == Opcode::core_addu {
            let instr_rom = self.rom_from_instr(instr);
            self.process_symbol_dereference_type(regs_tracker, instr, instr_rom);
        }

        regs_tracker.overwrite_registers(instr, self.rom_from_instr(instr));
    }
}

impl InstructionAnalysisResult {
    fn process_branch(
        &mut self,
        context: &Context,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        target_vram: Vram,
    ) {
        if !self.ranges.in_vram_range(target_vram) {
            return;
        }
        if context.global_config().ignore_branches() {
            return;
        }

        regs_tracker.process_branch(instr, self.rom_from_instr(instr));

        /*
        if instrOffset in self.branchInstrOffsets:
            # Already processed
            return
        */

        let instr_rom = self.rom_from_instr(instr);
        self.add_referenced_vram(context, instr_rom, target_vram);
        self.branch_targets.insert(instr_rom, target_vram);
    }

    fn process_func_call(&mut self, context: &Context, instr: &Instruction, target_vram: Vram) {
        /*
        if instrOffset in self.funcCallInstrOffsets:
            # Already processed
            return
        */

        /*
        if not self.context.isAddressInGlobalRange(target):
            self.funcCallOutsideRangesOffsets[instrOffset] = target
        */

        let instr_rom = self.rom_from_instr(instr);
        self.add_referenced_vram(context, instr_rom, target_vram);
        self.func_calls.insert(instr_rom, target_vram);
    }

    fn process_jumptable_jump(
        &mut self,
        context: &Context,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
    ) {
        if let Some(jr_reg_data) = regs_tracker.get_jr_reg_data(instr) {
            let instr_rom = self.rom_from_instr(instr);
            let lo_rom = jr_reg_data.lo_rom();
            let address = Vram::new(jr_reg_data.address());

            if jr_reg_data.branch_info().is_some() {
                // Jumptables never check the register they are branching into,
                // since the references should always be valid.
                // This kind of check usually is performed on tail call
                // optimizations when a function pointer is involved.
                // For example:
                // ```mips
                // lw          $t0, ...
                // beqz        $t0, .LXXXXXXXX
                //  nop
                // jr          $t0
                //  nop
                // ```
            } else {
                self.referenced_jumptables.insert(lo_rom, address);
            }

            self.add_referenced_vram(context, instr_rom, address);
        }
    }

    fn process_jump_and_link_register(
        &mut self,
        context: &Context,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
    ) {
        if let Some(jr_reg_data) = regs_tracker.get_jr_reg_data(instr) {
            let instr_rom = self.rom_from_instr(instr);
            let address = Vram::new(jr_reg_data.address());

            self.func_calls.insert(instr_rom, address);
            self.add_referenced_vram(context, instr_rom, address);
        }
    }

    fn process_hi(
        &mut self,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        prev_instr: Option<&Instruction>,
    ) {
        let instr_rom = self.rom_from_instr(instr);
        regs_tracker.process_hi(instr, instr_rom, prev_instr);
        self.hi_instrs.insert(
            instr_rom,
            (
                instr.get_destination_gpr().unwrap(),
                instr.get_processed_immediate().unwrap() as u16,
            ),
        );
    }

    fn process_unsigned_lo(&mut self, regs_tracker: &mut RegisterTracker, instr: &Instruction) {
        // Pairing with an `ori`, so we treat this as a constant.
        if let Some(hi_info) = regs_tracker.get_hi_info_for_constant(instr) {
            if let Some((_hi_reg, hi_imm)) = self.hi_instrs.get(&hi_info.instr_rom) {
                let instr_rom = self.rom_from_instr(instr);
                self.process_constant(regs_tracker, instr, instr_rom, *hi_imm, hi_info.instr_rom)
            }
        }
    }

    fn process_constant(&mut self, regs_tracker: &mut RegisterTracker, instr: &Instruction, instr_rom: RomAddress, hi_imm: u16, hi_rom: RomAddress) {
        let upper = hi_imm as u32;
        let lower = instr.get_processed_immediate().unwrap() as u32; // TODO: avoid unwrap
        let constant = (upper << 16) | lower;

        self.constant_per_instr.insert(hi_rom, constant);
        self.constant_per_instr.insert(instr_rom, constant);

        regs_tracker.process_constant(instr, constant, instr_rom);
    }

    fn process_signed_lo(
        &mut self,
        context: &Context,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        _prev_instr: Option<&Instruction>,
    ) {
        let instr_rom = self.rom_from_instr(instr);

        // TODO
        if instr.opcode().does_load()
            && instr
                .get_destination_gpr()
                .is_some_and(|reg| reg.is_global_pointer(instr.abi()))
        {
            regs_tracker.process_gp_load(instr, instr_rom);
        }

        /*
        if instrOffset in self.nonLoInstrOffsets:
            return
        */

        let pairing_info = regs_tracker.preprocess_lo_and_get_info(instr, instr_rom);
        if pairing_info.is_none() {
            if regs_tracker.has_lo_but_not_hi(instr) {
                self.non_lo_instrs.insert(instr_rom);
            }
            return;
        }
        let pairing_info = pairing_info.unwrap();

        if pairing_info.is_gp_got && !context.global_config().gp_config().is_some_and(|x| x.pic()) {
            return;
        }

        let upper_info = if pairing_info.is_gp_rel {
            None
        } else {
            Some((pairing_info.value, pairing_info.instr_rom))
        };

        if let Some((_upper_half, hi_rom)) = upper_info {
            if let Some((hi_reg, _hi_imm)) = self.hi_instrs.get(&hi_rom) {
                if hi_reg.is_global_pointer(instr.abi()) {
                    if let Some(lo_rs) = instr.field_rs() {
                        if instr.opcode().reads_rs() && lo_rs.is_global_pointer(instr.abi()) {
                            if let Some(lo_rt) = instr.field_rt() {
                                if instr.opcode().modifies_rt()
                                    && lo_rt.is_global_pointer(instr.abi())
                                {
                                    // `lui $gp, %hi(_gp_disp); addiu $gp, %lo(_gp_disp); addu
                                    // $gp, $gp, $t9`: the two halves of this `%hi`/%lo` pair
                                    // set up `$gp` rather than addressing a symbol, so record
                                    // them as a cpload pairing instead.
                                    self.unpaired_cploads.insert(hi_rom, instr_rom);
                                    // Early return to avoid counting this pairing as a normal symbol
                                    return;
                                }
                            }
                        }
                    }
                }
            }
        }

        let address = self.pair_hi_lo(context, upper_info.as_ref(), instr, instr_rom);
        if address.is_none() {
            return;
        }
        let address = address.unwrap();
        if upper_info.is_none() && context.global_config().gp_config().is_some_and(|x| x.pic()) {
            self.process_got_symbol(context, address, instr_rom);
            return;
        }

        if self.process_address(context, address, upper_info.as_ref(), instr, instr_rom) {
            // TODO: move out from this check
            regs_tracker.process_lo(instr, address.inner(), instr_rom);
        }
    }

    fn process_symbol_dereference_type(
        &mut self,
        regs_tracker: &mut RegisterTracker,
        instr: &Instruction,
        instr_rom: RomAddress,
    ) {
        if let Some(address) = regs_tracker.get_address_if_can_set_type(instr, instr_rom) {
            self.process_symbol_type(Vram::new(address), instr, instr_rom);
        }
    }
}

impl InstructionAnalysisResult {
    fn pair_hi_lo(
        &mut self,
        context: &Context,
        upper_info: Option<&(i64, RomAddress)>,
        instr: &Instruction,
        _instr_rom: RomAddress,
    ) -> Option<Vram> {
        // upper_info being None means this symbol is a $gp access

        let lower_half = if let Some(x) = instr.get_processed_immediate() {
            VramOffset::new(x)
        } else {
            return None;
        };

        // TODO: reject a %lo already paired to a different %hi value, honoring
        // `Compiler::pair_multiple_hi_to_same_low` (IDO never re-pairs a %lo
        // that was already resolved, later compilers sometimes do).

        if let Some((upper_half, _hi_rom)) = upper_info {
            if *upper_half < 0
                || (lower_half.is_negative()
                    && lower_half.inner().unsigned_abs() > *upper_half as u32)
            {
                None
            } else {
                Some(Vram::new(*upper_half as u32) + lower_half)
            }
        } else if let Some(gp_value) = context.global_config().gp_config().map(|x| x.gp_value()) {
            // TODO: implement comparison for Vram and VramOffset
            if lower_half.is_negative() && lower_half.inner().unsigned_abs() > gp_value.inner() {
                None
            } else {
                Some(gp_value + lower_half)
            }
        } else {
            None
        }
    }

    /// `address` is the GOT slot vram (`$gp` + offset, already resolved by
    /// `pair_hi_lo`'s gp-rel branch). Looks the slot up in the configured GOT
    /// and, if it resolves, records which final address this access reaches
    /// and whether that slot is a local or global entry.
    fn process_got_symbol(&mut self, context: &Context, address: Vram, instr_rom: RomAddress) {
        let Some(got) = context.global_config().got() else {
            return;
        };
        let Some((index, entry)) = got.resolve(address) else {
            return;
        };

        self.got_accesses.insert(instr_rom, (index, entry));

        let resolved = match entry {
            GotEntry::Local(vram) | GotEntry::Global(vram) => vram,
        };
        self.add_referenced_vram_unconditional(instr_rom, resolved);
        if self
            .address_per_lo_instr
            .insert(instr_rom, resolved)
            .is_none()
        {
            self.address_per_instr.insert(instr_rom, resolved);
        }
    }

    fn process_address(
        &mut self,
        context: &Context,
        address: Vram,
        upper_info: Option<&(i64, RomAddress)>,
        instr: &Instruction,
        instr_rom: RomAddress,
    ) -> bool {
        let config = context.global_config();
        let filtered_out = config.ignore_word_list().contains(&address)
            || (config.symbol_finder_filter_low_addresses() && address.inner() < 0x8000_0000)
            || (config.symbol_finder_filter_high_addresses() && address.inner() >= 0xC000_0000);
        if filtered_out {
            if config.symbol_finder_filtered_addresses_as_constants() {
                self.constant_per_instr.insert(instr_rom, address.inner());
                if let Some((_upper_half, hi_rom)) = upper_info {
                    self.constant_per_instr.insert(*hi_rom, address.inner());
                }
            } else if config.symbol_finder_filtered_addresses_as_hilo() {
                self.non_lo_instrs.insert(instr_rom);
            }
            return false;
        }

        self.add_referenced_vram(context, instr_rom, address);

        if self
            .address_per_lo_instr
            .insert(instr_rom, address)
            .is_none()
        {
            self.address_per_instr.insert(instr_rom, address);
        }
        if let Some((_upper_half, hi_rom)) = upper_info {
            if self.address_per_hi_instr.insert(*hi_rom, address).is_none() {
                self.address_per_instr.insert(*hi_rom, address);
                self.add_referenced_vram(context, *hi_rom, address);
            }
        }

        self.process_symbol_type(address, instr, instr_rom);

        true
    }

    /// Memoizes the dereference access type this instruction performs on
    /// `address`, first write wins (mirroring how a `%hi`/`%lo` pairing may
    /// be dereferenced by more than one instruction but only the first
    /// access shape is kept).
    fn process_symbol_type(&mut self, address: Vram, instr: &Instruction, _instr_rom: RomAddress) {
        let Some(access_type) = instr.opcode().access_type() else {
            return;
        };
        self.possible_symbol_types
            .entry(address)
            .or_insert((access_type, instr.opcode().is_unsigned()));
    }
}

impl InstructionAnalysisResult {
    fn rom_from_instr(&self, instr: &Instruction) -> RomAddress {
        self.ranges
            .rom_from_vram(instr.vram())
            .expect("This should not panic")
    }

    fn add_referenced_vram(
        &mut self,
        context: &Context,
        instr_rom: RomAddress,
        referenced_vram: Vram,
    ) {
        if !context.global_config().gp_config().is_some_and(|x| x.pic()) {
            self.add_referenced_vram_unconditional(instr_rom, referenced_vram);
        }
    }

    /// Same as [`Self::add_referenced_vram`] but without the PIC guard, for
    /// the GOT path: a GOT slot address is meaningless as a reference, but
    /// the address it resolves to is, even in PIC binaries.
    fn add_referenced_vram_unconditional(&mut self, instr_rom: RomAddress, referenced_vram: Vram) {
        self.referenced_vrams.insert(referenced_vram);
        self.referenced_vrams_by_rom
            .insert(instr_rom, referenced_vram);
    }
}
