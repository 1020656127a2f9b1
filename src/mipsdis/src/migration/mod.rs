/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod func_rodata_migration;
mod rodata_iterator;

pub use func_rodata_migration::FuncRodataPairing;
pub use rodata_iterator::RodataIterator;
