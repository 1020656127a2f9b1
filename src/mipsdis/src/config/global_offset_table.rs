/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::vec::Vec;
use rabbitizer::Vram;

/// The resolved value of a single slot of the `.got` section: either a
/// pointer the linker already filled in for a symbol local to this binary
/// (`Local`), or a slot that the dynamic linker (or, for a static N64 binary,
/// this tool's caller) fills in for an externally-defined symbol (`Global`).
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum GotEntry {
    Local(Vram),
    Global(Vram),
}

/// A PIC binary's Global Offset Table: the local entries come first,
/// followed by the global ones, matching the MIPS ABI layout.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlobalOffsetTable {
    vram: Vram,
    entries: Vec<GotEntry>,
}

impl GlobalOffsetTable {
    #[must_use]
    pub fn new(vram: Vram, local_entries: Vec<Vram>, global_entries: Vec<Vram>) -> Self {
        let entries = local_entries
            .into_iter()
            .map(GotEntry::Local)
            .chain(global_entries.into_iter().map(GotEntry::Global))
            .collect();

        Self { vram, entries }
    }

    #[must_use]
    pub fn vram(&self) -> Vram {
        self.vram
    }

    #[must_use]
    pub fn entries(&self) -> &[GotEntry] {
        &self.entries
    }

    /// Resolves a `%got`-relative access (`$gp` + offset) to the GOT slot it
    /// lands on, returning the slot's index and the address it resolves to.
    #[must_use]
    pub(crate) fn resolve(&self, accessed_vram: Vram) -> Option<(usize, GotEntry)> {
        let diff = accessed_vram.inner().checked_sub(self.vram.inner())?;
        if diff % 4 != 0 {
            return None;
        }

        let index = (diff / 4) as usize;
        self.entries.get(index).map(|entry| (index, *entry))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn resolves_local_then_global_entries_in_order() {
        let got = GlobalOffsetTable::new(
            Vram::new(0x80800000),
            vec![Vram::new(0x80100000), Vram::new(0x80100010)],
            vec![Vram::new(0x80200000)],
        );

        assert_eq!(
            got.resolve(Vram::new(0x80800000)),
            Some((0, GotEntry::Local(Vram::new(0x80100000))))
        );
        assert_eq!(
            got.resolve(Vram::new(0x80800004)),
            Some((1, GotEntry::Local(Vram::new(0x80100010))))
        );
        assert_eq!(
            got.resolve(Vram::new(0x80800008)),
            Some((2, GotEntry::Global(Vram::new(0x80200000))))
        );
    }

    #[test]
    fn rejects_unaligned_and_out_of_range_accesses() {
        let got = GlobalOffsetTable::new(Vram::new(0x80800000), vec![Vram::new(0x80100000)], vec![]);

        // Before the table's base vram.
        assert_eq!(got.resolve(Vram::new(0x807FFFFC)), None);
        // Not word-aligned relative to the base.
        assert_eq!(got.resolve(Vram::new(0x80800001)), None);
        // Past the last entry.
        assert_eq!(got.resolve(Vram::new(0x80800004)), None);
    }
}
