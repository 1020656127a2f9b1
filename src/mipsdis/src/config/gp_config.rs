/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::Vram;

/// `$gp`-relative addressing settings for a segment (spec's PIC/SDATA
/// toggle): either a plain `-G`-style small-data pointer, or a full
/// position-independent-code GOT base.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GpConfig {
    gp_value: Vram,
    pic: bool,
}

impl GpConfig {
    #[must_use]
    pub fn new_sdata(gp_value: Vram) -> Self {
        Self {
            gp_value,
            pic: false,
        }
    }
    #[must_use]
    pub fn new_pic(gp_value: Vram) -> Self {
        Self {
            gp_value,
            pic: true,
        }
    }

    #[must_use]
    pub(crate) fn gp_value(&self) -> Vram {
        self.gp_value
    }

    #[must_use]
    pub(crate) const fn pic(&self) -> bool {
        self.pic
    }
}
