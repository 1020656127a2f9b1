/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod section_base;
mod section_data;
mod section_noload;
mod section_text;
mod trait_section;

pub use section_base::SectionBase;
pub use section_data::{SectionData, SectionDataSettings};
pub use section_noload::{SectionNoload, SectionNoloadSettings};
pub use section_text::{SectionText, SectionTextSettings};
pub use trait_section::{RomSection, Section};
