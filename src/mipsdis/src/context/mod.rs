/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod context;
mod context_builder;

pub use context::{Context, OwnedSegmentNotFoundError};
pub use context_builder::{
    ContextBuilder, ContextBuilderFinderHeater, ContextBuilderFinderHeaterOverlays,
    ContextBuilderOverlay, OverlaysBuilder, SegmentModifier,
};
