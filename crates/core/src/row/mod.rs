// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod event;
mod raw;

pub use event::{RowChangedEvent, RowKind};
pub use raw::RawRowChange;
