// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

// This file includes and modifies code from the skipdb project (https://github.com/al8n/skipdb),
// originally licensed under the Apache License, Version 2.0.
// Original copyright:
//   Copyright (c) 2024 Al Liu
//
// The original Apache License can be found at:
//   http://www.apache.org/licenses/LICENSE-2.0

mod error;
mod process;
#[allow(clippy::module_inception)]
mod watermark;

pub use error::WaterMarkError;
pub use watermark::WaterMark;

/// Capacity of the mark channel between callers and the processing thread.
const MARK_CHANNEL_CAPACITY: usize = 1024;

/// Parked index count above which abandoned waiters are swept from every index.
const MAX_WAITERS: usize = 1024;
