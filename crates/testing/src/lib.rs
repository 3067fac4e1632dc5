// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared fixtures for tidemark tests.

pub mod fixture;
mod log;
pub mod util;

pub use fixture::*;
pub use log::init_tracing;
