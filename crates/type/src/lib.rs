// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod flag;
pub mod value;

pub use flag::ColumnFlags;
pub use value::Value;
