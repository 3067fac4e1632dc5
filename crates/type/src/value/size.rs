// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::mem::size_of;

use super::Value;

impl Value {
	/// Approximate in-memory footprint of the value, inline part plus heap payload.
	pub fn approximate_bytes(&self) -> usize {
		let heap = match self {
			Value::Utf8(v) => v.len(),
			Value::Bytes(v) => v.len(),
			_ => 0,
		};
		size_of::<Value>() + heap
	}
}
