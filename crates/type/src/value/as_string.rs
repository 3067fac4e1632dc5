// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Value;

impl Value {
	/// Renders the value the way sinks expect it in generated statements
	/// and message payloads. Booleans become `1`/`0`, floats use the
	/// shortest representation that round-trips, bytes are reinterpreted
	/// as UTF-8.
	pub fn as_string(&self) -> String {
		match self {
			Value::Null => "null".to_string(),
			Value::Boolean(true) => "1".to_string(),
			Value::Boolean(false) => "0".to_string(),
			Value::Int1(v) => v.to_string(),
			Value::Int2(v) => v.to_string(),
			Value::Int4(v) => v.to_string(),
			Value::Int8(v) => v.to_string(),
			Value::Uint1(v) => v.to_string(),
			Value::Uint2(v) => v.to_string(),
			Value::Uint4(v) => v.to_string(),
			Value::Uint8(v) => v.to_string(),
			Value::Float4(v) => v.to_string(),
			Value::Float8(v) => v.to_string(),
			Value::Utf8(v) => v.clone(),
			Value::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
		}
	}
}
