// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::mem::size_of;

use serde::{Deserialize, Serialize};
use tidemark_type::{ColumnFlags, Value};

/// One column value of a row image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
	pub name: String,
	/// Wire type tag of the source database
	#[serde(rename = "type")]
	pub r#type: u8,
	pub flag: ColumnFlags,
	pub value: Value,
	/// Approximate bytes consumed by the column, used for flow control.
	#[serde(skip)]
	pub approximate_bytes: usize,
}

impl Column {
	pub fn new(name: impl Into<String>, r#type: u8, flag: ColumnFlags, value: impl Into<Value>) -> Self {
		let name = name.into();
		let value = value.into();
		let approximate_bytes = size_of::<Column>() - size_of::<Value>() + name.len() + value.approximate_bytes();
		Self {
			name,
			r#type,
			flag,
			value,
			approximate_bytes,
		}
	}

	/// Overrides the computed size with the one measured by the adapter.
	pub fn with_approximate_bytes(mut self, approximate_bytes: usize) -> Self {
		self.approximate_bytes = approximate_bytes;
		self
	}

	pub fn value_string(&self) -> String {
		self.value.as_string()
	}
}

/// Name and wire type of a column, as passed to sinks with schema changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnInfo {
	pub name: String,
	#[serde(rename = "type")]
	pub r#type: u8,
}

impl ColumnInfo {
	pub fn new(name: impl Into<String>, r#type: u8) -> Self {
		Self {
			name: name.into(),
			r#type,
		}
	}
}

impl From<&Column> for ColumnInfo {
	fn from(column: &Column) -> Self {
		Self::new(column.name.clone(), column.r#type)
	}
}
