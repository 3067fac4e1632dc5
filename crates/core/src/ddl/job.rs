// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Schema descriptions supplied by the schema collaborator.

use tidemark_type::ColumnFlags;

use crate::{ddl::ActionType, table::TableName};

/// Column of a table description.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaColumn {
	pub id: i64,
	pub name: String,
	pub r#type: u8,
	pub flag: ColumnFlags,
}

impl SchemaColumn {
	pub fn new(id: i64, name: impl Into<String>, r#type: u8) -> Self {
		Self {
			id,
			name: name.into(),
			r#type,
			flag: ColumnFlags::empty(),
		}
	}

	pub fn with_flag(mut self, flag: ColumnFlags) -> Self {
		self.flag = flag;
		self
	}
}

/// Table description attached to a finished schema-change job.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTable {
	pub id: i64,
	pub name: String,
	pub columns: Vec<SchemaColumn>,
}

/// A finished schema-change job.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaJob {
	pub schema_name: String,
	pub table_id: i64,
	pub start_ts: u64,
	pub finished_ts: u64,
	pub query: String,
	pub action_type: ActionType,
	/// Resulting table description, if the job produced one.
	pub table: Option<SchemaTable>,
}

/// The previously cached description of a table, before the job applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
	pub table_name: TableName,
	pub columns: Vec<SchemaColumn>,
}

impl TableInfo {
	pub fn new(table_name: TableName, columns: Vec<SchemaColumn>) -> Self {
		Self {
			table_name,
			columns,
		}
	}

	pub fn id(&self) -> i64 {
		self.table_name.table_id()
	}
}
