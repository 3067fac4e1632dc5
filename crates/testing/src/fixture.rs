// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tidemark_core::{Column, RawRowChange, RowChangedEvent, TableName};
use tidemark_type::{ColumnFlags, Value};

/// MySQL wire type codes used by the fixtures.
pub mod wire_type {
	pub const TINY: u8 = 1;
	pub const LONGLONG: u8 = 8;
	pub const DOUBLE: u8 = 5;
	pub const VARCHAR: u8 = 15;
	pub const BLOB: u8 = 252;
	pub const NULL: u8 = 6;
}

pub fn table(schema: &str, name: &str, table_id: i64) -> Arc<TableName> {
	Arc::new(TableName::new(schema, name, table_id))
}

fn wire_type_of(value: &Value) -> u8 {
	match value {
		Value::Null => wire_type::NULL,
		Value::Boolean(_) | Value::Int1(_) | Value::Uint1(_) => wire_type::TINY,
		Value::Float4(_) | Value::Float8(_) => wire_type::DOUBLE,
		Value::Utf8(_) => wire_type::VARCHAR,
		Value::Bytes(_) => wire_type::BLOB,
		_ => wire_type::LONGLONG,
	}
}

/// A plain nullable column.
pub fn column(name: &str, value: impl Into<Value>) -> Column {
	let value = value.into();
	Column::new(name, wire_type_of(&value), ColumnFlags::NULLABLE, value)
}

/// A primary key column that was also elected as handle key.
pub fn pk_column(name: &str, value: impl Into<Value>) -> Column {
	let value = value.into();
	Column::new(name, wire_type_of(&value), ColumnFlags::PRIMARY_KEY | ColumnFlags::HANDLE_KEY, value)
}

/// A handle key column of a table without primary key, e.g. a unique not-null key.
pub fn handle_column(name: &str, value: impl Into<Value>) -> Column {
	let value = value.into();
	Column::new(name, wire_type_of(&value), ColumnFlags::UNIQUE_KEY | ColumnFlags::HANDLE_KEY, value)
}

pub fn insert_row(table: &Arc<TableName>, start_ts: u64, commit_ts: u64, columns: Vec<Column>) -> RowChangedEvent {
	RawRowChange::new(start_ts, commit_ts, table.clone()).with_columns(columns).build().expect("insert row")
}

pub fn update_row(
	table: &Arc<TableName>,
	start_ts: u64,
	commit_ts: u64,
	pre_columns: Vec<Column>,
	columns: Vec<Column>,
) -> RowChangedEvent {
	RawRowChange::new(start_ts, commit_ts, table.clone())
		.with_pre_columns(pre_columns.into_iter().map(Some).collect())
		.with_columns(columns)
		.build()
		.expect("update row")
}

pub fn delete_row(table: &Arc<TableName>, start_ts: u64, commit_ts: u64, pre_columns: Vec<Column>) -> RowChangedEvent {
	RawRowChange::new(start_ts, commit_ts, table.clone())
		.with_pre_columns(pre_columns.into_iter().map(Some).collect())
		.build()
		.expect("delete row")
}
