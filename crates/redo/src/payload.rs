// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tidemark_core::{ActionType, Column, ColumnFlags, DdlEvent, RawRowChange, RowChangedEvent, TableName, Value};

use crate::error::RedoError;

/// Column as persisted in a redo record; the flag set travels as raw bits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedoColumn {
	pub name: String,
	#[serde(rename = "type")]
	pub r#type: u8,
	pub value: Value,
	#[serde(default)]
	pub flag: u64,
	/// Zero when the record predates size tracking; the size is recomputed then.
	#[serde(default)]
	pub approximate_bytes: usize,
}

impl From<&Column> for RedoColumn {
	fn from(column: &Column) -> Self {
		Self {
			name: column.name.clone(),
			r#type: column.r#type,
			value: column.value.clone(),
			flag: column.flag.bits(),
			approximate_bytes: column.approximate_bytes,
		}
	}
}

impl From<RedoColumn> for Column {
	fn from(redo: RedoColumn) -> Self {
		let column = Column::new(redo.name, redo.r#type, ColumnFlags::from_bits_retain(redo.flag), redo.value);
		match redo.approximate_bytes {
			0 => column,
			size => column.with_approximate_bytes(size),
		}
	}
}

/// Row event fields other than its images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RedoRowHeader {
	pub start_ts: u64,
	pub commit_ts: u64,
	pub table: TableName,
	#[serde(default)]
	pub table_info_version: u64,
	#[serde(default)]
	pub replica_id: u64,
	#[serde(default)]
	pub index_columns: Vec<Vec<usize>>,
	#[serde(default)]
	pub approximate_data_size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RedoRowChangedEvent {
	pub row: RedoRowHeader,
	/// `None` entries are pre-image columns the source did not capture.
	#[serde(default)]
	pub pre_columns: Vec<Option<RedoColumn>>,
	#[serde(default)]
	pub columns: Vec<RedoColumn>,
}

impl From<&RowChangedEvent> for RedoRowChangedEvent {
	fn from(event: &RowChangedEvent) -> Self {
		Self {
			row: RedoRowHeader {
				start_ts: event.start_ts,
				commit_ts: event.commit_ts,
				table: event.table.as_ref().clone(),
				table_info_version: event.table_info_version,
				replica_id: event.replica_id,
				index_columns: event.index_columns.clone(),
				approximate_data_size: event.approximate_data_size,
			},
			pre_columns: event.pre_columns().iter().map(|c| c.as_ref().map(RedoColumn::from)).collect(),
			columns: event.columns().iter().map(RedoColumn::from).collect(),
		}
	}
}

impl TryFrom<RedoRowChangedEvent> for RowChangedEvent {
	type Error = RedoError;

	fn try_from(redo: RedoRowChangedEvent) -> Result<Self, Self::Error> {
		let header = redo.row;
		let event = RawRowChange::new(header.start_ts, header.commit_ts, header.table.into())
			.with_table_info_version(header.table_info_version)
			.with_replica_id(header.replica_id)
			.with_index_columns(header.index_columns)
			.with_approximate_data_size(header.approximate_data_size)
			.with_pre_columns(redo.pre_columns.into_iter().map(|c| c.map(Column::from)).collect())
			.with_columns(redo.columns.into_iter().map(Column::from).collect())
			.build()?;
		Ok(event)
	}
}

/// Schema change as persisted in a redo record. The action type is stored
/// beside the event since the event itself does not serialize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedoDdlEvent {
	pub ddl: DdlEvent,
	#[serde(rename = "type")]
	pub r#type: u8,
}

impl From<&DdlEvent> for RedoDdlEvent {
	fn from(ddl: &DdlEvent) -> Self {
		Self {
			ddl: ddl.clone(),
			r#type: ddl.action_type.code(),
		}
	}
}

impl TryFrom<RedoDdlEvent> for DdlEvent {
	type Error = RedoError;

	fn try_from(redo: RedoDdlEvent) -> Result<Self, Self::Error> {
		let mut ddl = redo.ddl;
		ddl.action_type = ActionType::try_from(redo.r#type)?;
		Ok(ddl)
	}
}
