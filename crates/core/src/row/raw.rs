// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use serde::Deserialize;
use tracing::error;

use crate::{
	column::Column,
	error::{CoreError, Result},
	row::event::RowChangedEvent,
	table::TableName,
};

/// A row change as handed over by the transport, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawRowChange {
	pub start_ts: u64,
	pub commit_ts: u64,
	pub table: Arc<TableName>,
	#[serde(default)]
	pub table_info_version: u64,
	#[serde(default)]
	pub replica_id: u64,
	#[serde(default)]
	pub pre_columns: Vec<Option<Column>>,
	#[serde(default)]
	pub columns: Vec<Column>,
	#[serde(default)]
	pub index_columns: Vec<Vec<usize>>,
	#[serde(default)]
	pub approximate_data_size: i64,
}

impl RawRowChange {
	pub fn new(start_ts: u64, commit_ts: u64, table: Arc<TableName>) -> Self {
		Self {
			start_ts,
			commit_ts,
			table,
			table_info_version: 0,
			replica_id: 0,
			pre_columns: Vec::new(),
			columns: Vec::new(),
			index_columns: Vec::new(),
			approximate_data_size: 0,
		}
	}

	pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
		self.columns = columns;
		self
	}

	pub fn with_pre_columns(mut self, pre_columns: Vec<Option<Column>>) -> Self {
		self.pre_columns = pre_columns;
		self
	}

	pub fn with_index_columns(mut self, index_columns: Vec<Vec<usize>>) -> Self {
		self.index_columns = index_columns;
		self
	}

	pub fn with_replica_id(mut self, replica_id: u64) -> Self {
		self.replica_id = replica_id;
		self
	}

	pub fn with_table_info_version(mut self, version: u64) -> Self {
		self.table_info_version = version;
		self
	}

	pub fn with_approximate_data_size(mut self, size: i64) -> Self {
		self.approximate_data_size = size;
		self
	}

	pub fn build(self) -> Result<RowChangedEvent> {
		RowChangedEvent::try_from(self)
	}
}

impl TryFrom<RawRowChange> for RowChangedEvent {
	type Error = CoreError;

	fn try_from(raw: RawRowChange) -> Result<Self> {
		if raw.pre_columns.is_empty() && raw.columns.is_empty() {
			error!(
				table = %raw.table,
				start_ts = raw.start_ts,
				commit_ts = raw.commit_ts,
				"row change without pre or post columns"
			);
			return Err(CoreError::EmptyRow {
				table: raw.table.to_string(),
				start_ts: raw.start_ts,
				commit_ts: raw.commit_ts,
			});
		}

		Ok(RowChangedEvent {
			start_ts: raw.start_ts,
			commit_ts: raw.commit_ts,
			table: raw.table,
			table_info_version: raw.table_info_version,
			replica_id: raw.replica_id,
			columns: raw.columns,
			pre_columns: raw.pre_columns,
			index_columns: raw.index_columns,
			approximate_data_size: raw.approximate_data_size,
		})
	}
}
