// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::column::ColumnInfo;

mod action;
mod job;

pub use action::ActionType;
pub use job::{SchemaColumn, SchemaJob, SchemaTable, TableInfo};

/// Reduced table description passed to sinks: identity plus column names and types.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimpleTableInfo {
	pub schema: String,
	/// Empty when no single table identity applies.
	pub table: String,
	pub table_id: i64,
	pub column_info: Vec<ColumnInfo>,
}

impl SimpleTableInfo {
	/// True once a concrete table has been filled in.
	pub fn has_table(&self) -> bool {
		!self.table.is_empty()
	}
}

impl From<&SchemaColumn> for ColumnInfo {
	fn from(column: &SchemaColumn) -> Self {
		ColumnInfo::new(column.name.clone(), column.r#type)
	}
}

impl From<&TableInfo> for SimpleTableInfo {
	fn from(info: &TableInfo) -> Self {
		Self {
			schema: info.table_name.schema().to_string(),
			table: info.table_name.table().to_string(),
			table_id: info.id(),
			column_info: info.columns.iter().map(ColumnInfo::from).collect(),
		}
	}
}

/// A schema change to replicate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DdlEvent {
	pub start_ts: u64,
	pub commit_ts: u64,
	pub table_info: SimpleTableInfo,
	#[serde(default)]
	pub pre_table_info: Option<SimpleTableInfo>,
	pub query: String,
	/// Not part of the serialized form; redo payloads carry it as a separate byte.
	#[serde(skip)]
	pub action_type: ActionType,
}

impl DdlEvent {
	/// Builds the event for a finished job. `pre_table_info` is the table as it
	/// was known before the job, if any.
	pub fn from_job(job: &SchemaJob, pre_table_info: Option<&TableInfo>) -> Self {
		let mut event = DdlEvent {
			start_ts: job.start_ts,
			commit_ts: job.finished_ts,
			table_info: SimpleTableInfo {
				schema: job.schema_name.clone(),
				..SimpleTableInfo::default()
			},
			pre_table_info: pre_table_info.map(SimpleTableInfo::from),
			query: job.query.clone(),
			action_type: job.action_type,
		};

		// a multi-table rename has no single resulting table
		if job.action_type.is_multi_table() {
			debug!(action = %job.action_type, commit_ts = job.finished_ts, "skipping table info of ddl");
			return event;
		}

		if let Some(table) = &job.table {
			event.table_info.table = table.name.clone();
			event.table_info.table_id = job.table_id;
			event.table_info.column_info = table.columns.iter().map(ColumnInfo::from).collect();
		}

		event
	}
}
