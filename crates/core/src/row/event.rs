// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	mem::size_of,
	sync::Arc,
};

use serde::{Deserialize, Serialize};
use tidemark_type::ColumnFlags;
use tracing::error;

use crate::{
	column::Column,
	error::{CoreError, Result},
	row::raw::RawRowChange,
	table::TableName,
};

/// Kind of a row mutation, derived from which images are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
	Insert,
	Update,
	Delete,
}

impl Display for RowKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			RowKind::Insert => f.write_str("INSERT"),
			RowKind::Update => f.write_str("UPDATE"),
			RowKind::Delete => f.write_str("DELETE"),
		}
	}
}

/// A row mutation captured from the source change stream.
///
/// At least one of the two images is non-empty; [`RawRowChange`] enforces
/// this when the event is built, so [`RowChangedEvent::kind`] is total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawRowChange")]
pub struct RowChangedEvent {
	pub start_ts: u64,
	pub commit_ts: u64,
	pub table: Arc<TableName>,
	#[serde(default, skip_serializing_if = "is_zero")]
	pub table_info_version: u64,
	pub replica_id: u64,
	pub(crate) columns: Vec<Column>,
	pub(crate) pre_columns: Vec<Option<Column>>,
	#[serde(skip)]
	pub index_columns: Vec<Vec<usize>>,
	/// Approximate size of the encoded upstream record, if the transport measured it.
	#[serde(skip)]
	pub approximate_data_size: i64,
}

fn is_zero(value: &u64) -> bool {
	*value == 0
}

impl RowChangedEvent {
	/// Post image. Empty for deletes.
	pub fn columns(&self) -> &[Column] {
		&self.columns
	}

	/// Pre image. Empty for inserts; individual columns may be absent.
	pub fn pre_columns(&self) -> &[Option<Column>] {
		&self.pre_columns
	}

	pub fn table_id(&self) -> i64 {
		self.table.table_id()
	}

	pub fn kind(&self) -> RowKind {
		if self.pre_columns.is_empty() {
			RowKind::Insert
		} else if self.columns.is_empty() {
			RowKind::Delete
		} else {
			RowKind::Update
		}
	}

	pub fn is_insert(&self) -> bool {
		self.kind() == RowKind::Insert
	}

	pub fn is_update(&self) -> bool {
		self.kind() == RowKind::Update
	}

	pub fn is_delete(&self) -> bool {
		self.kind() == RowKind::Delete
	}

	/// Primary key columns of the row, taken from the pre image for deletes
	/// and from the post image otherwise. Empty if the table has no primary key.
	pub fn primary_key_columns(&self) -> Vec<&Column> {
		self.flagged_columns(ColumnFlags::PRIMARY_KEY)
	}

	/// Handle key columns of the row, selected like [`Self::primary_key_columns`].
	///
	/// Upstream schema resolution always elects a handle key, so an empty
	/// selection means the producing stage is broken and is reported as
	/// [`CoreError::MissingHandleKey`].
	pub fn handle_key_columns(&self) -> Result<Vec<&Column>> {
		let columns = self.flagged_columns(ColumnFlags::HANDLE_KEY);
		if columns.is_empty() {
			let event = self.snapshot();
			error!(table = %self.table, event = %event, "cannot find handle key columns");
			return Err(CoreError::MissingHandleKey {
				table: self.table.to_string(),
				event,
			});
		}
		Ok(columns)
	}

	fn flagged_columns(&self, flag: ColumnFlags) -> Vec<&Column> {
		match self.kind() {
			RowKind::Delete => self.pre_columns.iter().flatten().filter(|c| c.flag.has(flag)).collect(),
			RowKind::Insert | RowKind::Update => self.columns.iter().filter(|c| c.flag.has(flag)).collect(),
		}
	}

	/// Approximate bytes in memory consumed by the event.
	pub fn approximate_bytes(&self) -> usize {
		// table name
		let mut size = self.table.schema().len() + self.table.table().len() + size_of::<TableName>();

		size += self.columns.iter().map(|c| c.approximate_bytes).sum::<usize>();
		size += self.pre_columns.iter().flatten().map(|c| c.approximate_bytes).sum::<usize>();

		for index in &self.index_columns {
			size += index.len() * size_of::<usize>();
			size += size_of::<Vec<usize>>();
		}

		size + size_of::<RowChangedEvent>()
	}

	/// JSON rendering of the event used as diagnostic context.
	pub fn snapshot(&self) -> String {
		serde_json::to_string(self).unwrap_or_else(|err| format!("<unrenderable row event: {err}>"))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use tidemark_type::ColumnFlags;

	use crate::{Column, CoreError, RawRowChange, RowChangedEvent, RowKind, TableName};

	fn table() -> Arc<TableName> {
		Arc::new(TableName::new("shop", "orders", 7))
	}

	fn id(value: i64) -> Column {
		Column::new("id", 3, ColumnFlags::PRIMARY_KEY | ColumnFlags::HANDLE_KEY, value)
	}

	fn name(value: &str) -> Column {
		Column::new("name", 15, ColumnFlags::NULLABLE, value)
	}

	fn row(pre: Vec<Option<Column>>, post: Vec<Column>) -> RowChangedEvent {
		RawRowChange::new(5, 10, table()).with_pre_columns(pre).with_columns(post).build().unwrap()
	}

	#[test]
	fn test_classification() {
		assert_eq!(row(vec![], vec![id(1)]).kind(), RowKind::Insert);
		assert_eq!(row(vec![Some(id(1))], vec![id(1)]).kind(), RowKind::Update);
		assert_eq!(row(vec![Some(id(1))], vec![]).kind(), RowKind::Delete);
	}

	#[test]
	fn test_exactly_one_kind_holds() {
		for event in [
			row(vec![], vec![id(1)]),
			row(vec![Some(id(1))], vec![id(2)]),
			row(vec![Some(id(1))], vec![]),
			row(vec![None], vec![]),
		] {
			let held = [event.is_insert(), event.is_update(), event.is_delete()];
			assert_eq!(held.iter().filter(|h| **h).count(), 1, "{event:?}");
		}
	}

	#[test]
	fn test_both_images_empty_is_rejected() {
		let result = RawRowChange::new(5, 10, table()).build();
		assert!(matches!(result, Err(CoreError::EmptyRow { start_ts: 5, commit_ts: 10, .. })));
	}

	#[test]
	fn test_primary_key_from_post_image_for_update() {
		let event = row(vec![Some(id(1)), Some(name("old"))], vec![id(2), name("new")]);
		let keys = event.primary_key_columns();
		assert_eq!(keys.len(), 1);
		assert_eq!(keys[0].value, 2i64.into());
	}

	#[test]
	fn test_primary_key_from_pre_image_for_delete() {
		let event = row(vec![None, Some(id(9)), Some(name("gone"))], vec![]);
		let keys = event.primary_key_columns();
		assert_eq!(keys.len(), 1);
		assert_eq!(keys[0].value, 9i64.into());
	}

	#[test]
	fn test_no_primary_key_is_empty() {
		let event = row(vec![], vec![name("a")]);
		assert!(event.primary_key_columns().is_empty());
	}

	#[test]
	fn test_handle_key_columns() {
		let event = row(vec![], vec![name("a"), id(3)]);
		let keys = event.handle_key_columns().unwrap();
		assert_eq!(keys.len(), 1);
		assert_eq!(keys[0].name, "id");
	}

	#[test]
	fn test_missing_handle_key_is_fault() {
		let event = row(vec![], vec![name("a")]);
		let err = event.handle_key_columns().unwrap_err();
		match err {
			CoreError::MissingHandleKey {
				table,
				event,
			} => {
				assert_eq!(table, "shop.orders");
				assert!(event.contains("\"commit-ts\":10"));
			}
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn test_handle_key_ignores_post_image_on_delete() {
		let event = row(vec![Some(name("a"))], vec![]);
		assert!(event.handle_key_columns().is_err());
	}

	#[test]
	fn test_size_grows_with_columns() {
		let small = row(vec![], vec![id(1)]);
		let large = row(vec![], vec![id(1), name("abc")]);
		assert!(large.approximate_bytes() > small.approximate_bytes());

		let with_pre = row(vec![Some(id(1)), None], vec![id(1), name("abc")]);
		assert!(with_pre.approximate_bytes() > large.approximate_bytes());
	}

	#[test]
	fn test_size_ignores_column_order() {
		let a = row(vec![Some(name("x")), Some(id(1))], vec![id(1), name("abc")]);
		let b = row(vec![Some(id(1)), Some(name("x"))], vec![name("abc"), id(1)]);
		assert_eq!(a.approximate_bytes(), b.approximate_bytes());
	}

	#[test]
	fn test_size_counts_index_columns() {
		let plain = row(vec![], vec![id(1)]);
		let indexed = RawRowChange::new(5, 10, table())
			.with_columns(vec![id(1)])
			.with_index_columns(vec![vec![0], vec![0, 1]])
			.build()
			.unwrap();
		assert!(indexed.approximate_bytes() > plain.approximate_bytes());
	}

	#[test]
	fn test_json_round_trip() {
		let event = row(vec![Some(id(1)), None], vec![id(2)]);
		let json = event.snapshot();
		let decoded: RowChangedEvent = serde_json::from_str(&json).unwrap();
		assert_eq!(decoded.start_ts, 5);
		assert_eq!(decoded.commit_ts, 10);
		assert_eq!(decoded.table.table_id(), 7);
		assert_eq!(decoded.pre_columns()[1], None);
		assert_eq!(decoded.columns()[0].value, 2i64.into());
	}

	#[test]
	fn test_json_rejects_empty_images() {
		let json = r#"{"start-ts":1,"commit-ts":2,"table":{"db-name":"s","tbl-name":"t","tbl-id":1},"replica-id":0,"columns":[],"pre-columns":[]}"#;
		assert!(serde_json::from_str::<RowChangedEvent>(json).is_err());
	}
}
