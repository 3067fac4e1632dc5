// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Key selection and sizing of row events built from fixtures

use std::sync::Arc;

use tidemark_core::{RowChangedEvent, RowKind, Value};
use tidemark_testing::{column, delete_row, handle_column, init_tracing, insert_row, pk_column, table, update_row};

#[test]
fn test_table_without_primary_key_uses_handle() {
	init_tracing();
	let logs = table("app", "logs", 3);
	let row = insert_row(&logs, 1, 2, vec![column("msg", "hi"), handle_column("uid", "u-1")]);

	assert!(row.primary_key_columns().is_empty());
	let handle = row.handle_key_columns().unwrap();
	assert_eq!(handle.len(), 1);
	assert_eq!(handle[0].name, "uid");
}

#[test]
fn test_delete_selects_from_pre_image() {
	init_tracing();
	let orders = table("shop", "orders", 7);
	let row = delete_row(&orders, 5, 10, vec![pk_column("id", 42i64), column("note", "bye")]);

	assert_eq!(row.kind(), RowKind::Delete);
	let keys = row.primary_key_columns();
	assert_eq!(keys.len(), 1);
	assert_eq!(keys[0].value, Value::from(42i64));
	assert_eq!(row.handle_key_columns().unwrap()[0].name, "id");
}

#[test]
fn test_update_selects_from_post_image() {
	init_tracing();
	let orders = table("shop", "orders", 7);
	let row = update_row(&orders, 5, 10, vec![pk_column("id", 1i64)], vec![pk_column("id", 2i64)]);

	assert_eq!(row.kind(), RowKind::Update);
	assert_eq!(row.handle_key_columns().unwrap()[0].value, Value::from(2i64));
}

#[test]
fn test_rows_share_table_identity() {
	let orders = table("shop", "orders", 7);
	let rows: Vec<RowChangedEvent> =
		(0..3i64).map(|id| insert_row(&orders, 1, 2, vec![pk_column("id", id)])).collect();

	assert!(rows.iter().all(|row| Arc::ptr_eq(&row.table, &orders)));
	assert_eq!(Arc::strong_count(&orders), 4);
}

#[test]
fn test_approximate_bytes_monotonic() {
	let orders = table("shop", "orders", 7);
	let mut columns = vec![pk_column("id", 1i64)];
	let mut last = insert_row(&orders, 1, 2, columns.clone()).approximate_bytes();

	for i in 0..10 {
		columns.push(column(&format!("c{i}"), "value"));
		let size = insert_row(&orders, 1, 2, columns.clone()).approximate_bytes();
		assert!(size > last);
		last = size;
	}
}

#[test]
fn test_snapshot_uses_kebab_case() {
	let orders = table("shop", "orders", 7);
	let row = update_row(&orders, 5, 10, vec![pk_column("id", 1i64)], vec![pk_column("id", 2i64)]);
	let snapshot = row.snapshot();

	for field in ["\"start-ts\":5", "\"commit-ts\":10", "\"replica-id\":0", "\"pre-columns\"", "\"tbl-id\":7"] {
		assert!(snapshot.contains(field), "{field} missing in {snapshot}");
	}
}
