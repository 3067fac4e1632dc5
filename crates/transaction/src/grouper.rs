// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tidemark_core::RowChangedEvent;
use tracing::{debug, instrument};

use crate::{
	error::Result,
	txn::{SingleTableTxn, TxnKey},
};

/// Buffers row events into single-table txns until the resolved timestamp
/// of their table passes their commit timestamp.
///
/// Rows of one txn must be added by one thread at a time; different tables
/// may be fed concurrently.
#[derive(Debug, Default)]
pub struct TxnGrouper {
	txns: DashMap<TxnKey, SingleTableTxn>,
	rows: AtomicUsize,
}

impl TxnGrouper {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&self, row: RowChangedEvent) -> Result<()> {
		let key = TxnKey::of(&row);
		let mut txn = self
			.txns
			.entry(key)
			.or_insert_with(|| SingleTableTxn::new(row.table.clone(), row.start_ts, row.commit_ts, row.replica_id));
		txn.append(row)?;
		self.rows.fetch_add(1, Ordering::Relaxed);
		Ok(())
	}

	/// Removes and seals every buffered txn of `table_id` with
	/// `commit_ts <= resolved_ts`, ordered by commit then start timestamp.
	#[instrument(name = "transaction::grouper::drain_resolved", level = "debug", skip(self))]
	pub fn drain_resolved(&self, table_id: i64, resolved_ts: u64) -> Result<Vec<SingleTableTxn>> {
		let txns = self.drain(|key| key.table_id == table_id && key.commit_ts <= resolved_ts)?;
		debug!(txns = txns.len(), "drained resolved txns");
		Ok(txns)
	}

	/// Removes and seals every buffered txn, ordered by table, commit and
	/// start timestamp.
	#[instrument(name = "transaction::grouper::drain_all", level = "debug", skip(self))]
	pub fn drain_all(&self) -> Result<Vec<SingleTableTxn>> {
		let txns = self.drain(|_| true)?;
		debug!(txns = txns.len(), "drained all txns");
		Ok(txns)
	}

	/// Number of buffered txns.
	pub fn len(&self) -> usize {
		self.txns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.txns.is_empty()
	}

	/// Number of buffered rows across all txns.
	pub fn buffered_rows(&self) -> usize {
		self.rows.load(Ordering::Relaxed)
	}

	fn drain(&self, selected: impl Fn(&TxnKey) -> bool) -> Result<Vec<SingleTableTxn>> {
		let mut keys: Vec<TxnKey> = self.txns.iter().map(|entry| *entry.key()).filter(|key| selected(key)).collect();
		keys.sort();

		let mut txns = Vec::with_capacity(keys.len());
		for key in keys {
			let Some((_, mut txn)) = self.txns.remove(&key) else {
				continue;
			};
			self.rows.fetch_sub(txn.len(), Ordering::Relaxed);
			txn.seal()?;
			txns.push(txn);
		}
		Ok(txns)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use tidemark_core::{Column, ColumnFlags, RawRowChange, RowChangedEvent, TableName};

	use super::*;
	use crate::txn::TxnState;

	fn row(table_id: i64, start_ts: u64, commit_ts: u64, id: i64) -> RowChangedEvent {
		RawRowChange::new(start_ts, commit_ts, Arc::new(TableName::new("shop", "orders", table_id)))
			.with_columns(vec![Column::new("id", 3, ColumnFlags::PRIMARY_KEY, id)])
			.build()
			.unwrap()
	}

	fn keys(txns: &[SingleTableTxn]) -> Vec<TxnKey> {
		txns.iter().map(SingleTableTxn::key).collect()
	}

	#[test]
	fn test_groups_rows_by_txn() {
		let grouper = TxnGrouper::new();
		grouper.add(row(7, 5, 10, 1)).unwrap();
		grouper.add(row(7, 5, 10, 2)).unwrap();
		grouper.add(row(7, 6, 10, 3)).unwrap();
		grouper.add(row(8, 5, 10, 4)).unwrap();

		assert_eq!(grouper.len(), 3);
		assert_eq!(grouper.buffered_rows(), 4);
	}

	#[test]
	fn test_drain_resolved_only_touches_table() {
		let grouper = TxnGrouper::new();
		grouper.add(row(7, 5, 10, 1)).unwrap();
		grouper.add(row(7, 11, 20, 2)).unwrap();
		grouper.add(row(8, 5, 10, 3)).unwrap();

		let drained = grouper.drain_resolved(7, 15).unwrap();
		assert_eq!(keys(&drained), vec![TxnKey::new(7, 5, 10)]);
		assert!(drained.iter().all(|txn| txn.state() == TxnState::Finalizing));
		assert_eq!(grouper.len(), 2);
		assert_eq!(grouper.buffered_rows(), 2);
	}

	#[test]
	fn test_drain_resolved_is_inclusive_and_ordered() {
		let grouper = TxnGrouper::new();
		grouper.add(row(7, 9, 12, 1)).unwrap();
		grouper.add(row(7, 3, 12, 2)).unwrap();
		grouper.add(row(7, 1, 4, 3)).unwrap();

		let drained = grouper.drain_resolved(7, 12).unwrap();
		assert_eq!(keys(&drained), vec![TxnKey::new(7, 1, 4), TxnKey::new(7, 3, 12), TxnKey::new(7, 9, 12)]);
		assert!(grouper.is_empty());
		assert_eq!(grouper.buffered_rows(), 0);
	}

	#[test]
	fn test_rows_after_drain_start_new_txn() {
		let grouper = TxnGrouper::new();
		grouper.add(row(7, 5, 10, 1)).unwrap();
		assert_eq!(grouper.drain_resolved(7, 10).unwrap()[0].len(), 1);

		grouper.add(row(7, 5, 10, 2)).unwrap();
		let drained = grouper.drain_resolved(7, 10).unwrap();
		assert_eq!(drained.len(), 1);
		assert_eq!(drained[0].rows()[0].columns()[0].value, 2i64.into());
	}

	#[test]
	fn test_drain_all_orders_by_table_first() {
		let grouper = TxnGrouper::new();
		grouper.add(row(9, 1, 2, 1)).unwrap();
		grouper.add(row(3, 5, 30, 2)).unwrap();
		grouper.add(row(3, 4, 6, 3)).unwrap();

		let drained = grouper.drain_all().unwrap();
		assert_eq!(keys(&drained), vec![TxnKey::new(3, 4, 6), TxnKey::new(3, 5, 30), TxnKey::new(9, 1, 2)]);
		assert!(grouper.is_empty());
	}

	#[test]
	fn test_drain_empty() {
		let grouper = TxnGrouper::new();
		assert!(grouper.drain_resolved(1, u64::MAX).unwrap().is_empty());
		assert!(grouper.drain_all().unwrap().is_empty());
	}

	#[test]
	fn test_rows_keep_arrival_order() {
		let grouper = TxnGrouper::new();
		for id in 0..5 {
			grouper.add(row(7, 5, 10, id)).unwrap();
		}
		let drained = grouper.drain_all().unwrap();
		let ids: Vec<_> = drained[0].rows().iter().map(|r| r.columns()[0].value.clone()).collect();
		assert_eq!(ids, (0..5i64).map(Into::into).collect::<Vec<_>>());
	}
}
