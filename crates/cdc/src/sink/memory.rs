// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use parking_lot::Mutex;
use tidemark_core::{DdlEvent, RowChangedEvent};
use tidemark_transaction::{SingleTableTxn, TxnKey};

use crate::{error::CdcResult, sink::TxnSink};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
	Txn {
		key: TxnKey,
		rows: Vec<RowChangedEvent>,
	},
	Ddl(DdlEvent),
}

/// Records everything applied to it, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
	events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<SinkEvent> {
		self.events.lock().clone()
	}

	/// Applied txns of one table, in arrival order.
	pub fn txns_of(&self, table_id: i64) -> Vec<(TxnKey, Vec<RowChangedEvent>)> {
		self.events
			.lock()
			.iter()
			.filter_map(|event| match event {
				SinkEvent::Txn {
					key,
					rows,
				} if key.table_id == table_id => Some((*key, rows.clone())),
				_ => None,
			})
			.collect()
	}

	pub fn ddls(&self) -> Vec<DdlEvent> {
		self.events
			.lock()
			.iter()
			.filter_map(|event| match event {
				SinkEvent::Ddl(ddl) => Some(ddl.clone()),
				SinkEvent::Txn {
					..
				} => None,
			})
			.collect()
	}

	pub fn len(&self) -> usize {
		self.events.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.lock().is_empty()
	}
}

impl TxnSink for MemorySink {
	fn apply_txn(&self, txn: &SingleTableTxn) -> CdcResult<()> {
		self.events.lock().push(SinkEvent::Txn {
			key: txn.key(),
			rows: txn.rows().to_vec(),
		});
		Ok(())
	}

	fn apply_ddl(&self, ddl: &DdlEvent) -> CdcResult<()> {
		self.events.lock().push(SinkEvent::Ddl(ddl.clone()));
		Ok(())
	}
}
