// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	sync::Arc,
};

use tidemark_core::{RowChangedEvent, TableName};
use tracing::error;

use crate::{
	barrier::CompletionBarrier,
	error::{Result, TxnError},
};

/// Identity of a single-table txn.
///
/// Field order gives the ordering used when draining: by table, then commit
/// timestamp, then start timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxnKey {
	pub table_id: i64,
	pub commit_ts: u64,
	pub start_ts: u64,
}

impl TxnKey {
	pub fn new(table_id: i64, start_ts: u64, commit_ts: u64) -> Self {
		Self {
			table_id,
			commit_ts,
			start_ts,
		}
	}

	pub fn of(row: &RowChangedEvent) -> Self {
		Self::new(row.table_id(), row.start_ts, row.commit_ts)
	}
}

impl Display for TxnKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "(table {}, start_ts {}, commit_ts {})", self.table_id, self.start_ts, self.commit_ts)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnState {
	Empty,
	Accumulating,
	Finalizing,
	Completed,
}

impl Display for TxnState {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			TxnState::Empty => f.write_str("empty"),
			TxnState::Accumulating => f.write_str("accumulating"),
			TxnState::Finalizing => f.write_str("finalizing"),
			TxnState::Completed => f.write_str("completed"),
		}
	}
}

/// Rows of one upstream transaction that touched one table.
///
/// Lifecycle: `Empty -> Accumulating -> Finalizing -> Completed`. Rows may
/// only be appended before [`SingleTableTxn::seal`]; completion is signaled
/// exactly once after that. A sealed txn without rows acts as a flush marker.
#[derive(Debug)]
pub struct SingleTableTxn {
	pub table: Arc<TableName>,
	pub start_ts: u64,
	pub commit_ts: u64,
	pub replica_id: u64,
	rows: Vec<RowChangedEvent>,
	state: TxnState,
	completion: CompletionBarrier,
}

impl SingleTableTxn {
	pub fn new(table: Arc<TableName>, start_ts: u64, commit_ts: u64, replica_id: u64) -> Self {
		Self {
			table,
			start_ts,
			commit_ts,
			replica_id,
			rows: Vec::new(),
			state: TxnState::Empty,
			completion: CompletionBarrier::new(),
		}
	}

	pub fn key(&self) -> TxnKey {
		TxnKey::new(self.table.table_id(), self.start_ts, self.commit_ts)
	}

	pub fn state(&self) -> TxnState {
		self.state
	}

	pub fn rows(&self) -> &[RowChangedEvent] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn approximate_bytes(&self) -> usize {
		self.rows.iter().map(RowChangedEvent::approximate_bytes).sum()
	}

	/// Handle to the completion signal, for waiting outside the consuming worker.
	pub fn completion(&self) -> CompletionBarrier {
		self.completion.clone()
	}

	/// Appends a row belonging to this txn.
	///
	/// A row with a different table, start or commit timestamp, or an append
	/// after sealing, is an invariant violation of the grouping stage.
	pub fn append(&mut self, row: RowChangedEvent) -> Result<()> {
		if !matches!(self.state, TxnState::Empty | TxnState::Accumulating) {
			error!(txn = %self.key(), state = %self.state, "append to sealed txn");
			return Err(TxnError::InvalidState {
				key: self.key(),
				state: self.state,
				operation: "append to",
			});
		}

		let actual = TxnKey::of(&row);
		if actual != self.key() {
			let row = row.snapshot();
			error!(txn = %self.key(), row = %row, "unexpected row change event");
			return Err(TxnError::KeyMismatch {
				expected: self.key(),
				actual,
				row,
			});
		}

		self.rows.push(row);
		self.state = TxnState::Accumulating;
		Ok(())
	}

	/// Closes the txn for appends and hands it to its consumer.
	pub fn seal(&mut self) -> Result<()> {
		match self.state {
			TxnState::Empty | TxnState::Accumulating => {
				self.state = TxnState::Finalizing;
				Ok(())
			}
			state => Err(TxnError::InvalidState {
				key: self.key(),
				state,
				operation: "seal",
			}),
		}
	}

	/// Marks the txn as applied and releases everyone waiting on it.
	pub fn signal_completion(&mut self) -> Result<()> {
		if self.state != TxnState::Finalizing {
			error!(txn = %self.key(), state = %self.state, "completion signaled out of order");
			return Err(TxnError::InvalidState {
				key: self.key(),
				state: self.state,
				operation: "complete",
			});
		}
		self.completion.signal()?;
		self.state = TxnState::Completed;
		Ok(())
	}
}
