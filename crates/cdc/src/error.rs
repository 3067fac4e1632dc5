// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! CDC error types.

use tidemark_core::CoreError;
use tidemark_redo::RedoError;
use tidemark_transaction::{TxnError, WaterMarkError};

/// Error type for CDC pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum CdcError {
	/// The operation failed due to an internal error.
	#[error("CDC internal error: {0}")]
	Internal(String),

	#[error("invalid CDC pipeline config: {0}")]
	Config(String),

	/// Raised by sink implementations.
	#[error("CDC sink error: {0}")]
	Sink(String),

	/// An earlier invariant violation stopped processing of the table.
	#[error("table {table_id} is halted")]
	TableHalted {
		table_id: i64,
	},

	#[error("commit ts regression on table {table_id}: {commit_ts} after {last_commit_ts}")]
	CommitRegression {
		table_id: i64,
		last_commit_ts: u64,
		commit_ts: u64,
	},

	#[error("CDC pipeline {0} is shut down")]
	Shutdown(String),

	#[error(transparent)]
	Txn(#[from] TxnError),

	#[error(transparent)]
	Core(#[from] CoreError),

	#[error(transparent)]
	Redo(#[from] RedoError),

	#[error(transparent)]
	WaterMark(#[from] WaterMarkError),
}

/// Result type for CDC operations.
pub type CdcResult<T> = Result<T, CdcError>;
