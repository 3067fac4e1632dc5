// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	barrier::BarrierError,
	txn::{TxnKey, TxnState},
};

/// Errors raised while building or completing a [`crate::SingleTableTxn`].
///
/// All variants indicate a bug in the stage driving the txn, never a
/// transient condition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TxnError {
	#[error("unexpected row change event for txn {expected}: row belongs to {actual}, row: {row}")]
	KeyMismatch {
		expected: TxnKey,
		actual: TxnKey,
		row: String,
	},

	#[error("cannot {operation} txn {key} in state {state}")]
	InvalidState {
		key: TxnKey,
		state: TxnState,
		operation: &'static str,
	},

	#[error(transparent)]
	Barrier(#[from] BarrierError),
}

pub type Result<T> = std::result::Result<T, TxnError>;
