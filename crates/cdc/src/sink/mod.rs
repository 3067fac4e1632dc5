// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod memory;
mod redo;

pub use memory::{MemorySink, SinkEvent};
pub use redo::RedoSink;
use tidemark_core::DdlEvent;
use tidemark_transaction::SingleTableTxn;

use crate::error::CdcResult;

/// Destination of flushed txns and schema changes.
///
/// `apply_txn` is called from worker threads. Txns of one table arrive from a
/// single worker in commit order; txns of different tables arrive
/// concurrently. Returning an error does not retry the txn.
pub trait TxnSink: Send + Sync + 'static {
	fn apply_txn(&self, txn: &SingleTableTxn) -> CdcResult<()>;

	fn apply_ddl(&self, ddl: &DdlEvent) -> CdcResult<()>;
}
