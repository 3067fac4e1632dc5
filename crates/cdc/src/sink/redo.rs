// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::io::Write;

use parking_lot::Mutex;
use tidemark_core::DdlEvent;
use tidemark_redo::{RedoLog, RedoWriter};
use tidemark_transaction::SingleTableTxn;
use tracing::trace;

use crate::{error::CdcResult, sink::TxnSink};

/// Appends every row and schema change as a framed redo record.
///
/// A txn is framed in full before any of it reaches the output, and the
/// writer is flushed after each txn and each DDL.
#[derive(Debug)]
pub struct RedoSink<W: Write + Send + 'static> {
	writer: Mutex<RedoWriter<W>>,
}

impl<W: Write + Send + 'static> RedoSink<W> {
	pub fn new(inner: W) -> Self {
		Self {
			writer: Mutex::new(RedoWriter::new(inner)),
		}
	}

	pub fn records_written(&self) -> u64 {
		self.writer.lock().records_written()
	}

	/// Runs `f` against the underlying output.
	pub fn with_output<T>(&self, f: impl FnOnce(&W) -> T) -> T {
		f(self.writer.lock().get_ref())
	}

	pub fn into_inner(self) -> W {
		self.writer.into_inner().into_inner()
	}
}

impl<W: Write + Send + 'static> TxnSink for RedoSink<W> {
	fn apply_txn(&self, txn: &SingleTableTxn) -> CdcResult<()> {
		let logs: Vec<RedoLog> = txn.rows().iter().map(RedoLog::from_row).collect();
		let mut writer = self.writer.lock();
		writer.write_batch(&logs)?;
		writer.flush()?;
		trace!(txn = %txn.key(), rows = txn.len(), "txn written to redo");
		Ok(())
	}

	fn apply_ddl(&self, ddl: &DdlEvent) -> CdcResult<()> {
		let mut writer = self.writer.lock();
		writer.write(&RedoLog::from_ddl(ddl))?;
		writer.flush()?;
		Ok(())
	}
}
