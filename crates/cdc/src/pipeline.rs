// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeSet,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};

use dashmap::DashMap;
use parking_lot::Mutex;
use tidemark_core::{DdlEvent, RowChangedEvent};
use tidemark_transaction::{SingleTableTxn, TxnGrouper, WaterMark};
use tracing::{debug, error, instrument, warn};

use crate::{
	config::PipelineConfig,
	error::{CdcError, CdcResult},
	sink::TxnSink,
	stats::PipelineStats,
	worker::{WorkItem, WorkerPool},
};

/// Groups row events into single-table txns and flushes them through a sink
/// on a pool of workers.
///
/// Rows are buffered by [`CdcPipeline::emit`] until the table's resolved
/// timestamp passes their commit timestamp ([`CdcPipeline::resolve`]) or a
/// [`CdcPipeline::barrier`] flushes everything. Every dispatched txn gets a
/// sequence number; the watermark over those numbers tells how far the
/// pipeline has flushed.
///
/// An invariant violation on a table halts that table: its buffered rows are
/// dropped and further rows are rejected. Other tables keep flowing.
pub struct CdcPipeline<S: TxnSink> {
	config: PipelineConfig,
	sink: Arc<S>,
	grouper: TxnGrouper,
	watermark: Arc<WaterMark>,
	stats: Arc<PipelineStats>,
	dispatch: Mutex<Dispatch>,
	last_commit_ts: DashMap<i64, u64>,
	halted: DashMap<i64, String>,
	closed: AtomicBool,
}

struct Dispatch {
	seq: u64,
	pool: Option<WorkerPool>,
}

impl<S: TxnSink> CdcPipeline<S> {
	pub fn new(config: PipelineConfig, sink: S) -> CdcResult<Self> {
		config.validate()?;

		let sink = Arc::new(sink);
		let watermark = Arc::new(WaterMark::new(config.name.clone())?);
		let stats = Arc::new(PipelineStats::default());
		let pool = WorkerPool::spawn(&config, sink.clone(), watermark.clone(), stats.clone())?;
		debug!(pipeline = %config.name, workers = config.workers, "CDC pipeline started");

		Ok(Self {
			config,
			sink,
			grouper: TxnGrouper::new(),
			watermark,
			stats,
			dispatch: Mutex::new(Dispatch {
				seq: 0,
				pool: Some(pool),
			}),
			last_commit_ts: DashMap::new(),
			halted: DashMap::new(),
			closed: AtomicBool::new(false),
		})
	}

	pub fn config(&self) -> &PipelineConfig {
		&self.config
	}

	pub fn sink(&self) -> &S {
		&self.sink
	}

	pub fn stats(&self) -> &PipelineStats {
		&self.stats
	}

	/// Buffers a row until its txn is resolved.
	pub fn emit(&self, row: RowChangedEvent) -> CdcResult<()> {
		self.ensure_open()?;
		let table_id = row.table_id();
		if self.halted.contains_key(&table_id) {
			return Err(CdcError::TableHalted {
				table_id,
			});
		}

		// the grouper keys each txn by the row's own key, so an append
		// mismatch here means the grouper itself is broken
		if let Err(err) = self.grouper.add(row) {
			self.halt(table_id, &err.to_string());
			return Err(err.into());
		}
		Ok(())
	}

	/// Flushes every buffered txn of `table_id` committed at or before
	/// `resolved_ts`. Returns the highest sequence dispatched so far.
	#[instrument(name = "cdc::pipeline::resolve", level = "debug", skip(self))]
	pub fn resolve(&self, table_id: i64, resolved_ts: u64) -> CdcResult<u64> {
		self.ensure_open()?;
		if self.halted.contains_key(&table_id) {
			return Err(CdcError::TableHalted {
				table_id,
			});
		}

		let mut dispatch = self.dispatch.lock();
		let txns = self.grouper.drain_resolved(table_id, resolved_ts)?;
		if let Err(err) = self.check_commit_order(table_id, &txns) {
			self.halt(table_id, &err.to_string());
			return Err(err);
		}
		self.dispatch_txns(&mut dispatch, txns)?;
		Ok(dispatch.seq)
	}

	/// Flushes everything buffered. The returned ticket waits until all of it,
	/// and everything dispatched earlier, has been flushed.
	///
	/// Tables whose buffered txns violate commit order are halted and skipped.
	#[instrument(name = "cdc::pipeline::barrier", level = "debug", skip(self))]
	pub fn barrier(&self) -> CdcResult<BarrierTicket> {
		self.ensure_open()?;

		let mut dispatch = self.dispatch.lock();
		let mut txns = Vec::new();
		let mut table: Vec<SingleTableTxn> = Vec::new();
		// drain_all orders by table first, so each table is contiguous
		for txn in self.grouper.drain_all()? {
			if table.first().is_some_and(|first| first.table.table_id() != txn.table.table_id()) {
				self.accept_table(std::mem::take(&mut table), &mut txns);
			}
			table.push(txn);
		}
		self.accept_table(table, &mut txns);

		self.dispatch_txns(&mut dispatch, txns)?;
		debug!(seq = dispatch.seq, "barrier placed");
		Ok(BarrierTicket {
			seq: dispatch.seq,
			watermark: self.watermark.clone(),
		})
	}

	/// Applies a schema change once every row buffered before it is flushed.
	#[instrument(name = "cdc::pipeline::emit_ddl", level = "debug", skip(self, ddl), fields(commit_ts = ddl.commit_ts, query = %ddl.query))]
	pub fn emit_ddl(&self, ddl: DdlEvent) -> CdcResult<()> {
		self.barrier()?.wait()?;
		self.sink.apply_ddl(&ddl).inspect_err(|err| {
			error!(commit_ts = ddl.commit_ts, query = %ddl.query, "CDC sink failed to apply ddl: {err}");
		})
	}

	pub fn halted_tables(&self) -> BTreeSet<i64> {
		self.halted.iter().map(|entry| *entry.key()).collect()
	}

	/// Reason the table was halted, if it was.
	pub fn halt_reason(&self, table_id: i64) -> Option<String> {
		self.halted.get(&table_id).map(|entry| entry.value().clone())
	}

	/// Highest sequence such that every txn dispatched up to it is flushed.
	pub fn flushed_through(&self) -> u64 {
		self.watermark.done_until()
	}

	/// Rows buffered and not yet dispatched.
	pub fn buffered_rows(&self) -> usize {
		self.grouper.buffered_rows()
	}

	/// Waits for the workers to flush what is queued, then stops them.
	/// Rows still buffered are dropped.
	pub fn shutdown(&self) {
		if self.closed.swap(true, Ordering::SeqCst) {
			return;
		}

		let pool = self.dispatch.lock().pool.take();
		if let Some(mut pool) = pool {
			pool.shutdown();
		}
		self.watermark.close();

		let dropped = self.grouper.buffered_rows();
		if dropped > 0 {
			warn!(pipeline = %self.config.name, rows = dropped, "CDC pipeline shut down with buffered rows");
		}
		debug!(pipeline = %self.config.name, flushed_through = self.flushed_through(), "CDC pipeline stopped");
	}

	fn ensure_open(&self) -> CdcResult<()> {
		if self.closed.load(Ordering::SeqCst) {
			return Err(CdcError::Shutdown(self.config.name.clone()));
		}
		Ok(())
	}

	fn check_commit_order(&self, table_id: i64, txns: &[SingleTableTxn]) -> CdcResult<()> {
		let (Some(first), Some(last)) = (txns.first(), txns.last()) else {
			return Ok(());
		};
		if let Some(last_commit_ts) = self.last_commit_ts.get(&table_id).map(|entry| *entry.value()) {
			if first.commit_ts < last_commit_ts {
				error!(
					table_id,
					last_commit_ts,
					commit_ts = first.commit_ts,
					txn = %first.key(),
					"commit ts regression"
				);
				return Err(CdcError::CommitRegression {
					table_id,
					last_commit_ts,
					commit_ts: first.commit_ts,
				});
			}
		}
		self.last_commit_ts.insert(table_id, last.commit_ts);
		Ok(())
	}

	fn accept_table(&self, table: Vec<SingleTableTxn>, accepted: &mut Vec<SingleTableTxn>) {
		let Some(table_id) = table.first().map(|txn| txn.table.table_id()) else {
			return;
		};
		if self.halted.contains_key(&table_id) {
			return;
		}
		match self.check_commit_order(table_id, &table) {
			Ok(()) => accepted.extend(table),
			Err(err) => self.halt(table_id, &err.to_string()),
		}
	}

	fn dispatch_txns(&self, dispatch: &mut Dispatch, txns: Vec<SingleTableTxn>) -> CdcResult<()> {
		let Some(pool) = dispatch.pool.as_ref() else {
			return Err(CdcError::Shutdown(self.config.name.clone()));
		};

		for txn in txns {
			let seq = dispatch.seq + 1;
			self.watermark.begin(seq)?;
			dispatch.seq = seq;

			if let Err(err) = pool.dispatch(WorkItem {
				seq,
				txn,
			}) {
				// nobody will flush it, release waiters
				self.watermark.done(seq)?;
				return Err(err);
			}
			self.stats.record_dispatch();
		}
		Ok(())
	}

	fn halt(&self, table_id: i64, reason: &str) {
		if self.halted.insert(table_id, reason.to_string()).is_some() {
			return;
		}
		let dropped = self.grouper.drain_resolved(table_id, u64::MAX).map(|txns| txns.len()).unwrap_or_default();
		error!(table_id, dropped_txns = dropped, reason, "table halted");
	}
}

impl<S: TxnSink> Drop for CdcPipeline<S> {
	fn drop(&mut self) {
		self.shutdown();
	}
}

/// Handle returned by [`CdcPipeline::barrier`].
#[derive(Debug, Clone)]
pub struct BarrierTicket {
	seq: u64,
	watermark: Arc<WaterMark>,
}

impl BarrierTicket {
	/// Dispatch sequence the barrier waits for.
	pub fn sequence(&self) -> u64 {
		self.seq
	}

	pub fn is_reached(&self) -> bool {
		self.watermark.done_until() >= self.seq
	}

	/// Blocks until every txn up to the barrier has been flushed.
	pub fn wait(&self) -> CdcResult<()> {
		Ok(self.watermark.wait_for_mark(self.seq)?)
	}

	/// Returns whether the barrier was reached within `timeout`.
	pub fn wait_timeout(&self, timeout: Duration) -> CdcResult<bool> {
		Ok(self.watermark.wait_for_mark_timeout(self.seq, timeout)?)
	}
}
