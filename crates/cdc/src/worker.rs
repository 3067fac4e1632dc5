// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Sharded flush workers.
//!
//! Each worker owns a bounded queue and runs on its own thread. Txns are
//! routed by table id so every table is flushed by exactly one worker, in
//! dispatch order.

use std::{
	sync::Arc,
	thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, bounded};
use tidemark_transaction::{SingleTableTxn, WaterMark};
use tracing::{error, info, trace};
use xxhash_rust::xxh3::xxh3_64;

use crate::{
	config::PipelineConfig,
	error::{CdcError, CdcResult},
	sink::TxnSink,
	stats::PipelineStats,
};

/// Work item sent to a flush worker.
pub(crate) struct WorkItem {
	/// Dispatch sequence, marked done on the watermark once flushed.
	pub(crate) seq: u64,
	pub(crate) txn: SingleTableTxn,
}

pub(crate) struct WorkerPool {
	name: String,
	senders: Vec<Sender<WorkItem>>,
	handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
	pub(crate) fn spawn<S: TxnSink>(
		config: &PipelineConfig,
		sink: Arc<S>,
		watermark: Arc<WaterMark>,
		stats: Arc<PipelineStats>,
	) -> CdcResult<Self> {
		let mut pool = Self {
			name: config.name.clone(),
			senders: Vec::with_capacity(config.workers),
			handles: Vec::with_capacity(config.workers),
		};

		for id in 0..config.workers {
			let (sender, receiver) = bounded(config.queue_capacity);
			let worker = Worker {
				id,
				sink: sink.clone(),
				watermark: watermark.clone(),
				stats: stats.clone(),
			};

			let handle = thread::Builder::new()
				.name(format!("{}-worker-{id}", config.name))
				.spawn(move || {
					info!(worker = id, "CDC worker started");
					worker.run(receiver);
					info!(worker = id, "CDC worker stopped");
				})
				.map_err(|err| CdcError::Internal(format!("failed to spawn CDC worker {id}: {err}")))?;

			pool.senders.push(sender);
			pool.handles.push(handle);
		}

		Ok(pool)
	}

	pub(crate) fn worker_for(&self, table_id: i64) -> usize {
		(xxh3_64(&table_id.to_le_bytes()) % self.senders.len().max(1) as u64) as usize
	}

	/// Queues a txn on its table's worker, blocking while that queue is full.
	pub(crate) fn dispatch(&self, item: WorkItem) -> CdcResult<()> {
		let worker = self.worker_for(item.txn.table.table_id());
		let Some(sender) = self.senders.get(worker) else {
			return Err(CdcError::Shutdown(self.name.clone()));
		};
		sender.send(item).map_err(|_| CdcError::Internal(format!("CDC worker {worker} of {} is gone", self.name)))
	}

	/// Closes the queues and waits for the workers to flush what is queued.
	pub(crate) fn shutdown(&mut self) {
		self.senders.clear();
		for handle in self.handles.drain(..) {
			if handle.join().is_err() {
				error!(pipeline = %self.name, "CDC worker panicked");
			}
		}
	}
}

impl Drop for WorkerPool {
	fn drop(&mut self) {
		self.shutdown();
	}
}

struct Worker<S: TxnSink> {
	id: usize,
	sink: Arc<S>,
	watermark: Arc<WaterMark>,
	stats: Arc<PipelineStats>,
}

impl<S: TxnSink> Worker<S> {
	fn run(&self, receiver: Receiver<WorkItem>) {
		// exits once every sender is dropped and the queue is empty
		for item in receiver.iter() {
			self.process(item);
		}
	}

	fn process(&self, item: WorkItem) {
		let WorkItem {
			seq,
			mut txn,
		} = item;

		match self.sink.apply_txn(&txn) {
			Ok(()) => {
				self.stats.record_flush(txn.len());
				trace!(worker = self.id, seq, txn = %txn.key(), rows = txn.len(), "txn flushed");
			}
			Err(err) => {
				self.stats.record_failure();
				error!(worker = self.id, seq, txn = %txn.key(), "CDC sink failed to apply txn: {err}");
			}
		}

		// completion is signaled whether or not the sink succeeded
		if let Err(err) = txn.signal_completion() {
			error!(worker = self.id, seq, txn = %txn.key(), "failed to signal txn completion: {err}");
		}
		if let Err(err) = self.watermark.done(seq) {
			error!(worker = self.id, seq, "failed to advance watermark: {err}");
		}
	}
}

#[cfg(test)]
mod tests {
	use std::{sync::Arc, time::Duration};

	use tidemark_core::{Column, ColumnFlags, DdlEvent, RawRowChange, TableName};
	use tidemark_transaction::{SingleTableTxn, WaterMark};

	use super::*;
	use crate::sink::MemorySink;

	struct RejectingSink;

	impl TxnSink for RejectingSink {
		fn apply_txn(&self, _txn: &SingleTableTxn) -> CdcResult<()> {
			Err(CdcError::Sink("rejected".to_string()))
		}

		fn apply_ddl(&self, _ddl: &DdlEvent) -> CdcResult<()> {
			Ok(())
		}
	}

	fn sealed_txn(table_id: i64, commit_ts: u64) -> SingleTableTxn {
		let table = Arc::new(TableName::new("shop", "orders", table_id));
		let mut txn = SingleTableTxn::new(table.clone(), commit_ts - 1, commit_ts, 0);
		let row = RawRowChange::new(commit_ts - 1, commit_ts, table)
			.with_columns(vec![Column::new("id", 8, ColumnFlags::PRIMARY_KEY, 1i64)])
			.build()
			.unwrap();
		txn.append(row).unwrap();
		txn.seal().unwrap();
		txn
	}

	fn spawn<S: TxnSink>(sink: Arc<S>, workers: usize) -> (WorkerPool, Arc<WaterMark>, Arc<PipelineStats>) {
		let config = PipelineConfig::default().with_workers(workers).with_queue_capacity(4);
		let watermark = Arc::new(WaterMark::new("test").unwrap());
		let stats = Arc::new(PipelineStats::default());
		let pool = WorkerPool::spawn(&config, sink, watermark.clone(), stats.clone()).unwrap();
		(pool, watermark, stats)
	}

	#[test]
	fn test_routing_is_stable() {
		let (pool, _, _) = spawn(Arc::new(MemorySink::new()), 4);
		for table_id in 0..64 {
			let worker = pool.worker_for(table_id);
			assert!(worker < 4);
			assert_eq!(worker, pool.worker_for(table_id));
		}
	}

	#[test]
	fn test_worker_flushes_and_completes() {
		let sink = Arc::new(MemorySink::new());
		let (pool, watermark, stats) = spawn(sink.clone(), 2);

		let txn = sealed_txn(7, 10);
		let completion = txn.completion();
		watermark.begin(1).unwrap();
		pool.dispatch(WorkItem {
			seq: 1,
			txn,
		})
		.unwrap();

		assert!(completion.wait_timeout(Duration::from_secs(5)));
		watermark.wait_for_mark(1).unwrap();
		assert_eq!(sink.txns_of(7).len(), 1);
		assert_eq!(stats.flushed(), 1);
		assert_eq!(stats.rows(), 1);
	}

	#[test]
	fn test_sink_failure_still_completes() {
		let (pool, watermark, stats) = spawn(Arc::new(RejectingSink), 1);

		let txn = sealed_txn(7, 10);
		let completion = txn.completion();
		watermark.begin(1).unwrap();
		pool.dispatch(WorkItem {
			seq: 1,
			txn,
		})
		.unwrap();

		assert!(completion.wait_timeout(Duration::from_secs(5)));
		watermark.wait_for_mark(1).unwrap();
		assert_eq!(stats.failed(), 1);
		assert_eq!(stats.flushed(), 0);
	}

	#[test]
	fn test_shutdown_drains_queue() {
		let sink = Arc::new(MemorySink::new());
		let (mut pool, watermark, _) = spawn(sink.clone(), 1);

		for seq in 1..=3 {
			watermark.begin(seq).unwrap();
			pool.dispatch(WorkItem {
				seq,
				txn: sealed_txn(7, 10 + seq),
			})
			.unwrap();
		}
		pool.shutdown();

		assert_eq!(sink.txns_of(7).len(), 3);
		assert!(matches!(
			pool.dispatch(WorkItem {
				seq: 4,
				txn: sealed_txn(7, 20),
			}),
			Err(CdcError::Shutdown(_))
		));
	}
}
