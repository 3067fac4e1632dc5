// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the pipeline and its workers.
#[derive(Debug, Default)]
pub struct PipelineStats {
	dispatched: AtomicU64,
	flushed: AtomicU64,
	failed: AtomicU64,
	rows: AtomicU64,
}

impl PipelineStats {
	/// Txns handed to workers.
	pub fn dispatched(&self) -> u64 {
		self.dispatched.load(Ordering::Relaxed)
	}

	/// Txns the sink applied successfully.
	pub fn flushed(&self) -> u64 {
		self.flushed.load(Ordering::Relaxed)
	}

	/// Txns the sink rejected. They are still completed.
	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	/// Rows of successfully flushed txns.
	pub fn rows(&self) -> u64 {
		self.rows.load(Ordering::Relaxed)
	}

	pub(crate) fn record_dispatch(&self) {
		self.dispatched.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_flush(&self, rows: usize) {
		self.flushed.fetch_add(1, Ordering::Relaxed);
		self.rows.fetch_add(rows as u64, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failed.fetch_add(1, Ordering::Relaxed);
	}
}
