// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

// This file includes and modifies code from the skipdb project (https://github.com/al8n/skipdb),
// originally licensed under the Apache License, Version 2.0.
// Original copyright:
//   Copyright (c) 2024 Al Liu
//
// The original Apache License can be found at:
//   http://www.apache.org/licenses/LICENSE-2.0

use std::{
	fmt::{Debug, Formatter},
	sync::{
		Arc, Weak,
		atomic::{AtomicU64, AtomicUsize, Ordering},
	},
	thread::{self, JoinHandle},
	time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use tracing::debug;

use super::{MARK_CHANNEL_CAPACITY, WaterMarkError};

pub(crate) struct WatermarkInner {
	pub(crate) done_until: AtomicU64,
	pub(crate) last_index: AtomicU64,
	pub(crate) name: String,
	pub(crate) rx: Receiver<Mark>,
	/// Waiters currently parked on the processing thread.
	pub(crate) waiting: AtomicUsize,
}

pub(crate) struct Mark {
	pub(crate) index: u64,
	pub(crate) waiter: Option<Waiter>,
	pub(crate) done: bool,
}

/// Processing-side end of a wait. Dropping `tx` or sending on it wakes the
/// caller; `token` dies once the caller stops waiting.
pub(crate) struct Waiter {
	tx: Sender<()>,
	token: Weak<()>,
}

impl Waiter {
	pub(crate) fn is_abandoned(&self) -> bool {
		self.token.strong_count() == 0
	}

	pub(crate) fn release(self) {
		let _ = self.tx.send(());
	}
}

/// Caller-side end of a wait.
struct WaitHandle {
	rx: Receiver<()>,
	_token: Arc<()>,
}

/// Tracks the highest index below which every index is done.
///
/// An index k is done once `done(k)` has been called as many times as
/// `begin(k)`, and at least once. Indices are expected to be issued in
/// increasing order by a single producer.
pub struct WaterMark {
	inner: Arc<WatermarkInner>,
	tx: Sender<Mark>,
	shutdown: Sender<()>,
	handle: Mutex<Option<JoinHandle<()>>>,
}

impl WaterMark {
	pub fn new(name: impl Into<String>) -> Result<Self, WaterMarkError> {
		let name = name.into();
		let (tx, rx) = bounded(MARK_CHANNEL_CAPACITY);
		let (shutdown, shutdown_rx) = bounded(1);

		let inner = Arc::new(WatermarkInner {
			done_until: AtomicU64::new(0),
			last_index: AtomicU64::new(0),
			name: name.clone(),
			rx,
			waiting: AtomicUsize::new(0),
		});

		let processing = inner.clone();
		let handle = thread::Builder::new()
			.name(format!("watermark-{name}"))
			.spawn(move || processing.process(shutdown_rx))
			.map_err(|err| WaterMarkError::Spawn {
				name: name.clone(),
				reason: err.to_string(),
			})?;

		Ok(Self {
			inner,
			tx,
			shutdown,
			handle: Mutex::new(Some(handle)),
		})
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Registers `index` as in flight.
	pub fn begin(&self, index: u64) -> Result<(), WaterMarkError> {
		self.inner.last_index.store(index, Ordering::SeqCst);
		self.send(Mark {
			index,
			waiter: None,
			done: false,
		})
	}

	/// Marks a single index as done.
	pub fn done(&self, index: u64) -> Result<(), WaterMarkError> {
		self.send(Mark {
			index,
			waiter: None,
			done: true,
		})
	}

	/// Returns the maximum index such that all indices less than or equal to
	/// it are done.
	pub fn done_until(&self) -> u64 {
		self.inner.done_until.load(Ordering::SeqCst)
	}

	/// Last index passed to [`WaterMark::begin`].
	pub fn last_index(&self) -> u64 {
		self.inner.last_index.load(Ordering::SeqCst)
	}

	/// Blocks until `index` is done.
	pub fn wait_for_mark(&self, index: u64) -> Result<(), WaterMarkError> {
		let Some(handle) = self.register_waiter(index)? else {
			return Ok(());
		};
		// a dropped sender means the index is done or the watermark closed
		let _ = handle.rx.recv();
		self.check_done(index)
	}

	/// Like [`WaterMark::wait_for_mark`], giving up after `timeout`.
	/// Returns whether `index` is done. A timed out wait is discarded by the
	/// processing thread the next time it parks a waiter.
	pub fn wait_for_mark_timeout(&self, index: u64, timeout: Duration) -> Result<bool, WaterMarkError> {
		let Some(handle) = self.register_waiter(index)? else {
			return Ok(true);
		};
		match handle.rx.recv_timeout(timeout) {
			Err(RecvTimeoutError::Timeout) => Ok(self.done_until() >= index),
			Ok(()) | Err(RecvTimeoutError::Disconnected) => self.check_done(index).map(|_| true),
		}
	}

	/// Stops the processing thread. Pending waiters are released with
	/// [`WaterMarkError::Canceled`].
	pub fn close(&self) {
		let Some(handle) = self.handle.lock().take() else {
			return;
		};
		let _ = self.shutdown.send(());
		let _ = handle.join();
		// release waiters whose marks raced the shutdown
		while self.inner.rx.try_recv().is_ok() {}
		debug!(name = %self.inner.name, done_until = self.done_until(), "watermark closed");
	}

	fn register_waiter(&self, index: u64) -> Result<Option<WaitHandle>, WaterMarkError> {
		if self.done_until() >= index {
			return Ok(None);
		}
		let (tx, rx) = bounded(1);
		let token = Arc::new(());
		self.send(Mark {
			index,
			waiter: Some(Waiter {
				tx,
				token: Arc::downgrade(&token),
			}),
			done: false,
		})?;
		Ok(Some(WaitHandle {
			rx,
			_token: token,
		}))
	}

	fn check_done(&self, index: u64) -> Result<(), WaterMarkError> {
		if self.done_until() >= index {
			Ok(())
		} else {
			Err(WaterMarkError::Canceled(self.inner.name.clone()))
		}
	}

	fn send(&self, mark: Mark) -> Result<(), WaterMarkError> {
		if self.handle.lock().is_none() {
			return Err(WaterMarkError::ChannelClosed(self.inner.name.clone()));
		}
		self.tx.send(mark).map_err(|_| WaterMarkError::ChannelClosed(self.inner.name.clone()))
	}
}

impl Debug for WaterMark {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WaterMark")
			.field("name", &self.inner.name)
			.field("done_until", &self.done_until())
			.field("last_index", &self.last_index())
			.finish()
	}
}

impl Drop for WaterMark {
	fn drop(&mut self) {
		self.close();
	}
}
