// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	sync::Arc,
	time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
	#[error("completion barrier signaled more than once")]
	AlreadySignaled,
}

/// One-shot completion signal shared by a txn and the stages waiting on it.
///
/// Clones observe the same signal. Any number of threads may wait; exactly
/// one [`CompletionBarrier::signal`] succeeds.
#[derive(Clone, Default)]
pub struct CompletionBarrier(Arc<Inner>);

#[derive(Default)]
struct Inner {
	signaled: Mutex<bool>,
	cond: Condvar,
}

impl CompletionBarrier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn signal(&self) -> Result<(), BarrierError> {
		let mut signaled = self.0.signaled.lock();
		if *signaled {
			return Err(BarrierError::AlreadySignaled);
		}
		*signaled = true;
		self.0.cond.notify_all();
		Ok(())
	}

	pub fn is_signaled(&self) -> bool {
		*self.0.signaled.lock()
	}

	/// Blocks until the barrier is signaled.
	pub fn wait(&self) {
		let mut signaled = self.0.signaled.lock();
		while !*signaled {
			self.0.cond.wait(&mut signaled);
		}
	}

	/// Returns true if the barrier was signaled before `timeout` elapsed.
	pub fn wait_timeout(&self, timeout: Duration) -> bool {
		let deadline = Instant::now() + timeout;
		let mut signaled = self.0.signaled.lock();
		while !*signaled {
			if self.0.cond.wait_until(&mut signaled, deadline).timed_out() {
				return *signaled;
			}
		}
		true
	}
}

impl Debug for CompletionBarrier {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CompletionBarrier").field("signaled", &self.is_signaled()).finish()
	}
}

#[cfg(test)]
mod tests {
	use std::{
		sync::{
			Arc,
			atomic::{AtomicUsize, Ordering},
		},
		thread,
		time::Duration,
	};

	use super::*;

	#[test]
	fn test_signal_once() {
		let barrier = CompletionBarrier::new();
		assert!(!barrier.is_signaled());
		barrier.signal().unwrap();
		assert!(barrier.is_signaled());
		assert_eq!(barrier.signal(), Err(BarrierError::AlreadySignaled));
	}

	#[test]
	fn test_wait_after_signal_returns() {
		let barrier = CompletionBarrier::new();
		barrier.signal().unwrap();
		barrier.wait();
		assert!(barrier.wait_timeout(Duration::from_millis(1)));
	}

	#[test]
	fn test_wait_timeout_expires() {
		let barrier = CompletionBarrier::new();
		assert!(!barrier.wait_timeout(Duration::from_millis(20)));
	}

	#[test]
	fn test_releases_all_waiters() {
		let barrier = CompletionBarrier::new();
		let released = Arc::new(AtomicUsize::new(0));

		let handles: Vec<_> = (0..4)
			.map(|_| {
				let barrier = barrier.clone();
				let released = released.clone();
				thread::spawn(move || {
					barrier.wait();
					released.fetch_add(1, Ordering::SeqCst);
				})
			})
			.collect();

		thread::sleep(Duration::from_millis(20));
		assert_eq!(released.load(Ordering::SeqCst), 0);

		barrier.signal().unwrap();
		for handle in handles {
			handle.join().unwrap();
		}
		assert_eq!(released.load(Ordering::SeqCst), 4);
	}
}
