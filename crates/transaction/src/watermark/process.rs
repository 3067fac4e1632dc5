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
	cmp::Reverse,
	collections::{BinaryHeap, HashMap},
	sync::atomic::Ordering,
};

use crossbeam_channel::{Receiver, select};
use tracing::{debug, trace};

use super::{
	MAX_WAITERS,
	watermark::{Mark, Waiter, WatermarkInner},
};

#[derive(Default)]
struct MarkState {
	indices: BinaryHeap<Reverse<u64>>,
	pending: HashMap<u64, i64>,
	waiters: HashMap<u64, Vec<Waiter>>,
}

impl MarkState {
	fn park(&mut self, index: u64, waiter: Waiter) {
		let waiters = self.waiters.entry(index).or_default();
		waiters.retain(|waiter| !waiter.is_abandoned());
		waiters.push(waiter);

		if self.waiters.len() > MAX_WAITERS {
			self.waiters.retain(|_, waiters| {
				waiters.retain(|waiter| !waiter.is_abandoned());
				!waiters.is_empty()
			});
		}
	}

	fn waiting(&self) -> usize {
		self.waiters.values().map(Vec::len).sum()
	}
}

impl WatermarkInner {
	pub(crate) fn process(&self, shutdown: Receiver<()>) {
		debug!(name = %self.name, "watermark started");
		let mut state = MarkState::default();

		loop {
			select! {
				recv(shutdown) -> _ => break,
				recv(self.rx) -> mark => match mark {
					Ok(mark) => self.process_mark(&mut state, mark),
					Err(_) => break,
				},
			}
		}

		// dropping the senders wakes every remaining waiter
		let released = state.waiting();
		while self.rx.try_recv().is_ok() {}
		debug!(name = %self.name, released, "watermark stopped");
	}

	fn process_mark(&self, state: &mut MarkState, mark: Mark) {
		match mark.waiter {
			Some(waiter) => {
				if self.done_until.load(Ordering::SeqCst) < mark.index {
					state.park(mark.index, waiter);
					self.waiting.store(state.waiting(), Ordering::SeqCst);
				}
				// otherwise dropping the sender releases the waiter
			}
			None => self.process_one(state, mark.index, mark.done),
		}
	}

	fn process_one(&self, state: &mut MarkState, index: u64, done: bool) {
		if !state.pending.contains_key(&index) {
			state.indices.push(Reverse(index));
		}

		let delta = if done { -1 } else { 1 };
		*state.pending.entry(index).or_insert(0) += delta;

		let done_until = self.done_until.load(Ordering::SeqCst);
		if done_until > index {
			trace!(name = %self.name, index, done_until, "mark below watermark");
			return;
		}

		// advance through indices in order, stopping at the first one not done
		let mut until = done_until;
		while let Some(Reverse(min)) = state.indices.peek().copied() {
			if state.pending.get(&min).is_some_and(|count| *count > 0) {
				break;
			}
			// done may be called more often than begin; the index still pops
			state.indices.pop();
			state.pending.remove(&min);
			until = min;
		}

		if until == done_until {
			return;
		}

		self.done_until.store(until, Ordering::SeqCst);
		trace!(name = %self.name, done_until = until, "watermark advanced");

		state.waiters.retain(|&index, waiters| {
			if index > until {
				return true;
			}
			for waiter in waiters.drain(..) {
				waiter.release();
			}
			false
		});
		self.waiting.store(state.waiting(), Ordering::SeqCst);
	}
}
