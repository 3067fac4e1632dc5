// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	thread,
	time::Duration,
};

use tidemark_testing::{init_tracing, util::wait::wait_for};
use tidemark_transaction::WaterMark;

/// Indices completed in reverse order only advance once the lowest is done.
#[test]
fn test_watermark_reverse_completion() {
	init_tracing();
	let watermark = WaterMark::new("reverse").unwrap();

	const NUM_INDICES: u64 = 2_000;
	for index in 1..=NUM_INDICES {
		watermark.begin(index).unwrap();
	}
	for index in (2..=NUM_INDICES).rev() {
		watermark.done(index).unwrap();
	}

	assert!(!watermark.wait_for_mark_timeout(NUM_INDICES, Duration::from_millis(50)).unwrap());
	assert_eq!(watermark.done_until(), 0);

	watermark.done(1).unwrap();
	watermark.wait_for_mark(NUM_INDICES).unwrap();
	assert_eq!(watermark.done_until(), NUM_INDICES);
}

/// Many threads completing disjoint indices while others wait on them.
#[test]
fn test_watermark_concurrent_done_and_wait() {
	init_tracing();
	let watermark = Arc::new(WaterMark::new("concurrent").unwrap());

	const NUM_THREADS: u64 = 8;
	const PER_THREAD: u64 = 250;
	const NUM_INDICES: u64 = NUM_THREADS * PER_THREAD;

	for index in 1..=NUM_INDICES {
		watermark.begin(index).unwrap();
	}

	let released = Arc::new(AtomicUsize::new(0));
	let waiters: Vec<_> = (1..=NUM_THREADS)
		.map(|i| {
			let watermark = watermark.clone();
			let released = released.clone();
			thread::spawn(move || {
				let target = i * PER_THREAD;
				if watermark.wait_for_mark_timeout(target, Duration::from_secs(10)).unwrap() {
					released.fetch_add(1, Ordering::SeqCst);
				}
			})
		})
		.collect();

	let workers: Vec<_> = (0..NUM_THREADS)
		.map(|t| {
			let watermark = watermark.clone();
			thread::spawn(move || {
				// each worker owns the indices congruent to t
				let mut index = t + 1;
				while index <= NUM_INDICES {
					watermark.done(index).unwrap();
					index += NUM_THREADS;
				}
			})
		})
		.collect();

	for worker in workers {
		worker.join().unwrap();
	}
	for waiter in waiters {
		waiter.join().unwrap();
	}

	assert_eq!(released.load(Ordering::SeqCst), NUM_THREADS as usize);
	wait_for(|| watermark.done_until() == NUM_INDICES, "watermark should reach the last index");
}

/// Calling done more often than begin must not stall the watermark.
#[test]
fn test_watermark_extra_done() {
	init_tracing();
	let watermark = WaterMark::new("extra_done").unwrap();

	watermark.begin(1).unwrap();
	watermark.done(1).unwrap();
	watermark.done(1).unwrap();
	watermark.begin(2).unwrap();
	watermark.done(2).unwrap();

	watermark.wait_for_mark(2).unwrap();
	assert_eq!(watermark.done_until(), 2);
}

/// An index begun twice needs two dones.
#[test]
fn test_watermark_counts_begins() {
	init_tracing();
	let watermark = WaterMark::new("counts").unwrap();

	watermark.begin(1).unwrap();
	watermark.begin(1).unwrap();
	watermark.done(1).unwrap();
	assert!(!watermark.wait_for_mark_timeout(1, Duration::from_millis(50)).unwrap());

	watermark.done(1).unwrap();
	watermark.wait_for_mark(1).unwrap();
}
