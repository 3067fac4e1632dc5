// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Transaction-consistent batching of row events.
//!
//! Row events are grouped by `(table, start_ts, commit_ts)` into
//! [`SingleTableTxn`]s by the [`TxnGrouper`]. Each txn carries a one-shot
//! [`CompletionBarrier`] its consuming worker signals once the rows are
//! durably applied; the [`WaterMark`] turns per-txn completion into a
//! flushed-through sequence producers can wait on.

pub mod barrier;
pub mod error;
pub mod grouper;
pub mod txn;
pub mod watermark;

pub use barrier::{BarrierError, CompletionBarrier};
pub use error::{Result, TxnError};
pub use grouper::TxnGrouper;
pub use txn::{SingleTableTxn, TxnKey, TxnState};
pub use watermark::{WaterMark, WaterMarkError};
