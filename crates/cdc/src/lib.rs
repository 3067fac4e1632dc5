// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Change data capture pipeline.
//!
//! Row events flow `emit -> group -> resolve/barrier -> worker -> sink`.
//! See [`CdcPipeline`].

pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod stats;
mod worker;

pub use config::PipelineConfig;
pub use error::{CdcError, CdcResult};
pub use pipeline::{BarrierTicket, CdcPipeline};
pub use sink::{MemorySink, RedoSink, SinkEvent, TxnSink};
pub use stats::PipelineStats;
