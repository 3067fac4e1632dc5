// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use crate::error::{CdcError, CdcResult};

/// Configuration for a CDC pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineConfig {
	/// Number of flush workers; each table is pinned to one of them
	pub workers: usize,
	/// Capacity of each worker queue, in txns
	pub queue_capacity: usize,
	/// Prefix of worker thread names
	pub name: String,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			workers: 4,
			queue_capacity: 1024,
			name: "cdc".to_string(),
		}
	}
}

impl PipelineConfig {
	pub fn new(name: impl Into<String>, workers: usize, queue_capacity: usize) -> Self {
		Self {
			workers,
			queue_capacity,
			name: name.into(),
		}
	}

	pub fn with_workers(mut self, workers: usize) -> Self {
		self.workers = workers;
		self
	}

	pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
		self.queue_capacity = queue_capacity;
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn validate(&self) -> CdcResult<()> {
		if self.workers == 0 {
			return Err(CdcError::Config("workers must be at least 1".to_string()));
		}
		if self.queue_capacity == 0 {
			return Err(CdcError::Config("queue-capacity must be at least 1".to_string()));
		}
		Ok(())
	}
}
