// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum WaterMarkError {
	/// The watermark was closed before the awaited index was done.
	#[error("watermark {0}: canceled")]
	Canceled(String),

	#[error("watermark {0}: channel closed")]
	ChannelClosed(String),

	#[error("watermark {name}: failed to spawn processing thread: {reason}")]
	Spawn {
		name: String,
		reason: String,
	},
}
