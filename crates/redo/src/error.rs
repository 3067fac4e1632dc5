// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tidemark_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum RedoError {
	#[error("unknown redo log type {0}")]
	UnknownType(u8),

	/// The envelope's payloads disagree with its type.
	#[error("malformed redo log of type {kind}: {reason}")]
	Malformed {
		kind: u8,
		reason: &'static str,
	},

	#[error("failed to encode redo log: {0}")]
	Encode(#[from] rmp_serde::encode::Error),

	#[error("failed to decode redo log: {0}")]
	Decode(#[from] rmp_serde::decode::Error),

	#[error("redo frame of {size} bytes exceeds the limit of {limit} bytes")]
	FrameTooLarge {
		size: usize,
		limit: usize,
	},

	#[error("truncated redo frame: expected {expected} bytes, got {actual}")]
	Truncated {
		expected: usize,
		actual: usize,
	},

	#[error("redo io error: {0}")]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, RedoError>;
