// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Errors raised while building or inspecting change events.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
	/// The upstream record carried neither a pre image nor a post image.
	#[error("row change of {table} (start_ts {start_ts}, commit_ts {commit_ts}) has neither pre nor post columns")]
	EmptyRow {
		table: String,
		start_ts: u64,
		commit_ts: u64,
	},

	/// A row reached key extraction without any handle key column.
	#[error("cannot find handle key columns of {table}, event: {event}")]
	MissingHandleKey {
		table: String,
		event: String,
	},

	#[error("unknown ddl action type {0}")]
	UnknownActionType(u8),
}

pub type Result<T> = std::result::Result<T, CoreError>;
