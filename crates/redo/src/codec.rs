// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::Result,
	log::{RedoLog, RedoRecord},
};

/// Encodes a record as a MessagePack map keyed by field name.
pub fn encode(log: &RedoLog) -> Result<Vec<u8>> {
	Ok(rmp_serde::to_vec_named(log)?)
}

pub fn decode(bytes: &[u8]) -> Result<RedoLog> {
	let record: RedoRecord = rmp_serde::from_slice(bytes)?;
	RedoLog::try_from(record)
}
