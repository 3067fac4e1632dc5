// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Durable, replayable records of row and schema changes.
//!
//! A [`RedoLog`] is encoded as a MessagePack map keyed by field name, so
//! readers tolerate fields added by newer writers. [`RedoWriter`] and
//! [`RedoReader`] frame records with a big-endian `u32` length prefix.

mod codec;
mod error;
mod frame;
mod log;
mod payload;

pub use codec::{decode, encode};
pub use error::{RedoError, Result};
pub use frame::{MAX_FRAME_SIZE, RedoReader, RedoWriter};
pub use log::{RedoLog, RedoLogType};
pub use payload::{RedoColumn, RedoDdlEvent, RedoRowChangedEvent, RedoRowHeader};
