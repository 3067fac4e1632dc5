// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::io::{ErrorKind, Read, Write};

use tracing::{error, trace};

use crate::{
	codec::{decode, encode},
	error::{RedoError, Result},
	log::RedoLog,
};

/// Largest payload a single frame may carry.
pub const MAX_FRAME_SIZE: usize = 64 << 20;

const HEADER_SIZE: usize = 4;

/// Appends framed redo records to a byte sink.
#[derive(Debug)]
pub struct RedoWriter<W: Write> {
	inner: W,
	records: u64,
	bytes: u64,
}

impl<W: Write> RedoWriter<W> {
	pub fn new(inner: W) -> Self {
		Self {
			inner,
			records: 0,
			bytes: 0,
		}
	}

	pub fn write(&mut self, log: &RedoLog) -> Result<()> {
		self.write_batch(std::slice::from_ref(log))
	}

	/// Frames every record before touching the output, so either the whole
	/// batch is handed to the writer in one call or nothing is.
	pub fn write_batch(&mut self, logs: &[RedoLog]) -> Result<()> {
		let mut buf = Vec::new();
		for log in logs {
			encode_frame(log, &mut buf)?;
		}
		if buf.is_empty() {
			return Ok(());
		}

		self.inner.write_all(&buf)?;

		self.records += logs.len() as u64;
		self.bytes += buf.len() as u64;
		trace!(records = logs.len(), size = buf.len(), "redo records written");
		Ok(())
	}

	pub fn flush(&mut self) -> Result<()> {
		Ok(self.inner.flush()?)
	}

	pub fn records_written(&self) -> u64 {
		self.records
	}

	pub fn bytes_written(&self) -> u64 {
		self.bytes
	}

	pub fn get_ref(&self) -> &W {
		&self.inner
	}

	pub fn into_inner(self) -> W {
		self.inner
	}
}

/// Reads framed redo records until a clean end of input.
///
/// The iterator stops after the first error.
#[derive(Debug)]
pub struct RedoReader<R: Read> {
	inner: R,
	failed: bool,
}

impl<R: Read> RedoReader<R> {
	pub fn new(inner: R) -> Self {
		Self {
			inner,
			failed: false,
		}
	}

	/// Returns `Ok(None)` at end of input on a frame boundary.
	pub fn next_record(&mut self) -> Result<Option<RedoLog>> {
		let mut header = [0u8; HEADER_SIZE];
		let read = read_full(&mut self.inner, &mut header)?;
		if read == 0 {
			return Ok(None);
		}
		if read < HEADER_SIZE {
			return Err(RedoError::Truncated {
				expected: HEADER_SIZE,
				actual: read,
			});
		}

		let size = u32::from_be_bytes(header) as usize;
		if size > MAX_FRAME_SIZE {
			return Err(RedoError::FrameTooLarge {
				size,
				limit: MAX_FRAME_SIZE,
			});
		}

		let mut payload = vec![0u8; size];
		let read = read_full(&mut self.inner, &mut payload)?;
		if read < size {
			return Err(RedoError::Truncated {
				expected: size,
				actual: read,
			});
		}

		decode(&payload).map(Some)
	}
}

impl<R: Read> Iterator for RedoReader<R> {
	type Item = Result<RedoLog>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed {
			return None;
		}
		let next = self.next_record().transpose();
		if matches!(next, Some(Err(_))) {
			self.failed = true;
		}
		next
	}
}

/// Appends `log` as one length-prefixed frame to `buf`.
fn encode_frame(log: &RedoLog, buf: &mut Vec<u8>) -> Result<()> {
	let payload = encode(log)?;
	if payload.len() > MAX_FRAME_SIZE {
		error!(size = payload.len(), commit_ts = log.commit_ts(), "redo record exceeds frame limit");
		return Err(RedoError::FrameTooLarge {
			size: payload.len(),
			limit: MAX_FRAME_SIZE,
		});
	}

	buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
	buf.extend_from_slice(&payload);
	trace!(kind = %log.log_type(), commit_ts = log.commit_ts(), size = payload.len(), "redo record framed");
	Ok(())
}

/// Fills `buf` as far as the input allows, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
	let mut filled = 0;
	while filled < buf.len() {
		match reader.read(&mut buf[filled..]) {
			Ok(0) => break,
			Ok(n) => filled += n,
			Err(err) if err.kind() == ErrorKind::Interrupted => continue,
			Err(err) => return Err(err.into()),
		}
	}
	Ok(filled)
}
