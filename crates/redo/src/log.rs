// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize, Serializer};
use tidemark_core::{DdlEvent, RowChangedEvent};
use tracing::error;

use crate::{
	error::RedoError,
	payload::{RedoDdlEvent, RedoRowChangedEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RedoLogType {
	Row = 1,
	Ddl = 2,
}

impl RedoLogType {
	pub fn code(self) -> u8 {
		self as u8
	}
}

impl TryFrom<u8> for RedoLogType {
	type Error = RedoError;

	fn try_from(code: u8) -> Result<Self, Self::Error> {
		match code {
			1 => Ok(RedoLogType::Row),
			2 => Ok(RedoLogType::Ddl),
			other => Err(RedoError::UnknownType(other)),
		}
	}
}

impl Display for RedoLogType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			RedoLogType::Row => f.write_str("row"),
			RedoLogType::Ddl => f.write_str("ddl"),
		}
	}
}

/// A single redo record, holding either a row change or a schema change.
///
/// On the wire the record is a map `{type, row, ddl}` with exactly the
/// payload matching `type` present. Decoding rejects any other shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RedoRecord")]
pub enum RedoLog {
	Row(RedoRowChangedEvent),
	Ddl(RedoDdlEvent),
}

impl RedoLog {
	pub fn from_row(event: &RowChangedEvent) -> Self {
		RedoLog::Row(event.into())
	}

	pub fn from_ddl(event: &DdlEvent) -> Self {
		RedoLog::Ddl(event.into())
	}

	pub fn log_type(&self) -> RedoLogType {
		match self {
			RedoLog::Row(_) => RedoLogType::Row,
			RedoLog::Ddl(_) => RedoLogType::Ddl,
		}
	}

	pub fn commit_ts(&self) -> u64 {
		match self {
			RedoLog::Row(row) => row.row.commit_ts,
			RedoLog::Ddl(ddl) => ddl.ddl.commit_ts,
		}
	}

	fn record(&self) -> RedoRecordRef<'_> {
		match self {
			RedoLog::Row(row) => RedoRecordRef {
				r#type: RedoLogType::Row.code(),
				row: Some(row),
				ddl: None,
			},
			RedoLog::Ddl(ddl) => RedoRecordRef {
				r#type: RedoLogType::Ddl.code(),
				row: None,
				ddl: Some(ddl),
			},
		}
	}
}

impl Serialize for RedoLog {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.record().serialize(serializer)
	}
}

#[derive(Serialize)]
struct RedoRecordRef<'a> {
	#[serde(rename = "type")]
	r#type: u8,
	row: Option<&'a RedoRowChangedEvent>,
	ddl: Option<&'a RedoDdlEvent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RedoRecord {
	#[serde(rename = "type")]
	r#type: u8,
	#[serde(default)]
	row: Option<RedoRowChangedEvent>,
	#[serde(default)]
	ddl: Option<RedoDdlEvent>,
}

impl TryFrom<RedoRecord> for RedoLog {
	type Error = RedoError;

	fn try_from(record: RedoRecord) -> Result<Self, Self::Error> {
		let kind = RedoLogType::try_from(record.r#type)?;
		let malformed = |reason| {
			error!(kind = record.r#type, reason, "malformed redo log");
			RedoError::Malformed {
				kind: record.r#type,
				reason,
			}
		};
		match (kind, record.row, record.ddl) {
			(RedoLogType::Row, Some(row), None) => Ok(RedoLog::Row(row)),
			(RedoLogType::Ddl, None, Some(ddl)) => Ok(RedoLog::Ddl(ddl)),
			(_, Some(_), Some(_)) => Err(malformed("both payloads present")),
			(_, None, None) => Err(malformed("no payload present")),
			(RedoLogType::Row, None, Some(_)) => Err(malformed("ddl payload in row log")),
			(RedoLogType::Ddl, Some(_), None) => Err(malformed("row payload in ddl log")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_type_codes() {
		assert_eq!(RedoLogType::Row.code(), 1);
		assert_eq!(RedoLogType::Ddl.code(), 2);
		assert_eq!(RedoLogType::try_from(2).unwrap(), RedoLogType::Ddl);
		assert!(matches!(RedoLogType::try_from(0), Err(RedoError::UnknownType(0))));
	}

	#[test]
	fn test_record_without_payload() {
		let record = RedoRecord {
			r#type: 1,
			row: None,
			ddl: None,
		};
		assert!(matches!(
			RedoLog::try_from(record),
			Err(RedoError::Malformed {
				kind: 1,
				..
			})
		));
	}

	#[test]
	fn test_record_with_wrong_payload() {
		let record = RedoRecord {
			r#type: 1,
			row: None,
			ddl: Some(RedoDdlEvent::from(&DdlEvent::default())),
		};
		let err = RedoLog::try_from(record).unwrap_err();
		assert_eq!(err.to_string(), "malformed redo log of type 1: ddl payload in row log");
	}

	#[test]
	fn test_ddl_record() {
		let log = RedoLog::from_ddl(&DdlEvent {
			commit_ts: 9,
			..DdlEvent::default()
		});
		assert_eq!(log.log_type(), RedoLogType::Ddl);
		assert_eq!(log.commit_ts(), 9);

		let record = log.record();
		assert_eq!(record.r#type, 2);
		assert!(record.row.is_none());
		assert!(record.ddl.is_some());
	}
}
