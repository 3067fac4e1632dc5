// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Visitor};

bitflags! {
	/// Semantic properties of a column. Every property is one independent bit.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct ColumnFlags: u64 {
		/// The column charset is binary
		const BINARY = 1 << 0;
		/// The column was selected as the handle key
		const HANDLE_KEY = 1 << 1;
		/// The column is a generated column
		const GENERATED = 1 << 2;
		/// The column is part of the primary key
		const PRIMARY_KEY = 1 << 3;
		/// The column is part of a unique key
		const UNIQUE_KEY = 1 << 4;
		/// The column is part of a non-unique key
		const MULTIPLE_KEY = 1 << 5;
		const NULLABLE = 1 << 6;
		/// The column stores an unsigned integer
		const UNSIGNED = 1 << 7;
	}
}

macro_rules! flag_accessors {
	($($flag:ident => $is:ident, $set:ident, $unset:ident;)*) => {
		impl ColumnFlags {
			$(
				pub fn $is(&self) -> bool {
					self.has(ColumnFlags::$flag)
				}

				pub fn $set(&mut self) {
					self.insert(ColumnFlags::$flag)
				}

				pub fn $unset(&mut self) {
					self.remove(ColumnFlags::$flag)
				}
			)*
		}
	};
}

// Setting and clearing arbitrary flag unions goes through the generated
// `insert`/`remove`.
impl ColumnFlags {
	/// True if all bits of `flag` are set. `flag` may be a union of several flags.
	pub fn has(&self, flag: ColumnFlags) -> bool {
		self.contains(flag)
	}

	/// True if any key-like bit is set: handle, primary, unique or multiple key.
	pub fn is_key(&self) -> bool {
		self.intersects(
			ColumnFlags::HANDLE_KEY
				| ColumnFlags::PRIMARY_KEY
				| ColumnFlags::UNIQUE_KEY
				| ColumnFlags::MULTIPLE_KEY,
		)
	}
}

flag_accessors! {
	BINARY => is_binary, set_binary, unset_binary;
	HANDLE_KEY => is_handle_key, set_handle_key, unset_handle_key;
	GENERATED => is_generated, set_generated, unset_generated;
	PRIMARY_KEY => is_primary_key, set_primary_key, unset_primary_key;
	UNIQUE_KEY => is_unique_key, set_unique_key, unset_unique_key;
	MULTIPLE_KEY => is_multiple_key, set_multiple_key, unset_multiple_key;
	NULLABLE => is_nullable, set_nullable, unset_nullable;
	UNSIGNED => is_unsigned, set_unsigned, unset_unsigned;
}

impl Serialize for ColumnFlags {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(self.bits())
	}
}

impl<'de> Deserialize<'de> for ColumnFlags {
	fn deserialize<D>(deserializer: D) -> Result<ColumnFlags, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct U64Visitor;

		impl Visitor<'_> for U64Visitor {
			type Value = ColumnFlags;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("column flag bits as an unsigned 64-bit number")
			}

			// unknown bits are retained
			fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
				Ok(ColumnFlags::from_bits_retain(value))
			}
		}

		deserializer.deserialize_u64(U64Visitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bit_positions() {
		assert_eq!(ColumnFlags::BINARY.bits(), 1);
		assert_eq!(ColumnFlags::HANDLE_KEY.bits(), 2);
		assert_eq!(ColumnFlags::PRIMARY_KEY.bits(), 8);
		assert_eq!(ColumnFlags::UNSIGNED.bits(), 128);
	}

	#[test]
	fn test_set_is_idempotent() {
		let mut flags = ColumnFlags::empty();
		flags.set_primary_key();
		flags.set_primary_key();
		assert!(flags.is_primary_key());
		assert_eq!(flags, ColumnFlags::PRIMARY_KEY);
	}

	#[test]
	fn test_unset_leaves_others() {
		let mut flags = ColumnFlags::HANDLE_KEY | ColumnFlags::NULLABLE | ColumnFlags::UNSIGNED;
		flags.unset_nullable();
		flags.unset_nullable();
		assert!(!flags.is_nullable());
		assert!(flags.is_handle_key());
		assert!(flags.is_unsigned());
	}

	#[test]
	fn test_has_requires_all_bits() {
		let flags = ColumnFlags::PRIMARY_KEY | ColumnFlags::HANDLE_KEY;
		assert!(flags.has(ColumnFlags::PRIMARY_KEY | ColumnFlags::HANDLE_KEY));
		assert!(!flags.has(ColumnFlags::PRIMARY_KEY | ColumnFlags::BINARY));
	}

	#[test]
	fn test_insert_remove_union() {
		let mut flags = ColumnFlags::empty();
		flags.insert(ColumnFlags::BINARY | ColumnFlags::GENERATED);
		flags.remove(ColumnFlags::BINARY);
		assert!(flags.is_generated());
		assert!(!flags.is_binary());
	}

	#[test]
	fn test_is_key() {
		assert!(ColumnFlags::MULTIPLE_KEY.is_key());
		assert!(!(ColumnFlags::BINARY | ColumnFlags::NULLABLE).is_key());
	}

	#[test]
	fn test_serialize_as_bits() {
		let flags = ColumnFlags::BINARY | ColumnFlags::UNIQUE_KEY;
		assert_eq!(serde_json::to_string(&flags).unwrap(), "17");
		let decoded: ColumnFlags = serde_json::from_str("17").unwrap();
		assert_eq!(decoded, flags);
	}

	#[test]
	fn test_unknown_bits_survive() {
		let decoded: ColumnFlags = serde_json::from_str("1024").unwrap();
		assert_eq!(decoded.bits(), 1024);
	}
}
