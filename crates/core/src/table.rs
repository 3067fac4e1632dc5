// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Qualified identity of a replicated table.
///
/// Created once per schema generation and shared through an `Arc` by every
/// row event of that generation. Grouping compares `table_id` only, schema
/// and table names are for display and quoting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TableName {
	#[serde(rename = "db-name")]
	schema: String,
	#[serde(rename = "tbl-name")]
	table: String,
	#[serde(rename = "tbl-id")]
	table_id: i64,
	#[serde(rename = "is-partition", default)]
	is_partition: bool,
}

impl TableName {
	pub fn new(schema: impl Into<String>, table: impl Into<String>, table_id: i64) -> Self {
		Self {
			schema: schema.into(),
			table: table.into(),
			table_id,
			is_partition: false,
		}
	}

	pub fn partition(schema: impl Into<String>, table: impl Into<String>, table_id: i64) -> Self {
		Self {
			is_partition: true,
			..Self::new(schema, table, table_id)
		}
	}

	pub fn schema(&self) -> &str {
		&self.schema
	}

	pub fn table(&self) -> &str {
		&self.table
	}

	pub fn table_id(&self) -> i64 {
		self.table_id
	}

	pub fn is_partition(&self) -> bool {
		self.is_partition
	}

	/// Returns `` `schema`.`table` `` with embedded backticks doubled.
	pub fn quote_string(&self) -> String {
		format!("{}.{}", quote_name(&self.schema), quote_name(&self.table))
	}
}

impl Display for TableName {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.schema, self.table)
	}
}

fn quote_name(name: &str) -> String {
	format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		let table = TableName::new("shop", "orders", 42);
		assert_eq!(table.to_string(), "shop.orders");
	}

	#[test]
	fn test_quote_string() {
		let table = TableName::new("shop", "orders", 42);
		assert_eq!(table.quote_string(), "`shop`.`orders`");
	}

	#[test]
	fn test_quote_string_escapes_backticks() {
		let table = TableName::new("we`ird", "t``", 1);
		assert_eq!(table.quote_string(), "`we``ird`.`t`````");
	}

	#[test]
	fn test_partition() {
		let table = TableName::partition("shop", "orders_p0", 43);
		assert!(table.is_partition());
		assert_eq!(table.table_id(), 43);
		assert!(!TableName::new("shop", "orders", 42).is_partition());
	}

	#[test]
	fn test_serde_field_names() {
		let table = TableName::new("shop", "orders", 42);
		let json = serde_json::to_value(&table).unwrap();
		assert_eq!(json["db-name"], "shop");
		assert_eq!(json["tbl-name"], "orders");
		assert_eq!(json["tbl-id"], 42);
		assert_eq!(json["is-partition"], false);
	}
}
