// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use crate::error::CoreError;

macro_rules! action_types {
	($($variant:ident = $code:literal => $name:literal,)*) => {
		/// Kind of schema change carried by a job. Codes follow the upstream catalog.
		#[repr(u8)]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
		pub enum ActionType {
			#[default]
			$($variant = $code,)*
		}

		impl ActionType {
			pub fn code(self) -> u8 {
				self as u8
			}

			pub fn as_str(&self) -> &'static str {
				match self {
					$(ActionType::$variant => $name,)*
				}
			}
		}

		impl TryFrom<u8> for ActionType {
			type Error = CoreError;

			fn try_from(code: u8) -> Result<Self, Self::Error> {
				match code {
					$($code => Ok(ActionType::$variant),)*
					other => Err(CoreError::UnknownActionType(other)),
				}
			}
		}
	};
}

action_types! {
	None = 0 => "none",
	CreateSchema = 1 => "create schema",
	DropSchema = 2 => "drop schema",
	CreateTable = 3 => "create table",
	DropTable = 4 => "drop table",
	AddColumn = 5 => "add column",
	DropColumn = 6 => "drop column",
	AddIndex = 7 => "add index",
	DropIndex = 8 => "drop index",
	AddForeignKey = 9 => "add foreign key",
	DropForeignKey = 10 => "drop foreign key",
	TruncateTable = 11 => "truncate table",
	ModifyColumn = 12 => "modify column",
	RebaseAutoId = 13 => "rebase auto_increment ID",
	RenameTable = 14 => "rename table",
	SetDefaultValue = 15 => "set default value",
	ShardRowId = 16 => "shard row ID",
	ModifyTableComment = 17 => "modify table comment",
	RenameIndex = 18 => "rename index",
	AddTablePartition = 19 => "add partition",
	DropTablePartition = 20 => "drop partition",
	CreateView = 21 => "create view",
	ModifyTableCharsetAndCollate = 22 => "modify table charset and collate",
	TruncateTablePartition = 23 => "truncate partition",
	DropView = 24 => "drop view",
	RecoverTable = 25 => "recover table",
	ModifySchemaCharsetAndCollate = 26 => "modify schema charset and collate",
	LockTable = 27 => "lock table",
	UnlockTable = 28 => "unlock table",
	RepairTable = 29 => "repair table",
	SetTiFlashReplica = 30 => "set tiflash replica",
	UpdateTiFlashReplicaStatus = 31 => "update tiflash replica status",
	AddPrimaryKey = 32 => "add primary key",
	DropPrimaryKey = 33 => "drop primary key",
	CreateSequence = 34 => "create sequence",
	AlterSequence = 35 => "alter sequence",
	DropSequence = 36 => "drop sequence",
	AddColumns = 37 => "add multi-columns",
	DropColumns = 38 => "drop multi-columns",
	ModifyTableAutoIdCache = 39 => "modify auto id cache",
	RebaseAutoRandomBase = 40 => "rebase auto_random ID",
	AlterIndexVisibility = 41 => "alter index visibility",
	ExchangeTablePartition = 42 => "exchange partition",
	AddCheckConstraint = 43 => "add check constraint",
	DropCheckConstraint = 44 => "drop check constraint",
	AlterCheckConstraint = 45 => "alter check constraint",
	AlterTableAlterPartition = 46 => "alter partition",
	RenameTables = 47 => "rename tables",
}

impl ActionType {
	/// Actions that touch several tables at once, so no single post-change
	/// table identity exists.
	pub fn is_multi_table(&self) -> bool {
		matches!(self, ActionType::RenameTables)
	}
}

impl Display for ActionType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_codes() {
		assert_eq!(ActionType::None.code(), 0);
		assert_eq!(ActionType::CreateTable.code(), 3);
		assert_eq!(ActionType::RenameTables.code(), 47);
	}

	#[test]
	fn test_try_from_code() {
		for code in 0..=47u8 {
			assert_eq!(ActionType::try_from(code).unwrap().code(), code);
		}
		assert_eq!(ActionType::try_from(48), Err(CoreError::UnknownActionType(48)));
	}

	#[test]
	fn test_multi_table() {
		assert!(ActionType::RenameTables.is_multi_table());
		assert!(!ActionType::RenameTable.is_multi_table());
	}

	#[test]
	fn test_display() {
		assert_eq!(ActionType::AddColumn.to_string(), "add column");
	}
}
