// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Change events produced by the capture side of the pipeline.
//!
//! A [`RowChangedEvent`] carries one row mutation together with the table it
//! belongs to. A [`DdlEvent`] carries one schema change, built from the schema
//! collaborator's job description.

pub mod column;
pub mod ddl;
pub mod error;
pub mod row;
pub mod table;

pub use column::{Column, ColumnInfo};
pub use ddl::{ActionType, DdlEvent, SchemaColumn, SchemaJob, SchemaTable, SimpleTableInfo, TableInfo};
pub use error::{CoreError, Result};
pub use row::{RawRowChange, RowChangedEvent, RowKind};
pub use table::TableName;
pub use tidemark_type::{ColumnFlags, Value};
