// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Palantir Project
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tabular SPARQL query results: a projection header and positionally
/// aligned string rows. Cells stay untyped; numeric or temporal meaning is
/// a matter of interpretation downstream, not of storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResults {
    pub header: Vec<String>,
    pub data: Vec<Vec<String>>,
}

impl QueryResults {
    /// Builds a result set, rejecting duplicate header names and rows whose
    /// length disagrees with the header.
    pub fn new(header: Vec<String>, data: Vec<Vec<String>>) -> DataResult<Self> {
        let results = Self { header, data };
        results.validate()?;
        Ok(results)
    }

    pub fn validate(&self) -> DataResult<()> {
        let mut seen = HashSet::new();
        for column in &self.header {
            if !seen.insert(column.as_str()) {
                return Err(DataError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }
        for (row, cells) in self.data.iter().enumerate() {
            if cells.len() != self.header.len() {
                return Err(DataError::RowLengthMismatch {
                    row,
                    expected: self.header.len(),
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }

    pub fn column_index(&self, column: &str) -> DataResult<usize> {
        self.header
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| DataError::ColumnNotFound {
                column: column.to_string(),
            })
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First non-empty cell of the given column, scanning rows in order.
    pub fn first_non_empty_value(&self, column: &str) -> DataResult<Option<&str>> {
        let index = self.column_index(column)?;
        Ok(self
            .data
            .iter()
            .map(|row| row[index].as_str())
            .find(|value| !value.is_empty()))
    }
}

/// Per-column semantic roles, as classified upstream by query analysis. A
/// column may carry several roles at once; order within a list is
/// meaningful (leading entries are the primary axes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableCategories {
    #[serde(default)]
    pub key: Vec<String>,
    #[serde(default)]
    pub scalar: Vec<String>,
    #[serde(default)]
    pub numeric: Vec<String>,
    #[serde(default)]
    pub temporal: Vec<String>,
    #[serde(default)]
    pub lexical: Vec<String>,
    #[serde(default)]
    pub date: Vec<String>,
    #[serde(default)]
    pub geographical: Vec<String>,
    #[serde(default)]
    pub object: Vec<String>,
}

impl VariableCategories {
    /// Every listed variable must exist verbatim in the result header.
    pub fn validate(&self, results: &QueryResults) -> DataResult<()> {
        for column in self.all_columns() {
            results.column_index(column)?;
        }
        Ok(())
    }

    fn all_columns(&self) -> impl Iterator<Item = &String> {
        self.key
            .iter()
            .chain(&self.scalar)
            .chain(&self.numeric)
            .chain(&self.temporal)
            .chain(&self.lexical)
            .chain(&self.date)
            .chain(&self.geographical)
            .chain(&self.object)
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|name| name == column)
    }

    pub fn is_lexical(&self, column: &str) -> bool {
        self.lexical.iter().any(|name| name == column)
    }

    pub fn is_temporal(&self, column: &str) -> bool {
        self.temporal.iter().any(|name| name == column)
    }
}
