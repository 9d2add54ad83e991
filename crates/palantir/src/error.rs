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

use thiserror::Error;

/// Errors raised while validating or traversing query results.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("column '{column}' not found in result header")]
    ColumnNotFound { column: String },
    #[error("duplicate column '{column}' in result header")]
    DuplicateColumn { column: String },
    #[error("row {row} has {found} cells, header has {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("no relation computed for column pair '{a}' -> '{b}'")]
    MissingRelation { a: String, b: String },
}

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("result data error: {0}")]
    Data(#[from] DataError),
    #[error("serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
