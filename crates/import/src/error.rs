// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors raised while turning spreadsheet or JSON input into subjects.
///
/// Malformed cells are not errors; they surface as missing values on the
/// resulting subject. These variants cover input that cannot be read at
/// all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    /// The CSV text could not be tokenized.
    #[error("Invalid CSV format: {reason}")]
    InvalidCsvFormat {
        /// Description of the failure.
        reason: String,
    },
    /// No header matched any alias of a required column.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// The logical column name.
        column: &'static str,
    },
    /// The JSON text is not valid JSON.
    #[error("Invalid JSON: {reason}")]
    InvalidJson {
        /// Description of the failure.
        reason: String,
    },
}
