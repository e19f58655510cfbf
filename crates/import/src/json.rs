// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pre-built subject arrays handed over as JSON.

use crate::error::ImportError;
use licenca_domain::Subject;
use serde_json::Value;
use tracing::warn;

/// Reads an array of subjects from JSON.
///
/// A document that is valid JSON but not an array degrades to an empty
/// list with a warning. Array elements that do not describe a subject are
/// skipped with a warning.
///
/// # Errors
///
/// Returns `ImportError::InvalidJson` if the text is not JSON at all.
pub fn subjects_from_json(text: &str) -> Result<Vec<Subject>, ImportError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ImportError::InvalidJson {
        reason: e.to_string(),
    })?;

    let Value::Array(items) = value else {
        warn!("Expected an array of subjects; using an empty list");
        return Ok(Vec::new());
    };

    let mut subjects: Vec<Subject> = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Subject>(item) {
            Ok(subject) => subjects.push(subject),
            Err(e) => warn!(index = idx, error = %e, "Skipping malformed subject"),
        }
    }
    Ok(subjects)
}
