// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Side channel for non-fatal data problems.
//!
//! Rule functions stay pure; batch functions accept a sink and report
//! what they skipped so the caller can log or display it.

use serde::Serialize;
use std::sync::Mutex;

/// A data problem that did not stop the computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A leave period had no usable start date.
    PeriodWithoutStart {
        /// Subject identifier.
        subject: String,
        /// The source text of the period.
        raw_text: String,
    },
    /// A leave period had neither an end date nor a duration.
    PeriodWithoutEnd {
        /// Subject identifier.
        subject: String,
        /// The source text of the period.
        raw_text: String,
    },
    /// Schedule text could not be resolved into a period.
    UnparsedSchedule {
        /// Subject identifier.
        subject: String,
        /// The source text.
        raw_text: String,
    },
    /// A CPF failed check-digit verification. It is still used as the
    /// subject identifier.
    InvalidCpf {
        /// Subject name.
        name: String,
        /// The CPF as normalized, eleven digits.
        cpf: String,
    },
    /// Sex was missing or unrecognized; male thresholds were applied.
    UnknownSexDefaulted {
        /// Subject identifier.
        subject: String,
    },
    /// A subject was left out of a retirement computation.
    SubjectSkipped {
        /// Subject identifier.
        subject: String,
        /// Why the subject was skipped.
        reason: String,
    },
}

/// Receiver for diagnostics.
pub trait DiagnosticSink {
    /// Records a single diagnostic.
    fn record(&self, diagnostic: Diagnostic);
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl DiagnosticSink for NoopDiagnostics {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Buffers diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn record(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}
