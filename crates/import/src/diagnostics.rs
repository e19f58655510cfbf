// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use licenca_domain::{Diagnostic, DiagnosticSink, format_cpf};
use tracing::{debug, warn};

/// Forwards domain diagnostics to `tracing`.
///
/// Incomplete periods are routine in spreadsheet data and log at debug
/// level; invalid CPFs, skipped subjects and defaulted thresholds log as
/// warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn record(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::PeriodWithoutStart { subject, raw_text } => {
                debug!(%subject, %raw_text, "Period has no start date");
            }
            Diagnostic::PeriodWithoutEnd { subject, raw_text } => {
                debug!(%subject, %raw_text, "Period has neither end date nor duration");
            }
            Diagnostic::UnparsedSchedule { subject, raw_text } => {
                debug!(%subject, %raw_text, "Schedule text could not be interpreted");
            }
            Diagnostic::InvalidCpf { name, cpf } => {
                warn!(%name, cpf = %format_cpf(&cpf), "CPF check digits do not match");
            }
            Diagnostic::UnknownSexDefaulted { subject } => {
                warn!(%subject, "Sex unknown; applying male retirement thresholds");
            }
            Diagnostic::SubjectSkipped { subject, reason } => {
                warn!(%subject, %reason, "Subject skipped in retirement summary");
            }
        }
    }
}
