// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ImportError, load_subjects, subject_from_row};
use licenca_domain::{
    CollectingDiagnostics, Diagnostic, FieldRow, NoopDiagnostics, Sex, SourceKind, Subject,
};
use time::macros::date;

pub(super) const SUBJECT_SHEET: &str = "\u{feff}SERVIDOR;CPF;DATA DE NASCIMENTO;DATA DE ADMISSÃO;SEXO;CARGO;LOTAÇÃO;Cronograma
Ana Souza;529.982.247-25;15/06/1960;15/06/1995;F;Analista;SES/DIR;jan/2025 - mar/2025
Ana Souza;52998224725;;;;;;15/06/2025
Bruno Lima;;01/01/1970;01/01/2000;MASCULINO;Técnico;SEEC;3 meses a partir de 01/03/2024
";

#[test]
fn test_load_subjects_groups_rows_by_id() {
    let sink: CollectingDiagnostics = CollectingDiagnostics::new();
    let subjects: Vec<Subject> = load_subjects(SUBJECT_SHEET, None, 3, &sink).unwrap();
    assert_eq!(subjects.len(), 2);
    assert!(sink.events().is_empty());

    let ana: &Subject = &subjects[0];
    assert_eq!(ana.name, "Ana Souza");
    assert_eq!(ana.cpf.as_deref(), Some("52998224725"));
    assert_eq!(ana.birth_date, Some(date!(1960 - 06 - 15)));
    assert_eq!(ana.admission_date, Some(date!(1995 - 06 - 15)));
    assert_eq!(ana.sex, Sex::Female);
    assert_eq!(ana.role, "Analista");
    assert_eq!(ana.top_unit(), "SES");
    assert_eq!(ana.periods.len(), 2);
    assert_eq!(ana.periods[0].start, Some(date!(2025 - 01 - 01)));
    assert_eq!(ana.periods[0].source_kind, SourceKind::ExplicitRange);
    assert_eq!(ana.periods[1].start, Some(date!(2025 - 06 - 15)));
    assert_eq!(ana.periods[1].end, Some(date!(2025 - 09 - 12)));

    let bruno: &Subject = &subjects[1];
    assert_eq!(bruno.id(), "BRUNO LIMA");
    assert_eq!(bruno.cpf, None);
    assert_eq!(bruno.sex, Sex::Male);
    assert_eq!(bruno.periods[0].source_kind, SourceKind::MonthsFromStart);
    assert_eq!(bruno.periods[0].end, Some(date!(2024 - 05 - 29)));
}

#[test]
fn test_load_subjects_requires_name_column() {
    let result: Result<Vec<Subject>, ImportError> =
        load_subjects("CPF;CARGO\n1;x\n", None, 3, &NoopDiagnostics);
    assert_eq!(
        result.unwrap_err(),
        ImportError::MissingColumn { column: "servidor" }
    );
}

#[test]
fn test_load_subjects_reports_invalid_cpf() {
    let sheet: &str = "SERVIDOR;CPF
Ana Souza;529.982.247-25
Carla Dias;123.456.789-00
Davi Reis;111.111.111-11
";
    let sink: CollectingDiagnostics = CollectingDiagnostics::new();

    let subjects: Vec<Subject> = load_subjects(sheet, None, 3, &sink).unwrap();

    assert_eq!(subjects.len(), 3);
    assert_eq!(subjects[1].id(), "12345678900");
    assert_eq!(
        sink.events(),
        vec![
            Diagnostic::InvalidCpf {
                name: String::from("Carla Dias"),
                cpf: String::from("12345678900"),
            },
            Diagnostic::InvalidCpf {
                name: String::from("Davi Reis"),
                cpf: String::from("11111111111"),
            },
        ]
    );
}

#[test]
fn test_subject_from_row_uses_start_and_month_columns() {
    let row: FieldRow = FieldRow::new([
        ("Nome", "Carla"),
        ("A_PARTIR", "01/02/2025"),
        ("MESES", "3"),
        ("Sexo", "x"),
    ]);

    let subject: Subject = subject_from_row(&row, 3).unwrap();

    assert_eq!(subject.sex, Sex::Unknown);
    assert_eq!(subject.periods.len(), 1);
    assert_eq!(subject.periods[0].start, Some(date!(2025 - 02 - 01)));
    assert_eq!(subject.periods[0].duration_months, Some(3));
    assert_eq!(
        subject.periods[0].effective_end(),
        Some(date!(2025 - 05 - 02))
    );
}

#[test]
fn test_subject_from_row_without_name() {
    let row: FieldRow = FieldRow::new([("SERVIDOR", ""), ("Cronograma", "jan/2025")]);
    assert!(subject_from_row(&row, 3).is_none());
}

#[test]
fn test_subject_from_row_keeps_unparsed_schedule() {
    let row: FieldRow = FieldRow::new([("SERVIDOR", "Davi"), ("Cronograma", "a definir")]);
    let subject: Subject = subject_from_row(&row, 3).unwrap();
    assert_eq!(subject.periods.len(), 1);
    assert_eq!(subject.periods[0].source_kind, SourceKind::Unparsed);
    assert_eq!(subject.periods[0].raw_text, "a definir");
}
