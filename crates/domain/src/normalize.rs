// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identifier and field-name normalization.
//!
//! Spreadsheet exports arrive with inconsistent casing, accents and
//! separators in both headers and values. Everything that compares text
//! goes through [`normalize_key`] so that "LOTAÇÃO", "Lotacao" and
//! "lotação" are the same key.

use serde::{Deserialize, Serialize};

/// Replaces Portuguese accented letters with their base letter.
#[must_use]
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// Normalizes a header or free-text token for case- and accent-insensitive
/// matching.
///
/// Accents are folded, letters lower-cased, and runs of whitespace,
/// underscores and dots collapse into a single space.
#[must_use]
pub fn normalize_key(text: &str) -> String {
    let folded: String = fold_diacritics(text.trim()).to_lowercase();
    folded
        .split(|c: char| c.is_whitespace() || c == '_' || c == '.')
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Canonicalizes a CPF to its eleven digits.
///
/// Punctuation is dropped and spreadsheet-trimmed leading zeros are
/// restored. Returns `None` when no digits remain or more than eleven do.
#[must_use]
pub fn normalize_cpf(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() || digits.len() > 11 {
        return None;
    }
    Some(format!("{digits:0>11}"))
}

/// Formats a CPF as `000.000.000-00`. Returns an empty string when the
/// input does not normalize.
#[must_use]
pub fn format_cpf(raw: &str) -> String {
    normalize_cpf(raw).map_or_else(String::new, |cpf| {
        format!(
            "{}.{}.{}-{}",
            &cpf[0..3],
            &cpf[3..6],
            &cpf[6..9],
            &cpf[9..11]
        )
    })
}

/// Verifies both CPF check digits.
///
/// Sequences of a single repeated digit pass the arithmetic but are not
/// issued, so they are rejected.
#[must_use]
pub fn is_valid_cpf(raw: &str) -> bool {
    let Some(cpf) = normalize_cpf(raw) else {
        return false;
    };
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check_digit = |len: usize| -> u32 {
        let weight_start: u32 = u32::try_from(len).unwrap_or(0) + 1;
        let sum: u32 = digits
            .iter()
            .take(len)
            .zip((2..=weight_start).rev())
            .map(|(d, w)| d * w)
            .sum();
        let rest: u32 = (sum * 10) % 11;
        if rest == 10 { 0 } else { rest }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

/// Shortest header that may match an alias by being contained in it.
const MIN_PARTIAL_HEADER: usize = 3;

/// A single loader row with its headers normalized once.
///
/// Lookups try an exact normalized match for every alias first, then fall
/// back to substring containment in either direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRow {
    /// `(normalized header, original header, value)` in column order.
    fields: Vec<(String, String, String)>,
}

impl FieldRow {
    /// Builds a row from `(header, value)` pairs.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields: Vec<(String, String, String)> = pairs
            .into_iter()
            .map(|(k, v)| {
                (
                    normalize_key(k.as_ref()),
                    k.as_ref().to_string(),
                    v.as_ref().trim().to_string(),
                )
            })
            .collect();
        Self { fields }
    }

    /// Returns the number of columns in the row.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if every value in the row is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, _, v)| v.is_empty())
    }

    /// Looks up the first non-empty value for any of the aliases.
    #[must_use]
    pub fn get(&self, aliases: &[&str]) -> Option<&str> {
        self.find(aliases).map(|(_, value)| value)
    }

    /// Like [`FieldRow::get`], but also returns the original header that
    /// matched.
    #[must_use]
    pub fn find(&self, aliases: &[&str]) -> Option<(&str, &str)> {
        let keys: Vec<String> = aliases.iter().map(|a| normalize_key(a)).collect();

        let exact = keys.iter().find_map(|key| {
            self.fields
                .iter()
                .find(|(normalized, _, value)| normalized == key && !value.is_empty())
        });
        if let Some((_, header, value)) = exact {
            return Some((header.as_str(), value.as_str()));
        }

        keys.iter()
            .filter(|key| !key.is_empty())
            .find_map(|key| {
                self.fields.iter().find(|(normalized, _, value)| {
                    !value.is_empty()
                        && (normalized.contains(key.as_str())
                            || (normalized.len() >= MIN_PARTIAL_HEADER
                                && key.contains(normalized.as_str())))
                })
            })
            .map(|(_, header, value)| (header.as_str(), value.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_diacritics_portuguese() {
        assert_eq!(fold_diacritics("MARÇO"), "MARCO");
        assert_eq!(fold_diacritics("lotação"), "lotacao");
        assert_eq!(fold_diacritics("remuneração"), "remuneracao");
    }

    #[test]
    fn test_normalize_key_collapses_separators() {
        assert_eq!(normalize_key("  Data_Início  "), "data inicio");
        assert_eq!(normalize_key("A_PARTIR"), "a partir");
        assert_eq!(normalize_key("LOTAÇÃO"), "lotacao");
    }

    #[test]
    fn test_normalize_cpf_restores_leading_zeros() {
        assert_eq!(normalize_cpf("123.456.789-09").unwrap(), "12345678909");
        assert_eq!(normalize_cpf("1234567890").unwrap(), "01234567890");
        assert_eq!(normalize_cpf(""), None);
        assert_eq!(normalize_cpf("123456789012"), None);
    }

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf("12345678909"), "123.456.789-09");
        assert_eq!(format_cpf("abc"), "");
    }

    #[test]
    fn test_is_valid_cpf() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(!is_valid_cpf("529.982.247-24"));
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn test_field_row_exact_match_wins_over_partial() {
        let row: FieldRow = FieldRow::new([
            ("Data Início Prevista", "01/01/2025"),
            ("INICIO", "15/01/2025"),
        ]);
        assert_eq!(row.get(&["inicio"]), Some("15/01/2025"));
    }

    #[test]
    fn test_field_row_partial_match_both_directions() {
        let row: FieldRow = FieldRow::new([("Nome do Servidor", "Ana"), ("CPF", "1")]);
        assert_eq!(row.get(&["servidor"]), Some("Ana"));

        let row: FieldRow = FieldRow::new([("Sexo", "F")]);
        assert_eq!(row.get(&["sexo do servidor"]), Some("F"));
    }

    #[test]
    fn test_field_row_short_headers_do_not_match_partially() {
        let row: FieldRow = FieldRow::new([("A", "x"), ("Fim", "01/02/2025")]);
        assert_eq!(row.get(&["a partir"]), None);
        assert_eq!(row.get(&["data fim"]), Some("01/02/2025"));
    }

    #[test]
    fn test_field_row_skips_empty_values() {
        let row: FieldRow = FieldRow::new([("SERVIDOR", "  "), ("NOME", "Ana")]);
        assert_eq!(row.get(&["servidor", "nome"]), Some("Ana"));
        assert!(!row.is_blank());
    }

    #[test]
    fn test_field_row_find_returns_original_header() {
        let row: FieldRow = FieldRow::new([("LOTAÇÃO", "SES/DIR")]);
        assert_eq!(row.find(&["lotacao"]), Some(("LOTAÇÃO", "SES/DIR")));
    }
}
