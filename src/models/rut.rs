//! RUT (Chilean tax identifier) normalization
//!
//! Institutions are keyed by their RUT. Users type it in many shapes
//! (`76.123.456-7`, `761234567`, `12345678-k`); it is stored as
//! `<body>-<check digit>` with an uppercase `K`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

static RUT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,9}[0-9K]$").expect("valid RUT regex"));

/// Canonicalize a RUT into its stored form.
///
/// The check digit is kept as typed; it is not recomputed.
pub fn normalize_rut(input: &str) -> AppResult<String> {
    let compact: String = input
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .collect();

    if !RUT_RE.is_match(&compact) {
        return Err(AppError::Validation(format!(
            "RUT must have a valid format (e.g. 76.123.456-7), got '{}'",
            input
        )));
    }

    let (body, check_digit) = compact.split_at(compact.len() - 1);
    Ok(format!("{}-{}", body, check_digit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_dots_and_keeps_dash() {
        assert_eq!(normalize_rut("76.123.456-7").unwrap(), "76123456-7");
    }

    #[test]
    fn inserts_dash_when_missing() {
        assert_eq!(normalize_rut("761234567").unwrap(), "76123456-7");
    }

    #[test]
    fn uppercases_k_check_digit() {
        assert_eq!(normalize_rut(" 12.345.678-k ").unwrap(), "12345678-K");
    }

    #[test]
    fn is_idempotent() {
        let once = normalize_rut("9.876.543-2").unwrap();
        assert_eq!(normalize_rut(&once).unwrap(), once);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(normalize_rut("").is_err());
        assert!(normalize_rut("-").is_err());
        assert!(normalize_rut("ABC-1").is_err());
        assert!(normalize_rut("12345678-X").is_err());
        assert!(normalize_rut("12345678901-2").is_err());
    }
}
