//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL, plus
//! LIKE pattern escaping.
//!
//! # Safety
//!
//! Nothing in this module interpolates user input. Values that come from a
//! request are always passed via `.bind()`.

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::BigInt;

/// Window function for counting total rows across the full result set.
///
/// Returns `COUNT(*) OVER()` which gives the total count before LIMIT/OFFSET.
/// Diesel doesn't support window functions natively.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// Escape `\`, `%` and `_` so `term` matches literally inside a LIKE pattern.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// ILIKE pattern matching values that start with `prefix`.
pub fn prefix_pattern(prefix: &str) -> String {
    format!("{}%", escape_like(prefix))
}

/// ILIKE pattern matching values that contain `term` anywhere.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(prefix_pattern("sal"), "sal%");
    }

    #[test]
    fn test_prefix_pattern_escapes_wildcards() {
        assert_eq!(prefix_pattern("50%_"), "50\\%\\_%");
        assert_eq!(prefix_pattern("a\\b"), "a\\\\b%");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("pan"), "%pan%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
    }
}
