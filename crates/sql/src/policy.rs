//! Read-only policy and row cap for `execute_select_query`.
//!
//! Both checks are textual. The keyword check only looks at how the statement
//! starts, and the cap is skipped whenever `limit` appears anywhere in the
//! text (a subquery, a string literal, a column name). Statements are always
//! sent as a single prepared statement, so batching a write after a `SELECT`
//! is rejected by the driver rather than by this module.

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};

pub const DEFAULT_ROW_LIMIT: u32 = 100;
pub const MAX_ROW_LIMIT: u32 = 1000;

/// Trim `query` and ensure it starts with one of the dialect's read-only
/// keywords.
pub fn check_read_only(dialect: Dialect, query: &str) -> SqlResult<&str> {
    let query = query.trim();
    let lowered = query.to_lowercase();

    if dialect
        .read_only_keywords()
        .iter()
        .any(|keyword| lowered.starts_with(keyword))
    {
        Ok(query)
    } else {
        Err(SqlError::Policy(dialect.read_only_violation().to_string()))
    }
}

/// The cap applied for a requested `limit`: absent or non-positive means the
/// default, anything else is truncated and clamped to the ceiling.
pub fn row_limit(requested: Option<f64>) -> u32 {
    match requested {
        Some(n) if n >= 1.0 => n.trunc().min(MAX_ROW_LIMIT as f64) as u32,
        _ => DEFAULT_ROW_LIMIT,
    }
}

/// Append ` LIMIT n` unless the text already mentions `limit`. Trailing
/// semicolons are dropped either way so the cap lands inside the statement.
pub fn apply_row_cap(query: &str, requested: Option<f64>) -> String {
    let query = query.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if query.to_lowercase().contains("limit") {
        query.to_string()
    } else {
        format!("{} LIMIT {}", query, row_limit(requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_passes() {
        assert_eq!(check_read_only(Dialect::MySql, "select 1").unwrap(), "select 1");
        assert_eq!(
            check_read_only(Dialect::Postgres, "  SELECT * FROM t\n").unwrap(),
            "SELECT * FROM t"
        );
    }

    #[test]
    fn test_writes_are_refused() {
        let err = check_read_only(Dialect::MySql, "drop table x").unwrap_err();
        assert!(matches!(err, SqlError::Policy(_)));
        assert_eq!(err.to_string(), "Only SELECT queries are allowed");

        assert!(check_read_only(Dialect::Postgres, "delete from x").is_err());
        assert!(check_read_only(Dialect::Postgres, "update x set a = 1").is_err());
    }

    #[test]
    fn test_cte_only_on_postgres() {
        let cte = "WITH t AS (SELECT 1) SELECT * FROM t";
        assert!(check_read_only(Dialect::Postgres, cte).is_ok());
        assert_eq!(
            check_read_only(Dialect::MySql, cte).unwrap_err().to_string(),
            "Only SELECT queries are allowed"
        );
    }

    #[test]
    fn test_existing_limit_is_kept() {
        assert_eq!(
            apply_row_cap("select * from t LIMIT 3", Some(50.0)),
            "select * from t LIMIT 3"
        );
        // Textual match, so a column named `limit_days` counts too.
        assert_eq!(
            apply_row_cap("select limit_days from plans", None),
            "select limit_days from plans"
        );
    }

    #[test]
    fn test_cap_is_appended() {
        assert_eq!(apply_row_cap("select * from t", None), "select * from t LIMIT 100");
        assert_eq!(apply_row_cap("select * from t", Some(5.0)), "select * from t LIMIT 5");
        assert_eq!(
            apply_row_cap("select * from t", Some(5000.0)),
            "select * from t LIMIT 1000"
        );
    }

    #[test]
    fn test_trailing_semicolon_is_dropped() {
        assert_eq!(apply_row_cap("select 1;", None), "select 1 LIMIT 100");
        assert_eq!(apply_row_cap("select 1 ; ;\n", Some(3.0)), "select 1 LIMIT 3");
        assert_eq!(
            apply_row_cap("select * from t limit 2;", None),
            "select * from t limit 2"
        );
    }

    #[test]
    fn test_row_limit_edges() {
        assert_eq!(row_limit(Some(0.0)), DEFAULT_ROW_LIMIT);
        assert_eq!(row_limit(Some(-3.0)), DEFAULT_ROW_LIMIT);
        assert_eq!(row_limit(Some(f64::NAN)), DEFAULT_ROW_LIMIT);
        assert_eq!(row_limit(Some(7.9)), 7);
        assert_eq!(row_limit(Some(1000.0)), 1000);
    }
}
