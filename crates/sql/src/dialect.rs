//! Per-backend SQL text: catalog queries, plan keywords and the read-only
//! keyword set.

/// The two supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Postgres,
}

const MYSQL_DESCRIBE_COLUMNS: &str = "\
SELECT
  COLUMN_NAME AS `Field`,
  COLUMN_TYPE AS `Type`,
  IS_NULLABLE AS `Null`,
  COLUMN_KEY AS `Key`,
  COLUMN_DEFAULT AS `Default`,
  EXTRA AS `Extra`
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION";

const MYSQL_LIST_TABLES: &str = "\
SELECT
  TABLE_NAME AS `Table`,
  TABLE_COMMENT AS `Comment`,
  TABLE_ROWS AS `Rows`
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = ?
ORDER BY TABLE_NAME";

const MYSQL_LIST_SCHEMAS: &str = "\
SELECT
  SCHEMA_NAME AS `Schema`,
  DEFAULT_CHARACTER_SET_NAME AS `Charset`,
  DEFAULT_COLLATION_NAME AS `Collation`
FROM information_schema.SCHEMATA
WHERE SCHEMA_NAME NOT IN ('mysql', 'information_schema', 'performance_schema', 'sys')
ORDER BY SCHEMA_NAME";

// information_schema columns are domain types; cast them to plain types so
// they decode without catalog lookups.
const PG_DESCRIBE_COLUMNS: &str = r#"
SELECT
  column_name::text AS "Field",
  data_type::text AS "Type",
  is_nullable::text AS "Null",
  column_default::text AS "Default",
  character_maximum_length::int AS "Length",
  numeric_precision::int AS "Precision",
  numeric_scale::int AS "Scale"
FROM information_schema.columns
WHERE table_schema::text = $1 AND table_name::text = $2
ORDER BY ordinal_position"#;

const PG_CONSTRAINTS: &str = r#"
SELECT
  tc.constraint_name::text AS "Constraint",
  tc.constraint_type::text AS "Type",
  kcu.column_name::text AS "Column"
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON tc.constraint_name = kcu.constraint_name
  AND tc.table_schema = kcu.table_schema
WHERE tc.table_schema::text = $1 AND tc.table_name::text = $2
ORDER BY tc.constraint_type, kcu.ordinal_position"#;

const PG_LIST_TABLES_IN_SCHEMA: &str = r#"
SELECT
  schemaname::text AS "Schema",
  tablename::text AS "Table",
  tableowner::text AS "Owner"
FROM pg_tables
WHERE schemaname = $1
ORDER BY schemaname, tablename"#;

const PG_LIST_TABLES: &str = r#"
SELECT
  schemaname::text AS "Schema",
  tablename::text AS "Table",
  tableowner::text AS "Owner"
FROM pg_tables
WHERE schemaname NOT IN ('information_schema', 'pg_catalog')
ORDER BY schemaname, tablename"#;

const PG_LIST_SCHEMAS: &str = r#"
SELECT
  schema_name::text AS "Schema",
  schema_owner::text AS "Owner"
FROM information_schema.schemata
WHERE schema_name NOT IN ('information_schema', 'pg_catalog')
ORDER BY schema_name"#;

impl Dialect {
    /// Human-readable backend name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::Postgres => "PostgreSQL",
        }
    }

    /// Name reported in the MCP `initialize` reply.
    pub fn server_name(self) -> &'static str {
        match self {
            Self::MySql => "mysql-mcp-server",
            Self::Postgres => "postgresql-mcp-server",
        }
    }

    /// Leading keywords accepted by `execute_select_query`.
    pub fn read_only_keywords(self) -> &'static [&'static str] {
        match self {
            Self::MySql => &["select"],
            Self::Postgres => &["select", "with"],
        }
    }

    pub fn read_only_violation(self) -> &'static str {
        match self {
            Self::MySql => "Only SELECT queries are allowed",
            Self::Postgres => "Only SELECT and CTE (WITH) queries are allowed",
        }
    }

    /// Schema used by catalog tools when the caller names none.
    /// MySQL scopes to the connected database instead.
    pub fn default_schema(self) -> Option<&'static str> {
        match self {
            Self::MySql => None,
            Self::Postgres => Some("public"),
        }
    }

    /// Whether `EXPLAIN ANALYZE` is offered.
    pub fn supports_analyze(self) -> bool {
        matches!(self, Self::Postgres)
    }

    pub fn explain(self, query: &str, analyze: bool) -> String {
        if analyze && self.supports_analyze() {
            format!("EXPLAIN ANALYZE {}", query)
        } else {
            format!("EXPLAIN {}", query)
        }
    }

    /// Column metadata for `(schema, table)`.
    pub fn describe_columns_sql(self) -> &'static str {
        match self {
            Self::MySql => MYSQL_DESCRIBE_COLUMNS,
            Self::Postgres => PG_DESCRIBE_COLUMNS,
        }
    }

    /// Constraint membership per column for `(schema, table)`, where offered.
    pub fn constraints_sql(self) -> Option<&'static str> {
        match self {
            Self::MySql => None,
            Self::Postgres => Some(PG_CONSTRAINTS),
        }
    }

    /// Table listing. With `filtered` the query takes the schema as its only
    /// parameter; MySQL always does.
    pub fn list_tables_sql(self, filtered: bool) -> &'static str {
        match (self, filtered) {
            (Self::MySql, _) => MYSQL_LIST_TABLES,
            (Self::Postgres, true) => PG_LIST_TABLES_IN_SCHEMA,
            (Self::Postgres, false) => PG_LIST_TABLES,
        }
    }

    pub fn list_schemas_sql(self) -> &'static str {
        match self {
            Self::MySql => MYSQL_LIST_SCHEMAS,
            Self::Postgres => PG_LIST_SCHEMAS,
        }
    }
}
