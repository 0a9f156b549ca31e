// execute_select_query and explain_query

use crate::policy::{apply_row_cap, check_read_only, MAX_ROW_LIMIT};
use crate::session::{JsonRow, SessionHandle};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolrelay_mcp::format::json_block;
use toolrelay_mcp::protocol::ToolSchema;
use toolrelay_mcp::tools::{json_schema_boolean, json_schema_object, json_schema_string, Tool};

const QUERY_PLAN_COLUMN: &str = "QUERY PLAN";

/// Run a read-only statement with a row cap.
pub struct ExecuteSelectQueryTool {
    handle: Arc<SessionHandle>,
}

impl ExecuteSelectQueryTool {
    pub fn new(handle: Arc<SessionHandle>) -> Self {
        Self { handle }
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteSelectQueryArgs {
    query: String,
    #[serde(default)]
    limit: Option<f64>,
}

#[async_trait::async_trait]
impl Tool for ExecuteSelectQueryTool {
    fn schema(&self) -> ToolSchema {
        let dialect = self.handle.dialect();
        let description = if dialect.read_only_keywords().contains(&"with") {
            "Run a read-only SELECT or WITH (CTE) query."
        } else {
            "Run a read-only SELECT query."
        };

        ToolSchema {
            name: "execute_select_query".to_string(),
            title: Some("Execute SELECT query".to_string()),
            description: description.to_string(),
            input_schema: json_schema_object(
                json!({
                    "query": json_schema_string("The SELECT statement to run."),
                    "limit": {
                        "type": "number",
                        "description": "Maximum rows to return when the query has no LIMIT (default 100, max 1000).",
                        "default": 100,
                        "maximum": MAX_ROW_LIMIT
                    }
                }),
                vec!["query"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: ExecuteSelectQueryArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for execute_select_query")?;

        let query = check_read_only(self.handle.dialect(), &args.query)?;
        let capped = apply_row_cap(query, args.limit);

        let session = self.handle.session().await?;
        let rows = session.fetch_all(&capped, &[]).await?;

        Ok(format!(
            "Query executed successfully.\n\nResults ({} {}):\n\n{}",
            rows.len(),
            if rows.len() == 1 { "row" } else { "rows" },
            json_block(&rows)?
        ))
    }
}

/// Show the execution plan of a statement.
pub struct ExplainQueryTool {
    handle: Arc<SessionHandle>,
}

impl ExplainQueryTool {
    pub fn new(handle: Arc<SessionHandle>) -> Self {
        Self { handle }
    }
}

#[derive(Debug, Deserialize)]
struct ExplainQueryArgs {
    query: String,
    #[serde(default)]
    analyze: bool,
}

#[async_trait::async_trait]
impl Tool for ExplainQueryTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = json!({
            "query": json_schema_string("The read-only statement to explain.")
        });
        if self.handle.dialect().supports_analyze() {
            properties["analyze"] = json_schema_boolean(
                "Run EXPLAIN ANALYZE, which executes the statement.",
            );
        }

        ToolSchema {
            name: "explain_query".to_string(),
            title: Some("Explain query".to_string()),
            description: "Show the execution plan of a read-only (SELECT) query.".to_string(),
            input_schema: json_schema_object(properties, vec!["query"]),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: ExplainQueryArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for explain_query")?;

        let dialect = self.handle.dialect();
        let analyze = args.analyze && dialect.supports_analyze();
        // An ANALYZE option written into the text would run the statement,
        // so every explained statement has to pass the read-only check.
        let query = check_read_only(dialect, &args.query)?;

        let session = self.handle.session().await?;
        let rows = session
            .fetch_all(&dialect.explain(query, analyze), &[])
            .await?;

        if rows.iter().all(|row| row.contains_key(QUERY_PLAN_COLUMN)) && !rows.is_empty() {
            Ok(format!(
                "Execution plan{}:\n\n```\n{}\n```",
                if analyze { " (analyzed)" } else { "" },
                plan_lines(&rows).join("\n")
            ))
        } else {
            Ok(format!("Execution plan:\n\n{}", json_block(&rows)?))
        }
    }
}

fn plan_lines(rows: &[JsonRow]) -> Vec<&str> {
    rows.iter()
        .filter_map(|row| row.get(QUERY_PLAN_COLUMN).and_then(Value::as_str))
        .collect()
}
