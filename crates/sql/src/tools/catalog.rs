// describe_table, list_tables and list_schemas

use crate::session::SessionHandle;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolrelay_mcp::format::json_block;
use toolrelay_mcp::protocol::ToolSchema;
use toolrelay_mcp::tools::{json_schema_object, json_schema_string, Tool};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaArgs {
    #[serde(default)]
    schema_name: Option<String>,
}

impl SchemaArgs {
    fn schema(&self) -> Option<&str> {
        self.schema_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn schema_name_property(handle: &SessionHandle) -> Value {
    match handle.dialect().default_schema() {
        Some(default) => json_schema_string(&format!("Schema name (default: {}).", default)),
        None => json_schema_string("Database name (default: the connected database)."),
    }
}

/// Column metadata for one table.
pub struct DescribeTableTool {
    handle: Arc<SessionHandle>,
}

impl DescribeTableTool {
    pub fn new(handle: Arc<SessionHandle>) -> Self {
        Self { handle }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeTableArgs {
    table_name: String,
    #[serde(flatten)]
    schema: SchemaArgs,
}

#[async_trait::async_trait]
impl Tool for DescribeTableTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "describe_table".to_string(),
            title: Some("Describe table".to_string()),
            description: "Show the columns of a table: type, nullability, key, default.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "tableName": json_schema_string("Table name."),
                    "schemaName": schema_name_property(&self.handle)
                }),
                vec!["tableName"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: DescribeTableArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for describe_table")?;

        let dialect = self.handle.dialect();
        let session = self.handle.session().await?;
        let schema = args
            .schema
            .schema()
            .or(dialect.default_schema())
            .unwrap_or(session.database());
        let params = [schema, args.table_name.as_str()];

        let columns = session
            .fetch_all(dialect.describe_columns_sql(), &params)
            .await?;

        match dialect.constraints_sql() {
            Some(sql) => {
                let constraints = session.fetch_all(sql, &params).await?;
                Ok(format!(
                    "Structure of table `{}.{}`:\n\nColumns:\n{}\n\nConstraints:\n{}",
                    schema,
                    args.table_name,
                    json_block(&columns)?,
                    json_block(&constraints)?
                ))
            }
            None => Ok(format!(
                "Structure of table `{}`:\n\n{}",
                args.table_name,
                json_block(&columns)?
            )),
        }
    }
}

/// Tables of one schema, or of every non-system schema.
pub struct ListTablesTool {
    handle: Arc<SessionHandle>,
}

impl ListTablesTool {
    pub fn new(handle: Arc<SessionHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait::async_trait]
impl Tool for ListTablesTool {
    fn schema(&self) -> ToolSchema {
        let schema_name = match self.handle.dialect().default_schema() {
            Some(_) => json_schema_string("Only list tables of this schema (default: all non-system schemas)."),
            None => schema_name_property(&self.handle),
        };

        ToolSchema {
            name: "list_tables".to_string(),
            title: Some("List tables".to_string()),
            description: "List the tables of the database.".to_string(),
            input_schema: json_schema_object(json!({ "schemaName": schema_name }), vec![]),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: SchemaArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for list_tables")?;

        let dialect = self.handle.dialect();
        let session = self.handle.session().await?;

        // MySQL always scopes to one database, Postgres only when asked.
        let scope = match (args.schema(), dialect.default_schema()) {
            (Some(schema), _) => Some(schema),
            (None, None) => Some(session.database()),
            (None, Some(_)) => None,
        };
        let params: Vec<&str> = scope.into_iter().collect();

        let tables = session
            .fetch_all(dialect.list_tables_sql(scope.is_some()), &params)
            .await?;

        Ok(format!(
            "Tables in `{}`:\n\n{}",
            scope.unwrap_or(session.database()),
            json_block(&tables)?
        ))
    }
}

/// Non-system schemas of the server.
pub struct ListSchemasTool {
    handle: Arc<SessionHandle>,
}

impl ListSchemasTool {
    pub fn new(handle: Arc<SessionHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait::async_trait]
impl Tool for ListSchemasTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_schemas".to_string(),
            title: Some("List schemas".to_string()),
            description: "List the schemas of the database, excluding system schemas.".to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
            annotations: None,
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<String> {
        let dialect = self.handle.dialect();
        let session = self.handle.session().await?;

        let schemas = session.fetch_all(dialect.list_schemas_sql(), &[]).await?;

        Ok(format!(
            "Schemas in `{}`:\n\n{}",
            session.database(),
            json_block(&schemas)?
        ))
    }
}
