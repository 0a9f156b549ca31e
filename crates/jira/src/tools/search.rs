// jira.searchJql

use crate::client::JiraConnection;
use crate::model::SearchResponse;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use toolrelay_mcp::format::json_block;
use toolrelay_mcp::protocol::ToolSchema;
use toolrelay_mcp::tools::{
    json_schema_array, json_schema_integer, json_schema_object, json_schema_string, Tool,
};

const DEFAULT_MAX_RESULTS: u32 = 25;
const DEFAULT_FIELDS: [&str; 4] = ["summary", "status", "assignee", "timetracking"];

/// Run a JQL search and list the matching issues.
pub struct SearchJqlTool {
    connection: Arc<JiraConnection>,
}

impl SearchJqlTool {
    pub fn new(connection: Arc<JiraConnection>) -> Self {
        Self { connection }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchJqlArgs {
    jql: String,
    #[serde(default)]
    max_results: Option<u32>,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct IssueSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    self_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<&'a str>,
}

#[async_trait::async_trait]
impl Tool for SearchJqlTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "jira.searchJql".to_string(),
            title: Some("Search issues (JQL)".to_string()),
            description: "Search issues with JQL and return their main fields.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "jql": json_schema_string(
                        "e.g. project = ABC AND assignee = currentUser() ORDER BY updated DESC"
                    ),
                    "maxResults": json_schema_integer("Maximum number of issues (default: 25)."),
                    "fields": json_schema_array(
                        json!({"type": "string"}),
                        "Fields to fetch (default: summary, status, assignee, timetracking)."
                    )
                }),
                vec!["jql"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: SearchJqlArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for jira.searchJql")?;

        let fields = match &args.fields {
            Some(fields) if !fields.is_empty() => fields.join(","),
            _ => DEFAULT_FIELDS.join(","),
        };
        let max_results = args.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

        let client = self.connection.client().await?;
        let mut url = client.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("jql", &args.jql)
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("fields", &fields);

        let response: SearchResponse = serde_json::from_value(client.get(url).await?)
            .context("Unexpected search response")?;

        let issues: Vec<IssueSummary<'_>> = response
            .issues
            .iter()
            .map(|issue| {
                let fields = issue.fields.as_ref();
                IssueSummary {
                    key: issue.key.as_deref(),
                    id: issue.id.as_deref(),
                    self_url: issue.self_url.as_deref(),
                    summary: fields.and_then(|f| f.summary.as_deref()),
                    status: fields
                        .and_then(|f| f.status.as_ref())
                        .and_then(|s| s.name.as_deref()),
                    assignee: fields
                        .and_then(|f| f.assignee.as_ref())
                        .and_then(|a| a.display_name.as_deref()),
                }
            })
            .collect();

        let total = response.total.unwrap_or(issues.len() as u64);
        Ok(format!(
            "JQL search results ({} issues found):\n\n{}",
            total,
            json_block(&json!({ "total": total, "issues": issues }))?
        ))
    }
}
