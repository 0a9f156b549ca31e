// jira.getTransitions and jira.transitionIssue

use super::view::StatusView;
use crate::client::JiraConnection;
use crate::document;
use crate::model::{string_or_number, Issue, TransitionList};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use toolrelay_mcp::format::json_block;
use toolrelay_mcp::protocol::ToolSchema;
use toolrelay_mcp::tools::{json_schema_object, json_schema_string, Tool};

/// List the workflow transitions currently available on an issue.
pub struct GetTransitionsTool {
    connection: Arc<JiraConnection>,
}

impl GetTransitionsTool {
    pub fn new(connection: Arc<JiraConnection>) -> Self {
        Self { connection }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetTransitionsArgs {
    issue_key: String,
    #[serde(default)]
    expand: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionView<'a> {
    id: Option<&'a str>,
    name: Option<&'a str>,
    to: StatusView<'a>,
    has_screen: Option<bool>,
    is_global: Option<bool>,
    is_initial: Option<bool>,
    is_conditional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a Value>,
}

#[async_trait::async_trait]
impl Tool for GetTransitionsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "jira.getTransitions".to_string(),
            title: Some("Get available transitions".to_string()),
            description: "List the status transitions available for an issue under its board's workflow rules.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "issueKey": json_schema_string("Issue key (e.g. ABC-123)."),
                    "expand": json_schema_string("Entities to expand (e.g. 'transitions.fields').")
                }),
                vec!["issueKey"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: GetTransitionsArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for jira.getTransitions")?;

        let client = self.connection.client().await?;
        let mut url = client.endpoint(&["issue", &args.issue_key, "transitions"])?;
        if let Some(expand) = args.expand.as_deref().filter(|e| !e.is_empty()) {
            url.query_pairs_mut().append_pair("expand", expand);
        }

        let list: TransitionList = serde_json::from_value(client.get(url).await?)
            .context("Unexpected transitions response")?;

        let transitions: Vec<TransitionView<'_>> = list
            .transitions
            .iter()
            .map(|t| TransitionView {
                id: t.id.as_deref(),
                name: t.name.as_deref(),
                to: StatusView::from(t.to.as_ref()),
                has_screen: t.has_screen,
                is_global: t.is_global,
                is_initial: t.is_initial,
                is_conditional: t.is_conditional,
                fields: t.fields.as_ref(),
            })
            .collect();

        Ok(format!(
            "Transitions available for {}:\n\n{}\n\n\
             Tip: pass the transition 'id' to jira.transitionIssue to move the issue. \
             When no transition leads straight to the status you want, apply the intermediate ones first.",
            args.issue_key,
            json_block(&json!({ "transitions": transitions, "expand": list.expand }))?
        ))
    }
}

/// Move an issue through a workflow transition.
pub struct TransitionIssueTool {
    connection: Arc<JiraConnection>,
}

impl TransitionIssueTool {
    pub fn new(connection: Arc<JiraConnection>) -> Self {
        Self { connection }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransitionIssueArgs {
    issue_key: String,
    #[serde(deserialize_with = "string_or_number")]
    transition_id: String,
    #[serde(default)]
    fields: Option<Map<String, Value>>,
    #[serde(default)]
    comment: Option<String>,
}

impl TransitionIssueArgs {
    fn request_body(&self) -> Value {
        let mut body = json!({ "transition": { "id": self.transition_id } });
        if let Some(fields) = &self.fields {
            body["fields"] = Value::Object(fields.clone());
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            body["update"] = json!({
                "comment": [{ "add": { "body": document::paragraph(comment) } }]
            });
        }
        body
    }
}

#[async_trait::async_trait]
impl Tool for TransitionIssueTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "jira.transitionIssue".to_string(),
            title: Some("Transition issue".to_string()),
            description: "Move an issue to another status by transition id. Use jira.getTransitions to find the available ids.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "issueKey": json_schema_string("Issue key (e.g. ABC-123)."),
                    "transitionId": json_schema_string("Transition id (from jira.getTransitions)."),
                    "fields": {
                        "type": "object",
                        "description": "Extra fields the transition screen requires (e.g. resolution, assignee)."
                    },
                    "comment": json_schema_string("Optional comment added with the transition.")
                }),
                vec!["issueKey", "transitionId"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: TransitionIssueArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for jira.transitionIssue")?;

        let client = self.connection.client().await?;
        let url = client.endpoint(&["issue", &args.issue_key, "transitions"])?;
        client.post(url, &args.request_body()).await?;

        let mut url = client.endpoint(&["issue", &args.issue_key])?;
        url.query_pairs_mut().append_pair("fields", "status");
        let updated: Issue =
            serde_json::from_value(client.get(url).await?).context("Unexpected issue response")?;

        let status = updated
            .fields
            .as_ref()
            .and_then(|f| f.status.as_ref())
            .and_then(|s| s.name.as_deref())
            .unwrap_or("unknown");

        Ok(format!(
            "Issue {} transitioned.\n\nNew status: {}\n\n\
             Note: when there is no direct transition to the status you need, \
             use jira.getTransitions to find the intermediate steps.",
            args.issue_key, status
        ))
    }

    fn read_only(&self) -> bool {
        false
    }
}
