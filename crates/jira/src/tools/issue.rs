// jira.getIssue and jira.getComments

use super::view::{StatusView, UserView};
use crate::client::JiraConnection;
use crate::model::{CommentPage, Issue};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use toolrelay_mcp::format::json_block;
use toolrelay_mcp::protocol::ToolSchema;
use toolrelay_mcp::tools::{
    json_schema_array, json_schema_integer, json_schema_object, json_schema_string, Tool,
};

/// Comments are fetched with `jira.getComments`, not here.
const ISSUE_FIELDS: &str = "summary,description,status,assignee,created,updated,priority,issuetype,project";
const DEFAULT_MAX_COMMENTS: u32 = 50;

/// Fetch one issue with its main fields.
pub struct GetIssueTool {
    connection: Arc<JiraConnection>,
}

impl GetIssueTool {
    pub fn new(connection: Arc<JiraConnection>) -> Self {
        Self { connection }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetIssueArgs {
    issue_key: String,
    #[serde(default)]
    expand: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct IssueView<'a> {
    key: Option<&'a str>,
    id: Option<&'a str>,
    #[serde(rename = "self")]
    self_url: Option<&'a str>,
    fields: IssueFieldsView<'a>,
}

#[derive(Debug, Serialize)]
struct IssueFieldsView<'a> {
    summary: Option<&'a str>,
    description: Option<&'a Value>,
    status: StatusView<'a>,
    assignee: Option<UserView<'a>>,
    priority: Option<&'a str>,
    issuetype: Option<&'a str>,
    project: ProjectView<'a>,
    created: Option<&'a str>,
    updated: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ProjectView<'a> {
    key: Option<&'a str>,
    name: Option<&'a str>,
}

impl<'a> From<&'a Issue> for IssueView<'a> {
    fn from(issue: &'a Issue) -> Self {
        let f = issue.fields.as_ref();
        let project = f.and_then(|f| f.project.as_ref());
        Self {
            key: issue.key.as_deref(),
            id: issue.id.as_deref(),
            self_url: issue.self_url.as_deref(),
            fields: IssueFieldsView {
                summary: f.and_then(|f| f.summary.as_deref()),
                description: f.and_then(|f| f.description.as_ref()),
                status: StatusView::from(f.and_then(|f| f.status.as_ref())),
                assignee: f.and_then(|f| f.assignee.as_ref()).map(UserView::from),
                priority: f
                    .and_then(|f| f.priority.as_ref())
                    .and_then(|p| p.name.as_deref()),
                issuetype: f
                    .and_then(|f| f.issuetype.as_ref())
                    .and_then(|t| t.name.as_deref()),
                project: ProjectView {
                    key: project.and_then(|p| p.key.as_deref()),
                    name: project.and_then(|p| p.name.as_deref()),
                },
                created: f.and_then(|f| f.created.as_deref()),
                updated: f.and_then(|f| f.updated.as_deref()),
            },
        }
    }
}

#[async_trait::async_trait]
impl Tool for GetIssueTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "jira.getIssue".to_string(),
            title: Some("Get issue".to_string()),
            description: "Fetch a Jira Cloud issue: summary, description, status, assignee, priority, type and project.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "issueKey": json_schema_string("Issue key (e.g. ABC-123)."),
                    "expand": json_schema_array(
                        json!({"type": "string"}),
                        "Entities to expand, e.g. 'renderedFields' for an HTML description."
                    )
                }),
                vec!["issueKey"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: GetIssueArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for jira.getIssue")?;

        let client = self.connection.client().await?;
        let mut url = client.endpoint(&["issue", &args.issue_key])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("fields", ISSUE_FIELDS);
            if let Some(expand) = args.expand.as_ref().filter(|e| !e.is_empty()) {
                query.append_pair("expand", &expand.join(","));
            }
        }

        let issue: Issue =
            serde_json::from_value(client.get(url).await?).context("Unexpected issue response")?;

        Ok(format!(
            "Issue {}:\n\n{}",
            args.issue_key,
            json_block(&IssueView::from(&issue))?
        ))
    }
}

/// Fetch the comments of one issue.
pub struct GetCommentsTool {
    connection: Arc<JiraConnection>,
}

impl GetCommentsTool {
    pub fn new(connection: Arc<JiraConnection>) -> Self {
        Self { connection }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
enum CommentOrder {
    #[default]
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "+created")]
    Ascending,
    #[serde(rename = "-created")]
    Descending,
}

impl CommentOrder {
    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Ascending => "+created",
            Self::Descending => "-created",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetCommentsArgs {
    issue_key: String,
    #[serde(default)]
    max_results: Option<u32>,
    #[serde(default)]
    order_by: Option<CommentOrder>,
}

#[derive(Debug, Serialize)]
struct CommentView<'a> {
    id: Option<&'a str>,
    author: Option<UserView<'a>>,
    body: Option<&'a Value>,
    created: Option<&'a str>,
    updated: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<&'a Value>,
}

#[async_trait::async_trait]
impl Tool for GetCommentsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "jira.getComments".to_string(),
            title: Some("Get comments".to_string()),
            description: "Fetch the comments of a Jira Cloud issue.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "issueKey": json_schema_string("Issue key (e.g. ABC-123)."),
                    "maxResults": json_schema_integer("Maximum number of comments (default: 50)."),
                    "orderBy": {
                        "type": "string",
                        "enum": ["created", "-created", "+created"],
                        "description": "Comment ordering."
                    }
                }),
                vec!["issueKey"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: GetCommentsArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for jira.getComments")?;

        let client = self.connection.client().await?;
        let mut url = client.endpoint(&["issue", &args.issue_key, "comment"])?;
        url.query_pairs_mut()
            .append_pair(
                "maxResults",
                &args.max_results.unwrap_or(DEFAULT_MAX_COMMENTS).to_string(),
            )
            .append_pair("orderBy", args.order_by.unwrap_or_default().as_str());

        let page: CommentPage = serde_json::from_value(client.get(url).await?)
            .context("Unexpected comments response")?;

        let comments: Vec<CommentView<'_>> = page
            .comments
            .iter()
            .map(|c| CommentView {
                id: c.id.as_deref(),
                author: c.author.as_ref().map(UserView::from),
                body: c.body.as_ref(),
                created: c.created.as_deref(),
                updated: c.updated.as_deref(),
                visibility: c.visibility.as_ref(),
            })
            .collect();

        let total = page.total.unwrap_or(comments.len() as u64);
        Ok(format!(
            "Comments on {} ({} total):\n\n{}",
            args.issue_key,
            total,
            json_block(&json!({
                "total": total,
                "maxResults": page.max_results,
                "comments": comments,
            }))?
        ))
    }
}
