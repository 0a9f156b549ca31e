// jira.addWorklog

use crate::client::JiraConnection;
use crate::document;
use crate::started::{normalize_started, now_started};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use toolrelay_mcp::protocol::ToolSchema;
use toolrelay_mcp::tools::{json_schema_integer, json_schema_object, json_schema_string, Tool};

/// Log time spent on an issue.
pub struct AddWorklogTool {
    connection: Arc<JiraConnection>,
}

impl AddWorklogTool {
    pub fn new(connection: Arc<JiraConnection>) -> Self {
        Self { connection }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddWorklogArgs {
    issue_key: String,
    time_spent_seconds: u64,
    #[serde(default)]
    started: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    visibility: Option<Visibility>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Visibility {
    #[serde(rename = "type")]
    kind: VisibilityKind,
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum VisibilityKind {
    Role,
    Group,
}

#[async_trait::async_trait]
impl Tool for AddWorklogTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "jira.addWorklog".to_string(),
            title: Some("Add worklog".to_string()),
            description: "Add a worklog entry to a Jira Cloud issue.".to_string(),
            input_schema: json_schema_object(
                json!({
                    "issueKey": json_schema_string("Issue key (e.g. ABC-123)."),
                    "timeSpentSeconds": json_schema_integer("Time spent in seconds (3600 = 1h)."),
                    "started": json_schema_string(
                        "Start time. Accepts a local 'YYYY-MM-DDTHH:mm:ss' or a timestamp with offset (e.g. 2025-10-03T09:00:00-03:00). Defaults to now."
                    ),
                    "comment": json_schema_string("Optional plain-text worklog comment."),
                    "visibility": {
                        "type": "object",
                        "description": "Restrict who can see the worklog.",
                        "properties": {
                            "type": { "type": "string", "enum": ["role", "group"] },
                            "value": { "type": "string" }
                        }
                    }
                }),
                vec!["issueKey", "timeSpentSeconds"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: AddWorklogArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for jira.addWorklog")?;

        let started = match args.started.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => normalize_started(s)?,
            _ => now_started(),
        };

        let mut body = json!({
            "timeSpentSeconds": args.time_spent_seconds,
            "started": started,
        });
        if let Some(comment) = args.comment.as_deref().filter(|c| !c.is_empty()) {
            body["comment"] = document::paragraph(comment);
        }
        if let Some(visibility) = &args.visibility {
            body["visibility"] = serde_json::to_value(visibility)?;
        }

        let client = self.connection.client().await?;
        let url = client.endpoint(&["issue", &args.issue_key, "worklog"])?;
        let created = client.post(url, &body).await?;

        let id = created.get("id").and_then(Value::as_str).unwrap_or("?");
        Ok(format!(
            "Worklog created on {} with {}s (started={}). id={}",
            args.issue_key, args.time_spent_seconds, started, id
        ))
    }

    fn read_only(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_add_worklog() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/issue/ABC-1/worklog"))
            .and(body_json(json!({
                "timeSpentSeconds": 3600,
                "started": "2025-10-03T09:00:00-0300",
                "comment": document::paragraph("Pairing on the importer"),
                "visibility": {"type": "role", "value": "Developers"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "10001"})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = AddWorklogTool::new(testing::connection(&server));
        let text = tool
            .execute(json!({
                "issueKey": "ABC-1",
                "timeSpentSeconds": 3600,
                "started": "2025-10-03T09:00:00-03:00",
                "comment": "Pairing on the importer",
                "visibility": {"type": "role", "value": "Developers"}
            }))
            .await
            .unwrap();

        assert_eq!(
            text,
            "Worklog created on ABC-1 with 3600s (started=2025-10-03T09:00:00-0300). id=10001"
        );
    }

    #[tokio::test]
    async fn test_add_worklog_without_id_in_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/issue/ABC-2/worklog"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let tool = AddWorklogTool::new(testing::connection(&server));
        let text = tool
            .execute(json!({
                "issueKey": "ABC-2",
                "timeSpentSeconds": 60,
                "started": "2025-10-03T09:00:00Z"
            }))
            .await
            .unwrap();

        assert!(text.ends_with("id=?"));
    }

    #[tokio::test]
    async fn test_invalid_started_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let tool = AddWorklogTool::new(testing::connection(&server));
        let err = tool
            .execute(json!({
                "issueKey": "ABC-1",
                "timeSpentSeconds": 60,
                "started": "last tuesday"
            }))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid started value: last tuesday");
    }

    #[test]
    fn test_is_a_write() {
        let server_less = Arc::new(JiraConnection::new(Default::default()));
        assert!(!AddWorklogTool::new(server_less).read_only());
    }
}
