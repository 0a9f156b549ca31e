//! The slices of Jira REST payloads the tools read.
//!
//! Everything is optional: Jira omits fields that are unset or hidden from
//! the caller, and the tools report whatever is present.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    pub total: Option<u64>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Issue {
    pub key: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    pub fields: Option<IssueFields>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub description: Option<Value>,
    pub status: Option<Status>,
    pub assignee: Option<User>,
    pub priority: Option<Named>,
    pub issuetype: Option<Named>,
    pub project: Option<Project>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status_category: Option<Named>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub account_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Project {
    pub key: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub total: Option<u64>,
    pub max_results: Option<u64>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Comment {
    pub id: Option<String>,
    pub author: Option<User>,
    pub body: Option<Value>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub visibility: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransitionList {
    pub expand: Option<String>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: Option<String>,
    pub name: Option<String>,
    pub to: Option<Status>,
    pub has_screen: Option<bool>,
    pub is_global: Option<bool>,
    pub is_initial: Option<bool>,
    pub is_conditional: Option<bool>,
    pub fields: Option<Value>,
}

impl Status {
    pub fn category_name(&self) -> Option<&str> {
        self.status_category.as_ref().and_then(|c| c.name.as_deref())
    }
}

/// Accept `"31"` or `31` for identifiers Jira models as strings.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}
