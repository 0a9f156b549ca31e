//! Connection settings for Jira Cloud.

use crate::error::{JiraError, JiraResult};
use std::fmt;
use toolrelay_mcp::ConfigSource;
use url::Url;

pub const BASE_URL_VAR: &str = "JIRA_BASE_URL";
pub const EMAIL_VAR: &str = "JIRA_EMAIL";
pub const API_TOKEN_VAR: &str = "JIRA_API_TOKEN";

/// Base URL plus the account credentials used for Basic auth.
#[derive(Clone)]
pub struct JiraSettings {
    pub base_url: Url,
    pub email: String,
    pub api_token: String,
}

impl JiraSettings {
    /// Read all three settings; any absent key is reported by name.
    pub fn from_source(source: &ConfigSource) -> JiraResult<Self> {
        let values = source.require(&[BASE_URL_VAR, EMAIL_VAR, API_TOKEN_VAR])?;
        let (base_url, email, api_token) = (values[0], values[1], values[2]);

        let base_url = Url::parse(base_url)
            .map_err(|e| JiraError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(JiraError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            base_url,
            email: email.to_string(),
            api_token: api_token.to_string(),
        })
    }
}

impl fmt::Debug for JiraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraSettings")
            .field("base_url", &self.base_url.as_str())
            .field("email", &self.email)
            .field("api_token", &"***")
            .finish()
    }
}
