// Curated projections of Jira objects, as echoed back to the caller

use crate::model::{Status, User};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusView<'a> {
    pub id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub status_category: Option<&'a str>,
}

impl<'a> From<Option<&'a Status>> for StatusView<'a> {
    fn from(status: Option<&'a Status>) -> Self {
        Self {
            id: status.and_then(|s| s.id.as_deref()),
            name: status.and_then(|s| s.name.as_deref()),
            status_category: status.and_then(Status::category_name),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserView<'a> {
    pub display_name: Option<&'a str>,
    pub email_address: Option<&'a str>,
    pub account_id: Option<&'a str>,
}

impl<'a> From<&'a User> for UserView<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            display_name: user.display_name.as_deref(),
            email_address: user.email_address.as_deref(),
            account_id: user.account_id.as_deref(),
        }
    }
}
