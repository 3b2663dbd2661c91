//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

use bakeapi_core::UserId;

use super::User;

/// Identity of the caller behind a verified bearer token.
///
/// These are the identity claims carried in the token itself; no store
/// lookup is made to produce them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// Caller's user ID.
    pub user_id: UserId,
    /// Caller's email address.
    pub email: String,
    /// Caller's bakery name, if set.
    #[serde(default)]
    pub bakery_name: Option<String>,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.to_string(),
            bakery_name: user.bakery_name.clone(),
        }
    }
}
