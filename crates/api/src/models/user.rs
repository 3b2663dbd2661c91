//! User domain types.

use serde::Serialize;

use bakeapi_core::{Email, UserId};

/// A marketplace user (a bakery).
///
/// Users are created by the CLI or fixture loader and are never mutated by
/// the API. The password hash is only returned by the credential lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email, unique across users.
    pub email: Email,
    /// Display name of the bakery.
    pub bakery_name: Option<String>,
}
