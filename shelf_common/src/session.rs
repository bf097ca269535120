use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed-in user.
///
/// Handed explicitly to everything that talks to the backend on the user's
/// behalf. `id_token` is empty for local backends that need no credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub id_token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            id_token: id_token.into(),
        }
    }

    /// Session for a single local user without a remote identity provider
    pub fn local() -> Self {
        Self::new("local", "")
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn has_token(&self) -> bool {
        !self.id_token.is_empty()
    }
}

// Keep the token out of logs
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("id_token", &format_args!("<{} bytes>", self.id_token.len()))
            .finish()
    }
}
