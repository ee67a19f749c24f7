use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles supported by the CRM. Matches the `role` column in `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Identity resolved once per request from the session token.
/// Immutable for the lifetime of the request.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    /// Lead visibility scope: admins see every lead, everyone else only
    /// their own. `None` means unrestricted.
    pub fn lead_scope(&self) -> Option<Uuid> {
        match self.role {
            Role::Admin => None,
            Role::User => Some(self.id),
        }
    }

    pub fn can_modify_lead(&self, owner_id: Option<Uuid>) -> bool {
        self.role == Role::Admin || owner_id == Some(self.id)
    }
}
