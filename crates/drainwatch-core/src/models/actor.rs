use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of the acting party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    #[default]
    Citizen,
    Staff,
}

/// Identity of whoever performs a workflow operation.
///
/// Passed explicitly into every operation that checks rights; a citizen
/// without a user id is an anonymous guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Option<UserId>,
    pub role: Role,
}

impl Actor {
    pub fn guest() -> Self {
        Self { user_id: None, role: Role::Citizen }
    }

    pub fn citizen(id: UserId) -> Self {
        Self { user_id: Some(id), role: Role::Citizen }
    }

    pub fn staff(id: UserId) -> Self {
        Self { user_id: Some(id), role: Role::Staff }
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}

/// A notification recipient with staff rights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
}
