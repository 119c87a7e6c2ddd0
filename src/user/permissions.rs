use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    AccessCatalog,
    EditCatalog,
    ServerAdmin,
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::AccessCatalog,
    Permission::EditCatalog,
    Permission::ServerAdmin,
];
const CURATOR_PERMISSIONS: &[Permission] = &[Permission::AccessCatalog, Permission::EditCatalog];
const REGULAR_PERMISSIONS: &[Permission] = &[Permission::AccessCatalog];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Curator,
    Regular,
}

impl UserRole {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Admin => ADMIN_PERMISSIONS,
            UserRole::Curator => CURATOR_PERMISSIONS,
            UserRole::Regular => REGULAR_PERMISSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Curator => "Curator",
            UserRole::Regular => "Regular",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "curator" => Some(UserRole::Curator),
            "regular" => Some(UserRole::Regular),
            _ => None,
        }
    }
}

/// The identity a relation write is performed on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user: String,
    pub role: UserRole,
}

/// Name recorded as `created_by` on links the server derives by itself.
pub const SYSTEM_ACTOR_NAME: &str = "system";

impl Actor {
    pub fn new(user: impl Into<String>, role: UserRole) -> Self {
        Actor {
            user: user.into(),
            role,
        }
    }

    /// Actor used for automated writes, such as links derived from album relations.
    pub fn system() -> Self {
        Actor::new(SYSTEM_ACTOR_NAME, UserRole::Admin)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.permissions().contains(&permission)
    }

    /// Links written by privileged actors are stored as verified.
    pub fn is_privileged(&self) -> bool {
        self.role == UserRole::Admin
    }
}
