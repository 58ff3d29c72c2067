pub mod extractor;
pub mod password;
pub mod token;

use uuid::Uuid;

use crate::models::user::{Role, User};

pub use extractor::{AdminUser, AuthUser};
pub use token::{Claims, TokenKind, TokenResponse, TokenService};

/// The authenticated caller, as carried inside access tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
