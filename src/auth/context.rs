use crate::domain::Role;
use crate::errors::ServerError;

/// The resolved identity for one request. Handlers receive this, never the
/// raw credential; where it came from is the router's business.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: Role,
}

impl AuthContext {
    /// Admins and the owner clear the staff gate.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Owner)
    }

    pub fn require_staff(&self) -> Result<(), ServerError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(ServerError::Forbidden("staff access required".into()))
        }
    }
}
