use serde::{Deserialize, Serialize};

/// Role of the caller inside its tenant.
///
/// Authorization is expressed through the predicate methods below instead
/// of string comparisons scattered through the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Role::Employee),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Managers and admins may act tenant-wide (read and mutate sessions
    /// owned by other users of the same tenant).
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }

    /// Only managers and admins may review (approve/reject) corrections.
    pub fn can_review(&self) -> bool {
        self.is_privileged()
    }
}

/// Caller identity, supplied by the surrounding transport layer for every
/// call. The core trusts these fields and never crosses `tenant_id`.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub tenant_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, tenant_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            role,
        }
    }

    pub fn owns(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Whether the actor may mutate a record owned by `user_id`.
    pub fn can_act_on(&self, user_id: &str) -> bool {
        self.owns(user_id) || self.role.is_privileged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_from_code_is_case_insensitive() {
        assert_eq!(Role::from_code("Employee"), Some(Role::Employee));
        assert_eq!(Role::from_code("MANAGER"), Some(Role::Manager));
        assert_eq!(Role::from_code("admin"), Some(Role::Admin));
        assert_eq!(Role::from_code("intern"), None);
    }

    #[test]
    fn employee_is_not_privileged() {
        assert!(!Role::Employee.is_privileged());
        assert!(!Role::Employee.can_review());
        assert!(Role::Manager.can_review());
        assert!(Role::Admin.can_review());
    }

    #[test]
    fn actor_can_act_on_own_records() {
        let a = Actor::new("u1", "t1", Role::Employee);
        assert!(a.can_act_on("u1"));
        assert!(!a.can_act_on("u2"));

        let m = Actor::new("m1", "t1", Role::Manager);
        assert!(m.can_act_on("u2"));
    }
}
