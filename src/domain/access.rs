//! Role and dining-unit scoping
//!
//! Every service call receives the [`Actor`] decoded from the caller's token.
//! Admin and accounting users see every unit; managers and staff only their own.

use std::fmt;
use std::str::FromStr;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Accounting,
    Manager,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Accounting => "accounting",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// Roles whose visibility is not limited to a single dining unit
    pub fn is_cross_unit(&self) -> bool {
        matches!(self, Role::Admin | Role::Accounting)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "accounting" => Ok(Role::Accounting),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            other => Err(DomainError::validation(format!("unknown role '{}'", other))),
        }
    }
}

/// Which dining units an actor may read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    AllUnits,
    Unit(i32),
    /// Unit-bound role without an assigned unit
    NoUnits,
}

/// The authenticated caller of a service operation
#[derive(Debug, Clone)]
pub struct Actor {
    pub username: String,
    pub role: Role,
    pub unit_id: Option<i32>,
}

impl Actor {
    pub fn new(username: impl Into<String>, role: Role, unit_id: Option<i32>) -> Self {
        Self {
            username: username.into(),
            role,
            unit_id,
        }
    }

    pub fn scope(&self) -> Scope {
        if self.role.is_cross_unit() {
            return Scope::AllUnits;
        }
        match self.unit_id {
            Some(id) => Scope::Unit(id),
            None => Scope::NoUnits,
        }
    }

    pub fn can_access(&self, unit_id: i32) -> bool {
        match self.scope() {
            Scope::AllUnits => true,
            Scope::Unit(own) => own == unit_id,
            Scope::NoUnits => false,
        }
    }

    pub fn ensure_unit(&self, unit_id: i32) -> Result<(), DomainError> {
        if self.can_access(unit_id) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "{} has no access to dining unit {}",
                self.username, unit_id
            )))
        }
    }

    pub fn ensure_role(&self, allowed: &[Role]) -> Result<(), DomainError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "role '{}' may not perform this operation",
                self.role
            )))
        }
    }

    /// Resolve the unit filter of a list query against the actor's scope.
    ///
    /// Cross-unit actors get exactly what they asked for (`None` = every unit).
    /// Unit-bound actors are pinned to their own unit.
    pub fn unit_filter(&self, requested: Option<i32>) -> Result<Option<i32>, DomainError> {
        match (self.scope(), requested) {
            (Scope::AllUnits, requested) => Ok(requested),
            (Scope::Unit(own), None) => Ok(Some(own)),
            (Scope::Unit(own), Some(id)) if id == own => Ok(Some(own)),
            (_, Some(id)) => Err(DomainError::Forbidden(format!(
                "{} has no access to dining unit {}",
                self.username, id
            ))),
            (Scope::NoUnits, None) => Err(DomainError::Forbidden(format!(
                "{} is not assigned to a dining unit",
                self.username
            ))),
        }
    }
}
