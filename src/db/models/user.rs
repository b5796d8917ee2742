use serde::{Deserialize, Serialize};

/// ✅ **Closed role set replacing free-form role strings**
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Supervisor,
    Employee,
}

impl Role {
    /// Capability table consumed by the authorization resolver. Status
    /// mutations require level >= 2; content mutations require ownership.
    pub fn access_level(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Supervisor => 2,
            Role::Employee => 1,
        }
    }

    pub fn can_review(&self) -> bool {
        self.access_level() >= 2
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Supervisor => write!(f, "supervisor"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "supervisor" => Ok(Role::Supervisor),
            "employee" => Ok(Role::Employee),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_levels_are_ordered() {
        assert!(Role::Admin.access_level() > Role::Supervisor.access_level());
        assert!(Role::Supervisor.access_level() > Role::Employee.access_level());
    }

    #[test]
    fn only_reviewers_can_review() {
        assert!(Role::Supervisor.can_review());
        assert!(Role::Admin.can_review());
        assert!(!Role::Employee.can_review());
    }
}
