use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Prefix the authorization layer expects on every role name.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Roles known to the enrollment service.
///
/// Stored and signed under their canonical (unprefixed) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Teacher,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Teacher => "TEACHER",
            Role::Manager => "MANAGER",
        }
    }

    /// Name as it appears in a resolved principal (`ROLE_STUDENT`).
    pub fn authority(&self) -> String {
        authority_name(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = s.trim();
        let canonical = canonical.strip_prefix(ROLE_PREFIX).unwrap_or(canonical);
        match canonical.to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Role::Student),
            "TEACHER" => Ok(Role::Teacher),
            "MANAGER" => Ok(Role::Manager),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Prepend `ROLE_` unless the name already carries it.
pub fn authority_name(role: &str) -> String {
    if role.starts_with(ROLE_PREFIX) {
        role.to_string()
    } else {
        format!("{ROLE_PREFIX}{role}")
    }
}

/// Resolved identity: subject plus its role set.
///
/// Roles are kept in a sorted set so comparisons and encodings never depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(subject: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.roles.contains(authority)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.has_authority(&role.authority())
    }
}
