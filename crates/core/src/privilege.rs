//! User privilege tiers.
//!
//! The numeric encoding is wire-visible (stored in the database, serialized
//! in API responses) and must not change: lower value = more privileged.

use serde::{Deserialize, Serialize};

/// Privilege level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum Privilege {
    SuperAdmin = 1,
    Admin = 2,
    Regular = 3,
}

impl Privilege {
    /// Whether a caller at this level satisfies the `required` level.
    ///
    /// Lower numeric value is more privileged, so a super admin (1) passes
    /// any check and a regular user (3) only passes regular-level checks.
    pub fn grants(self, required: Privilege) -> bool {
        (self as i16) <= (required as i16)
    }
}

impl From<Privilege> for i16 {
    fn from(privilege: Privilege) -> i16 {
        privilege as i16
    }
}

impl TryFrom<i16> for Privilege {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Privilege::SuperAdmin),
            2 => Ok(Privilege::Admin),
            3 => Ok(Privilege::Regular),
            other => Err(format!("unknown privilege level: {other}")),
        }
    }
}

impl std::fmt::Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Privilege::SuperAdmin => "super admin",
            Privilege::Admin => "admin",
            Privilege::Regular => "regular",
        };
        write!(f, "{name}")
    }
}
