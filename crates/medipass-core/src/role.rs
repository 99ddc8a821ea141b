//! Authorization roles and profile kinds.
//!
//! A [`Role`] is what a role binding grants to an identity. A
//! [`ProfileKind`] is the subset of roles that own a profile relation:
//! `staff` holders authenticate and administer but carry no clinical
//! profile of their own.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {value}")]
pub struct ParseRoleError {
    /// The rejected input.
    pub value: String,
}

/// Authorization role carried by a role binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrative staff; may provision and deprovision accounts.
    Staff,
    Doctor,
    /// Laboratory technologist.
    MedTech,
    /// Imaging technologist.
    RadTech,
    Patient,
}

impl Role {
    /// All known roles, in display order.
    pub const ALL: [Role; 5] = [
        Role::Staff,
        Role::Doctor,
        Role::MedTech,
        Role::RadTech,
        Role::Patient,
    ];

    /// Canonical lowercase name, as stored and sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Doctor => "doctor",
            Role::MedTech => "medtech",
            Role::RadTech => "radtech",
            Role::Patient => "patient",
        }
    }

    /// The profile relation this role reads and writes, if any.
    ///
    /// Returns `None` for `staff`, which has no profile relation.
    #[must_use]
    pub fn profile_kind(&self) -> Option<ProfileKind> {
        match self {
            Role::Staff => None,
            Role::Doctor => Some(ProfileKind::Doctor),
            Role::MedTech => Some(ProfileKind::MedTech),
            Role::RadTech => Some(ProfileKind::RadTech),
            Role::Patient => Some(ProfileKind::Patient),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "doctor" => Ok(Role::Doctor),
            "medtech" => Ok(Role::MedTech),
            "radtech" => Ok(Role::RadTech),
            "patient" => Ok(Role::Patient),
            _ => Err(ParseRoleError {
                value: s.to_string(),
            }),
        }
    }
}

/// Profile relations, one per role kind that owns domain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Doctor,
    MedTech,
    RadTech,
    Patient,
}

impl ProfileKind {
    /// All profile kinds, in display order.
    pub const ALL: [ProfileKind; 4] = [
        ProfileKind::Doctor,
        ProfileKind::MedTech,
        ProfileKind::RadTech,
        ProfileKind::Patient,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Doctor => "doctor",
            ProfileKind::MedTech => "medtech",
            ProfileKind::RadTech => "radtech",
            ProfileKind::Patient => "patient",
        }
    }

    /// The role a holder of this profile kind is bound to.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            ProfileKind::Doctor => Role::Doctor,
            ProfileKind::MedTech => Role::MedTech,
            ProfileKind::RadTech => Role::RadTech,
            ProfileKind::Patient => Role::Patient,
        }
    }
}

impl Display for ProfileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_str(s)?
            .profile_kind()
            .ok_or_else(|| ParseRoleError {
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("MedTech".parse::<Role>().unwrap(), Role::MedTech);
        assert_eq!(" STAFF ".parse::<Role>().unwrap(), Role::Staff);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = "janitor".parse::<Role>().unwrap_err();
        assert_eq!(err.value, "janitor");
    }

    #[test]
    fn test_staff_has_no_profile_kind() {
        assert_eq!(Role::Staff.profile_kind(), None);
        assert!("staff".parse::<ProfileKind>().is_err());
    }

    #[test]
    fn test_profile_kind_maps_back_to_role() {
        for kind in ProfileKind::ALL {
            assert_eq!(kind.role().profile_kind(), Some(kind));
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::RadTech).unwrap(), "\"radtech\"");
        let kind: ProfileKind = serde_json::from_str("\"medtech\"").unwrap();
        assert_eq!(kind, ProfileKind::MedTech);
    }
}
