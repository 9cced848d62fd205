use poise::serenity_prelude::Permissions;
use std::fmt;

use crate::error::{BotError, Result};

/// Raw permission value meaning "any user may run this"
pub const PUBLIC: i64 = -1;

/// What a command demands of the invoking member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRequirement {
    /// No permission needed
    Public,
    /// Satisfied by any role sharing at least one bit with this mask
    Bits(Permissions),
}

impl PermissionRequirement {
    /// Interpret a raw permission integer. `-1` is public; any other negative
    /// value is rejected.
    pub fn from_raw(value: i64) -> Result<Self> {
        match value {
            PUBLIC => Ok(Self::Public),
            v if v < 0 => Err(BotError::InvalidPermission { value }),
            v => Ok(Self::Bits(Permissions::from_bits_retain(v as u64))),
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            Self::Public => PUBLIC,
            Self::Bits(bits) => bits.bits() as i64,
        }
    }

    /// Whether a role carrying `granted` satisfies this requirement.
    pub fn granted_by(self, granted: Permissions) -> bool {
        match self {
            Self::Public => true,
            Self::Bits(required) => required.intersects(granted),
        }
    }
}

impl From<Permissions> for PermissionRequirement {
    fn from(bits: Permissions) -> Self {
        Self::Bits(bits)
    }
}

impl fmt::Display for PermissionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Bits(bits) => write!(f, "{:#x}", bits.bits()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw() {
        assert_eq!(PermissionRequirement::from_raw(-1).unwrap(), PermissionRequirement::Public);
        assert_eq!(
            PermissionRequirement::from_raw(0x10).unwrap(),
            PermissionRequirement::Bits(Permissions::from_bits_retain(0x10))
        );
        assert_eq!(
            PermissionRequirement::from_raw(0).unwrap(),
            PermissionRequirement::Bits(Permissions::empty())
        );
        assert!(matches!(
            PermissionRequirement::from_raw(-2),
            Err(BotError::InvalidPermission { value: -2 })
        ));
    }

    #[test]
    fn test_granted_by() {
        let required = PermissionRequirement::Bits(Permissions::from_bits_retain(0x10));
        assert!(required.granted_by(Permissions::from_bits_retain(0x18)));
        assert!(!required.granted_by(Permissions::from_bits_retain(0x8)));

        // Zero mask is never satisfied by bits alone.
        let zero = PermissionRequirement::Bits(Permissions::empty());
        assert!(!zero.granted_by(Permissions::all()));

        assert!(PermissionRequirement::Public.granted_by(Permissions::empty()));
    }

    #[test]
    fn test_display() {
        assert_eq!(PermissionRequirement::Public.to_string(), "public");
        assert_eq!(
            PermissionRequirement::Bits(Permissions::MANAGE_ROLES).to_string(),
            "0x10000000"
        );
        assert_eq!(PermissionRequirement::Public.to_raw(), -1);
    }
}
