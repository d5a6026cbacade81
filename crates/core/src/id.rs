//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers are store-assigned positive integers. Their natural ordering is
//! the listing order of the catalog.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an inventory record (a sweet).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweetId(i64);

/// Identifier of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

macro_rules! impl_serial_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                if value <= 0 {
                    return Err(DomainError::invalid_id(format!("{}: must be positive", $name)));
                }
                Ok(Self(value))
            }
        }
    };
}

impl_serial_newtype!(SweetId, "SweetId");
impl_serial_newtype!(UserId, "UserId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        let id: SweetId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_non_numeric_and_non_positive_ids() {
        assert!("abc".parse::<SweetId>().is_err());
        assert!("0".parse::<UserId>().is_err());
        assert!("-7".parse::<SweetId>().is_err());
    }

    #[test]
    fn orders_by_numeric_value() {
        let mut ids = vec![SweetId::new(10), SweetId::new(2), SweetId::new(7)];
        ids.sort();
        assert_eq!(ids, vec![SweetId::new(2), SweetId::new(7), SweetId::new(10)]);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&SweetId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
