//! Strongly typed identifier wrappers.
//!
//! Vehicles are named by the operator at registration time, so `VehicleId`
//! wraps a `String`.  Orders and zones get generated ids; they wrap a v4
//! `Uuid` and are `Copy`.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::CoreError;

/// Generate a `Copy` id wrapper around a random `Uuid`.
macro_rules! generated_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub Uuid);

        impl $name {
            /// A fresh random id.
            #[inline]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map($name)
                    .map_err(|e| CoreError::Parse(format!("{}: {e}", stringify!($name))))
            }
        }
    };
}

generated_id! {
    /// Identifier of a queued or delivered order.
    pub struct OrderId;
}

generated_id! {
    /// Identifier of an exclusion zone.
    pub struct ZoneId;
}

/// Operator-supplied vehicle identifier (e.g. `"DRONE-01"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for VehicleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for VehicleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for VehicleId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
