//! Data models
//!
//! Mirrors the backend's JSON documents. Ids are the backend's opaque string
//! ids (`_id`). Relations arrive either populated (a nested object) or as a
//! bare id, depending on the endpoint; [`Ref`] accepts both.

/// Error returned when a status string is outside its closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} status: {value}")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` for a closed string enum
macro_rules! string_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::models::UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err($crate::models::UnknownStatus {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use string_enum;

pub mod category;
pub mod dashboard;
pub mod menu;
pub mod order;
pub mod payment;
pub mod qr;
pub mod role;
pub mod table;
pub mod user;

// Re-exports
pub use category::*;
pub use dashboard::*;
pub use menu::*;
pub use order::*;
pub use payment::*;
pub use qr::*;
pub use role::*;
pub use table::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// Anything carrying a backend id
pub trait Identified {
    fn id(&self) -> &str;
}

/// A relation that may be populated or left as a bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Populated(T),
    Id(String),
}

impl<T: Identified> Ref<T> {
    pub fn id(&self) -> &str {
        match self {
            Ref::Populated(inner) => inner.id(),
            Ref::Id(id) => id,
        }
    }
}

impl<T> Ref<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Ref::Populated(inner) => Some(inner),
            Ref::Id(_) => None,
        }
    }
}
