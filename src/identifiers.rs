//! Type-safe identifiers for sessions and matchmaking.
//!
//! Newtype wrappers prevent passing a user identifier where a game
//! identifier is expected.
//!
//! | Type | Wraps | Source |
//! |------|-------|--------|
//! | [`GameId`] | `String` | Matchmaking server |
//! | [`UserId`] | `String` | Credential source |
//! | [`MatchRequestId`] | `Uuid` | Generated locally per pairing attempt |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// ============================================================================
// Macros
// ============================================================================

/// Declares a non-empty string identifier newtype.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier, rejecting blank values.
            ///
            /// # Errors
            ///
            /// Returns [`Error::InvalidArgument`] if `value` is empty or whitespace.
            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(Error::invalid_argument(concat!($label, " must not be empty")));
                }
                Ok(Self(value))
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// ============================================================================
// GameId / UserId
// ============================================================================

string_id!(
    /// Identifier of one game, as assigned by the matchmaking server.
    GameId,
    "game_id"
);

string_id!(
    /// Identifier of the local player.
    UserId,
    "user_id"
);

// ============================================================================
// MatchRequestId
// ============================================================================

/// Identifier correlating a timeout or cancel with one pairing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchRequestId(Uuid);

impl MatchRequestId {
    /// Generates a fresh random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MatchRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
