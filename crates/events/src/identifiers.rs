//! Newtype domain identifiers.
//!
//! Every string that names something in the trigger (a delivery, a handler, the
//! registering client) is a distinct newtype. This prevents accidentally passing
//! a [`HandlerName`] where a [`DeliveryId`] is expected even though both are
//! strings under the hood.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, from_static(), as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Creates an identifier from a non-empty compile-time constant.
            pub fn from_static(value: &'static str) -> Self {
                debug_assert!(!value.is_empty(), "identifier constant must not be empty");
                Self(value.to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Provider-issued identifier for one webhook delivery attempt.
    ///
    /// Taken from the `x-github-delivery` header and reused as the workflow
    /// execution identifier for everything that happens downstream.
    DeliveryId
}

string_id! {
    /// Stable key identifying a downstream handler (e.g. `"pull_request"`).
    HandlerName
}

string_id! {
    /// Identifier the trigger registers itself under with the host framework.
    ClientIdentifier
}

string_id! {
    /// Version string published alongside the [`ClientIdentifier`].
    ClientVersion
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
