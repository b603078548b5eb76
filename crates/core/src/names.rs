// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! String-newtyped value types with validated patterns, and opaque
//! stored-verbatim strings whose validity is provider-specific.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} {value:?} contains characters outside [A-Za-z0-9._-]")]
    InvalidChars { field: &'static str, value: String },
    #[error("{field} {value:?} exceeds the maximum length of {max}")]
    TooLong { field: &'static str, value: String, max: usize },
}

fn validate_slug(field: &'static str, value: &str, max_len: Option<usize>) -> Result<(), NameError> {
    if value.is_empty() {
        return Err(NameError::Empty { field });
    }
    if let Some(max) = max_len {
        if value.len() > max {
            return Err(NameError::TooLong { field, value: value.to_string(), max });
        }
    }
    let valid = value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
    if !valid {
        return Err(NameError::InvalidChars { field, value: value.to_string() });
    }
    Ok(())
}

/// Define a validated, `[A-Za-z0-9._-]`-restricted string newtype.
macro_rules! define_slug {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(SmolStr);

        impl $name {
            pub fn new(value: impl AsRef<str>) -> Result<Self, NameError> {
                let value = value.as_ref();
                validate_slug(stringify!($name), value, None)?;
                Ok(Self(SmolStr::new(value)))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = NameError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }
    };
}

define_slug!(
    /// The user-facing name of an agent, unique within its host at any given
    /// time (rename is the only way to change it).
    AgentName
);
define_slug!(
    /// The user-facing name of a host, unique within its provider instance.
    HostName
);
define_slug!(
    /// The user-facing name of a snapshot.
    SnapshotName
);
define_slug!(
    /// The configured name of a provider instance (e.g. `"aws-east"`).
    ProviderInstanceName
);
define_slug!(
    /// The backend kind a provider instance is configured against (e.g.
    /// `"ssh"`, `"container"`).
    ProviderBackendName
);
define_slug!(
    /// The registered agent-type name (e.g. `"generic"`, `"claude"`).
    AgentTypeName
);
define_slug!(
    /// The name a plugin registers itself under.
    PluginName
);

/// Define an opaque, stored-verbatim string newtype; validation, if any, is
/// deferred to the provider or caller that interprets it.
macro_rules! define_opaque {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

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

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_opaque!(
    /// A cron-style schedule string; validation is provider-specific.
    CronSchedule
);
define_opaque!(
    /// A git repository URL, stored verbatim.
    GitRepoUrl
);
define_opaque!(
    /// A container image reference, stored verbatim.
    ImageReference
);
define_opaque!(
    /// A raw shell command string.
    CommandString
);
define_opaque!(
    /// An opaque permission token understood by the agent-type registry.
    Permission
);

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
