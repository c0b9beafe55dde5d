use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key naming one player in the remote lookup API.
///
/// The value is kept exactly as it appeared in the source document. It must
/// not be blank, `.` or `..`: each of those would address the collection
/// endpoint instead of a single player once placed in the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player ID, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidId(format!(
                "identifier must not be blank (got {:?})",
                value
            )));
        }
        if value == "." || value == ".." {
            return Err(ValidationError::InvalidId(format!(
                "identifier {:?} is a relative path segment",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        PlayerId::new(value).map_err(serde::de::Error::custom)
    }
}
