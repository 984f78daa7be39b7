//! Shared type definitions for the provar workspace.
//!
//! Parameters live in a remote hierarchical store under path-like names
//! (`/app/stage/db_url`). This crate defines the canonical name and entry
//! types, the wire shapes used by the bulk list and upsert operations, and
//! the resolution error taxonomy shared between the engine and its callers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Separator between segments of a parameter path.
pub const PATH_SEPARATOR: char = '/';

/// Page size requested from the bulk list operation.
pub const LIST_PAGE_SIZE: u8 = 10;

/// A fully qualified parameter name, always beginning with `/`.
///
/// Construction normalizes unqualified names by prefixing the separator, so
/// `db_url` and `/db_url` address the same parameter. The invariant holds
/// for deserialized names as well: store responses carrying bare names are
/// coerced on decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ParameterName(String);

impl ParameterName {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with(PATH_SEPARATOR) {
            Self(raw)
        } else {
            Self(format!("{}{}", PATH_SEPARATOR, raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The parent path of this name: everything before the last separator.
    ///
    /// A name directly under the root (`/db_url`) has the root prefix `/`.
    pub fn parent_prefix(&self) -> PathPrefix {
        match self.0.rfind(PATH_SEPARATOR) {
            Some(0) | None => PathPrefix::root(),
            Some(index) => PathPrefix(self.0[..index].to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ParameterName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParameterName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// The hierarchical parent segment of a parameter name, used as the unit of
/// bulk loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPrefix(String);

impl PathPrefix {
    /// The root prefix, for parameters with no parent path.
    pub fn root() -> Self {
        Self(PATH_SEPARATOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage kind of a parameter, using the store's wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Plain text value.
    #[serde(rename = "String")]
    Plain,
    /// Encrypted-at-rest value, decrypted on read when requested.
    #[serde(rename = "SecureString")]
    Secret,
}

/// A single parameter as held in the store and reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterEntry {
    #[serde(rename = "Name")]
    pub name: ParameterName,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Type")]
    pub kind: ParameterKind,
}

impl ParameterEntry {
    pub fn plain(name: ParameterName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            kind: ParameterKind::Plain,
        }
    }
}

/// One call of the paginated bulk list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListByPrefixRequest {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "MaxResults")]
    pub max_results: u8,
    #[serde(rename = "WithDecryption")]
    pub with_decryption: bool,
    #[serde(rename = "NextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ListByPrefixRequest {
    /// Build the request for one page under `prefix`, carrying the
    /// continuation token from the previous page when present.
    pub fn page(prefix: &PathPrefix, next_token: Option<String>) -> Self {
        Self {
            path: prefix.as_str().to_string(),
            max_results: LIST_PAGE_SIZE,
            with_decryption: true,
            next_token,
        }
    }
}

/// One page of bulk list results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterPage {
    #[serde(rename = "Parameters", default)]
    pub parameters: Vec<ParameterEntry>,
    #[serde(rename = "NextToken", default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Idempotent upsert of a single parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutParameterRequest {
    #[serde(rename = "Name")]
    pub name: ParameterName,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Type")]
    pub kind: ParameterKind,
    #[serde(rename = "Overwrite")]
    pub overwrite: bool,
}

impl PutParameterRequest {
    /// An overwriting secret upsert, the shape used for operator-created
    /// parameters.
    pub fn secret(name: ParameterName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            kind: ParameterKind::Secret,
            overwrite: true,
        }
    }
}

/// Failure modes of a single parameter resolution.
///
/// `Clone` matters here: a `MissingValue` failure is remembered per name, and
/// later resolution attempts re-raise the remembered error verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The bulk list or upsert operation failed. Never retried and never
    /// remembered; the next resolution of the same path starts over.
    #[error("parameter store request failed: {message}")]
    Transport { message: String },

    /// No value could be obtained for the parameter, either because no
    /// interactive channel exists or because the operator supplied nothing.
    #[error("parameter {name} must have a value before deployment")]
    MissingValue { name: ParameterName },

    /// The intercepted request did not carry a usable parameter name.
    #[error("invalid parameter request: {reason}")]
    InvalidRequest { reason: String },
}

impl ResolveError {
    pub fn transport(message: impl fmt::Display) -> Self {
        Self::Transport {
            message: message.to_string(),
        }
    }
}
