//! Core identifier types for the control CLI.
//!
//! These types provide type-safe identifiers for application bundles
//! and target devices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an application bundle (e.g. "com.example.app").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BundleId(String);

/// Unique device identifier of a target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetUdid(String);

impl BundleId {
    /// Create a new BundleId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BundleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BundleId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl TargetUdid {
    /// Create a new TargetUdid from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random UDID for a simulated target.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string().to_uppercase())
    }

    /// Get the underlying string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetUdid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TargetUdid {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TargetUdid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
