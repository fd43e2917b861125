use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A short code identifying a shortened URL.
///
/// Parsed codes are 1-32 characters long and contain only alphanumeric
/// characters, hyphens, or underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

pub const MIN_LENGTH: usize = 1;
pub const MAX_LENGTH: usize = 32;

/// Path segments owned by other routes; a custom code equal to one of these
/// could never be reached through `/{code}`.
const RESERVED: &[&str] = &["api", "health"];

impl ShortCode {
    /// Parses a short code taken from a request path.
    pub fn parse(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    /// Parses a caller-chosen code for a new mapping.
    ///
    /// On top of [`ShortCode::parse`], rejects codes shadowed by other routes.
    pub fn custom(code: impl Into<String>) -> Result<Self> {
        let code = Self::parse(code)?;
        if RESERVED.contains(&code.as_str()) {
            return Err(CoreError::InvalidShortCode(format!(
                "'{}' is reserved",
                code.0
            )));
        }
        Ok(code)
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by trusted internal sources
    /// (generators, rows read back from the store).
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Composes the public short URL for this code.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(code: &str) -> Result<()> {
        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                code.len()
            )));
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
