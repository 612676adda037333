//! Bearer token wire format: `<prefix>.<secret>`
//!
//! Both halves are drawn from the URL-safe base64 alphabet, which contains no
//! `.`, so splitting on the first separator is unambiguous.

use crate::domain::DomainError;

/// Length of the public prefix half
pub const PREFIX_LENGTH: usize = 7;

/// Length of the secret half
pub const SECRET_LENGTH: usize = 32;

pub const SEPARATOR: char = '.';

/// A presented bearer token split into its two halves
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BearerToken<'a> {
    prefix: &'a str,
    secret: &'a str,
}

impl<'a> BearerToken<'a> {
    /// Split a presented token on the first separator.
    ///
    /// Lengths are not checked here; a well-formed token with an unknown
    /// prefix is a lookup miss, not a format error.
    pub fn parse(token: &'a str) -> Result<Self, DomainError> {
        let (prefix, secret) = token
            .split_once(SEPARATOR)
            .ok_or(DomainError::InvalidTokenFormat)?;

        Ok(Self { prefix, secret })
    }

    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    pub fn secret(&self) -> &'a str {
        self.secret
    }

    /// Join a prefix and secret into the string handed to the caller
    pub fn format(prefix: &str, secret: &str) -> String {
        format!("{}{}{}", prefix, SEPARATOR, secret)
    }
}

impl std::fmt::Debug for BearerToken<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("prefix", &self.prefix)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
