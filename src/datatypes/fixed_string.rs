// ABOUTME: Fixed-width null-terminated text fields used in SMPP bind bodies
// ABOUTME: Oversized input is truncated to N-1 bytes so the field always ends in a null byte

use std::fmt;
use std::str;

/// A fixed-size null-terminated string occupying exactly `N` bytes on the wire.
///
/// Content is at most `N - 1` bytes; the remainder is zero-filled, so the last
/// byte is always `0`. Longer input is silently truncated.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedString<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> FixedString<N> {
    /// Maximum content length, excluding the terminating null
    pub const MAX_LEN: usize = N - 1;

    /// Creates a FixedString from a byte slice, truncating to `N - 1` bytes.
    ///
    /// Content stops at the first embedded null byte, if any.
    pub fn truncating(s: &[u8]) -> Self {
        let end = s.iter().position(|&b| b == 0).unwrap_or(s.len());
        let len = end.min(Self::MAX_LEN);
        let mut data = [0u8; N];
        data[..len].copy_from_slice(&s[..len]);
        Self { data }
    }

    /// Builds a FixedString from a wire field, ignoring anything after the
    /// first null byte.
    pub fn from_wire(field: &[u8; N]) -> Self {
        Self::truncating(field)
    }

    /// Returns the full `N`-byte wire representation
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.data
    }

    /// Returns the string content as a byte slice, excluding null padding
    pub fn as_str_bytes(&self) -> &[u8] {
        let len = self.data.iter().position(|&b| b == 0).unwrap_or(N);
        &self.data[..len]
    }

    /// Returns the string content as a str, excluding null padding
    pub fn as_str(&self) -> Result<&str, str::Utf8Error> {
        str::from_utf8(self.as_str_bytes())
    }

    /// Returns the length of the string content (excluding null padding)
    pub fn len(&self) -> usize {
        self.as_str_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "<invalid UTF-8>"),
        }
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Ok(s) => write!(f, "FixedString<{N}>(\"{s}\")"),
            Err(_) => write!(f, "FixedString<{}>({:?})", N, self.as_str_bytes()),
        }
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self { data: [0u8; N] }
    }
}

impl<const N: usize> From<&str> for FixedString<N> {
    fn from(s: &str) -> Self {
        Self::truncating(s.as_bytes())
    }
}

impl<const N: usize> From<&String> for FixedString<N> {
    fn from(s: &String) -> Self {
        Self::truncating(s.as_bytes())
    }
}

impl<const N: usize> AsRef<[u8]> for FixedString<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_str_bytes()
    }
}

impl<const N: usize> PartialEq<str> for FixedString<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Ok(other)
    }
}

impl<const N: usize> PartialEq<&str> for FixedString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Ok(*other)
    }
}

// Bind body field sizes, null terminator included
pub type SystemId = FixedString<16>;
pub type Password = FixedString<9>;
pub type SystemType = FixedString<13>;
pub type AddressRange = FixedString<41>;
